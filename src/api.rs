//! Resource client: one method per backend resource.
//!
//! Wraps the low-level HTTP client with typed calls built from the
//! [`Endpoint`] path table. The async [`FinanceApi`] also implements
//! [`ResourceSource`], the seam the render pipeline fetches through.

use crate::client::RequestOptions;
use crate::endpoint::Endpoint;
#[cfg(feature = "async")]
use crate::error::Result;
#[cfg(feature = "async")]
use crate::models::{
    ChartKind, ChartSeries, ChatReply, ForecastResult, Insight, NewTransaction, Period,
    Recommendation, StatisticsSnapshot, Transaction, TransactionId, TransactionQuery,
};

/// Request options for `endpoint` carrying an optional JSON payload.
fn options_for(endpoint: &Endpoint, body: Option<String>) -> RequestOptions {
    let mut options = RequestOptions::new(endpoint.method());
    options.body = body;
    options
}

/// Generates a resource client (async or blocking) over a low-level client.
#[cfg(any(feature = "async", feature = "blocking"))]
macro_rules! define_finance_api {
    (
        client_name: $client:ident,
        http_client: $http_client:ty,
        client_doc: $client_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Low-level HTTP client.
            client: $http_client,
        }

        impl $client {
            /// Wraps a configured HTTP client.
            #[inline]
            #[must_use]
            pub const fn new(client: $http_client) -> Self {
                Self { client }
            }

            /// Returns the underlying HTTP client.
            #[inline]
            #[must_use]
            pub const fn inner_client(&self) -> &$http_client {
                &self.client
            }

            /// Lists transactions matching `query`.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the response cannot
            /// be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn list_transactions(
                &self,
                query: &TransactionQuery,
            ) -> Result<Vec<Transaction>> {
                let items: Vec<Transaction> = self
                    .call(Endpoint::ListTransactions(query.clone()), None)
                    $( .$await_ext )? ?;
                tracing::debug!(count = items.len(), "listed transactions");
                Ok(items)
            }

            /// Creates a transaction and returns it as stored.
            ///
            /// # Errors
            ///
            /// Returns [`crate::error::FintrackError::Http`] if the backend
            /// rejects the payload, or any transport/decoding error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn create_transaction(
                &self,
                transaction: &NewTransaction,
            ) -> Result<Transaction> {
                let body = serde_json::to_string(transaction)?;
                self.call(Endpoint::CreateTransaction, Some(body)) $( .$await_ext )?
            }

            /// Replaces the transaction `id`.
            ///
            /// # Errors
            ///
            /// Returns [`crate::error::FintrackError::Http`] if the backend
            /// rejects the payload or `id` does not exist.
            #[inline]
            #[tracing::instrument(skip_all, fields(id = %id))]
            pub $($async_kw)? fn update_transaction(
                &self,
                id: TransactionId,
                transaction: &NewTransaction,
            ) -> Result<Transaction> {
                let body = serde_json::to_string(transaction)?;
                self.call(Endpoint::UpdateTransaction(id), Some(body)) $( .$await_ext )?
            }

            /// Deletes the transaction `id`.
            ///
            /// # Errors
            ///
            /// Returns [`crate::error::FintrackError::Http`] if `id` does not
            /// exist, or a transport error.
            #[inline]
            #[tracing::instrument(skip_all, fields(id = %id))]
            pub $($async_kw)? fn delete_transaction(&self, id: TransactionId) -> Result<()> {
                self.call(Endpoint::DeleteTransaction(id), None) $( .$await_ext )?
            }

            /// Fetches aggregate statistics for `period`.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the response cannot
            /// be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(period = %period))]
            pub $($async_kw)? fn statistics(&self, period: Period) -> Result<StatisticsSnapshot> {
                self.call(Endpoint::Statistics(period), None) $( .$await_ext )?
            }

            /// Fetches the series for one chart.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the response cannot
            /// be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(kind = %kind))]
            pub $($async_kw)? fn chart_data(&self, kind: ChartKind) -> Result<ChartSeries> {
                self.call(Endpoint::ChartData(kind), None) $( .$await_ext )?
            }

            /// Fetches spending recommendations.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the response cannot
            /// be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn recommendations(&self) -> Result<Vec<Recommendation>> {
                self.call(Endpoint::Recommendations, None) $( .$await_ext )?
            }

            /// Fetches the next-month forecast.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the response cannot
            /// be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn forecast(&self) -> Result<ForecastResult> {
                self.call(Endpoint::Forecast, None) $( .$await_ext )?
            }

            /// Fetches insight cards.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the response cannot
            /// be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn insights(&self) -> Result<Vec<Insight>> {
                self.call(Endpoint::Insights, None) $( .$await_ext )?
            }

            /// Sends a chat message to the server-side assistant.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the reply cannot be
            /// deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn chat(&self, message: &str) -> Result<ChatReply> {
                let body = serde_json::to_string(&ChatRequest {
                    message: message.to_owned(),
                })?;
                self.call(Endpoint::Chat, Some(body)) $( .$await_ext )?
            }

            /// Sends `endpoint`'s request and decodes the response.
            $($async_kw)? fn call<T: DeserializeOwned>(
                &self,
                endpoint: Endpoint,
                body: Option<String>,
            ) -> Result<T> {
                tracing::trace!(endpoint = %endpoint, "calling endpoint");
                let options = options_for(&endpoint, body);
                let path = endpoint.path();
                if endpoint.is_api_relative() {
                    self.client.request(&path, options) $( .$await_ext )?
                } else {
                    self.client.request_absolute(&path, options) $( .$await_ext )?
                }
            }
        }
    };
}

// ── Async variant ───────────────────────────────────────────────────────

#[cfg(feature = "async")]
mod async_api {
    //! Async resource client.

    use core::future::Future;

    use serde::de::DeserializeOwned;

    use super::{ResourceSource, options_for};
    use crate::client::ApiClient;
    use crate::endpoint::Endpoint;
    use crate::error::Result;
    use crate::models::{
        ChartKind, ChartSeries, ChatReply, ChatRequest, ForecastResult, Insight, NewTransaction,
        Period, Recommendation, StatisticsSnapshot, Transaction, TransactionId, TransactionQuery,
    };

    define_finance_api! {
        client_name: FinanceApi,
        http_client: ApiClient,
        client_doc: "Async resource client for the finance tracker API.",
        async_kw: async,
        await_kw: await,
    }

    impl ResourceSource for FinanceApi {
        #[inline]
        fn fetch_statistics(
            &self,
            period: Period,
        ) -> impl Future<Output = Result<StatisticsSnapshot>> + Send {
            self.statistics(period)
        }

        #[inline]
        fn fetch_chart(&self, kind: ChartKind) -> impl Future<Output = Result<ChartSeries>> + Send {
            self.chart_data(kind)
        }

        #[inline]
        fn fetch_recommendations(
            &self,
        ) -> impl Future<Output = Result<Vec<Recommendation>>> + Send {
            self.recommendations()
        }

        #[inline]
        fn fetch_forecast(&self) -> impl Future<Output = Result<ForecastResult>> + Send {
            self.forecast()
        }

        #[inline]
        fn fetch_insights(&self) -> impl Future<Output = Result<Vec<Insight>>> + Send {
            self.insights()
        }

        #[inline]
        fn fetch_transactions(
            &self,
            query: TransactionQuery,
        ) -> impl Future<Output = Result<Vec<Transaction>>> + Send {
            async move { self.list_transactions(&query).await }
        }

        #[inline]
        fn submit_transaction(
            &self,
            transaction: NewTransaction,
        ) -> impl Future<Output = Result<Transaction>> + Send {
            async move { self.create_transaction(&transaction).await }
        }

        #[inline]
        fn remove_transaction(&self, id: TransactionId) -> impl Future<Output = Result<()>> + Send {
            self.delete_transaction(id)
        }

        #[inline]
        fn send_chat(&self, message: String) -> impl Future<Output = Result<ChatReply>> + Send {
            async move { self.chat(&message).await }
        }
    }
}

// ── Blocking variant ────────────────────────────────────────────────────

#[cfg(feature = "blocking")]
mod blocking_api {
    //! Blocking resource client.

    use serde::de::DeserializeOwned;

    use super::options_for;
    use crate::client::BlockingApiClient;
    use crate::endpoint::Endpoint;
    use crate::error::Result;
    use crate::models::{
        ChartKind, ChartSeries, ChatReply, ChatRequest, ForecastResult, Insight, NewTransaction,
        Period, Recommendation, StatisticsSnapshot, Transaction, TransactionId, TransactionQuery,
    };

    define_finance_api! {
        client_name: FinanceApiBlocking,
        http_client: BlockingApiClient,
        client_doc: "Blocking resource client for the finance tracker API.",
    }
}

#[cfg(feature = "async")]
pub use async_api::FinanceApi;
#[cfg(feature = "blocking")]
pub use blocking_api::FinanceApiBlocking;

/// Async source of every resource the dashboard renders.
///
/// [`FinanceApi`] is the production implementation; tests substitute
/// scripted sources. All methods take `&self` so several loads can be in
/// flight at once.
#[cfg(feature = "async")]
pub trait ResourceSource: core::fmt::Debug + Send + Sync {
    /// Fetches statistics for `period`.
    fn fetch_statistics(
        &self,
        period: Period,
    ) -> impl Future<Output = Result<StatisticsSnapshot>> + Send;

    /// Fetches the series for one chart.
    fn fetch_chart(
        &self,
        kind: ChartKind,
    ) -> impl Future<Output = Result<ChartSeries>> + Send;

    /// Fetches recommendations.
    fn fetch_recommendations(
        &self,
    ) -> impl Future<Output = Result<Vec<Recommendation>>> + Send;

    /// Fetches the forecast.
    fn fetch_forecast(&self) -> impl Future<Output = Result<ForecastResult>> + Send;

    /// Fetches insight cards.
    fn fetch_insights(&self) -> impl Future<Output = Result<Vec<Insight>>> + Send;

    /// Lists transactions.
    fn fetch_transactions(
        &self,
        query: TransactionQuery,
    ) -> impl Future<Output = Result<Vec<Transaction>>> + Send;

    /// Creates a transaction.
    fn submit_transaction(
        &self,
        transaction: NewTransaction,
    ) -> impl Future<Output = Result<Transaction>> + Send;

    /// Deletes a transaction.
    fn remove_transaction(
        &self,
        id: TransactionId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Sends a chat message to the server-side assistant.
    fn send_chat(
        &self,
        message: String,
    ) -> impl Future<Output = Result<ChatReply>> + Send;
}

#[cfg(all(test, feature = "async"))]
mod tests {
    use core::time::Duration;

    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::{ApiClient, RetryPolicy};
    use crate::credentials::StaticCredentials;
    use crate::models::{CategoryId, TransactionType};

    fn api_for(server: &MockServer) -> FinanceApi {
        let client = ApiClient::builder()
            .base_url(server.uri())
            .credentials(StaticCredentials::new("tok"))
            .retry(RetryPolicy::new(1, Duration::from_millis(1)))
            .build()
            .unwrap();
        FinanceApi::new(client)
    }

    fn transaction_json(id: i64, payload: &serde_json::Value) -> serde_json::Value {
        let mut value = payload.clone();
        value["id"] = json!(id);
        value["category_name"] = json!("Transport");
        value
    }

    #[tokio::test]
    async fn statistics_requests_period() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transactions/api/transactions/statistics/"))
            .and(query_param("period", "year"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_income": "1000.00",
                "total_expense": "400.00",
                "balance": "600.00",
                "transactions_count": 3,
                "categories_count": 2,
                "avg_transaction": "50.00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stats = api_for(&server).statistics(Period::Year).await.unwrap();
        assert_eq!(stats.balance(), Decimal::from(600));
    }

    #[tokio::test]
    async fn chart_data_requests_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transactions/api/transactions/chart_data/"))
            .and(query_param("type", "trend"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "labels": ["01.05", "02.05"],
                "datasets": [{"label": "Balance", "data": [100.0, 80.0], "fill": true, "tension": 0.4}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let series = api_for(&server).chart_data(ChartKind::Trend).await.unwrap();
        assert_eq!(series.labels.len(), 2);
    }

    #[tokio::test]
    async fn created_transaction_round_trips_through_list() {
        let server = MockServer::start().await;
        let payload = NewTransaction::new(
            TransactionType::Expense,
            "350.75".parse().unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        )
        .description("Metro card")
        .category(CategoryId::new(4));
        let payload_json = serde_json::to_value(&payload).unwrap();
        let stored = transaction_json(21, &payload_json);

        Mock::given(method("POST"))
            .and(path("/transactions/api/transactions/"))
            .and(body_json(&payload_json))
            .respond_with(ResponseTemplate::new(201).set_body_json(&stored))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/transactions/api/transactions/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored])))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server);
        let created = api.create_transaction(&payload).await.unwrap();
        assert_eq!(created.id, TransactionId::new(21));

        let listed = api.list_transactions(&TransactionQuery::new()).await.unwrap();
        let first = listed.first().unwrap();
        assert_eq!(first.amount, payload.amount);
        assert_eq!(first.category, payload.category);
        assert_eq!(first.date, payload.date);
        assert_eq!(first.description, payload.description);
    }

    #[tokio::test]
    async fn update_uses_put_on_item_path() {
        let server = MockServer::start().await;
        let payload = NewTransaction::new(
            TransactionType::Income,
            Decimal::from(5000),
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );
        let payload_json = serde_json::to_value(&payload).unwrap();
        Mock::given(method("PUT"))
            .and(path("/transactions/api/transactions/9/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(transaction_json(9, &payload_json)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let updated = api_for(&server)
            .update_transaction(TransactionId::new(9), &payload)
            .await
            .unwrap();
        assert_eq!(updated.kind, TransactionType::Income);
    }

    #[tokio::test]
    async fn delete_accepts_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/transactions/api/transactions/3/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        api_for(&server)
            .delete_transaction(TransactionId::new(3))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_forecast_is_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transactions/api/ai/forecast/"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found."))
            .mount(&server)
            .await;

        let err = api_for(&server).forecast().await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn analytics_endpoints_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transactions/api/ai/recommendations/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "info", "title": "Tip", "message": "Save more.", "priority": "medium"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/transactions/api/ai/insights/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"title": "Top category", "value": "Food", "description": "42%", "icon": "bi-cup"}
            ])))
            .mount(&server)
            .await;

        let api = api_for(&server);
        assert_eq!(api.recommendations().await.unwrap().len(), 1);
        assert_eq!(api.insights().await.unwrap().first().unwrap().value, "Food");
    }

    #[tokio::test]
    async fn chat_posts_outside_api_root() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai-chat/"))
            .and(body_json(json!({"message": "How am I doing?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Fine."})))
            .expect(1)
            .mount(&server)
            .await;

        let reply = api_for(&server).send_chat("How am I doing?".to_owned()).await.unwrap();
        assert_eq!(reply.response, "Fine.");
    }
}
