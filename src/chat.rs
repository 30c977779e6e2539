//! Chat widget: transcript lines and responders.
//!
//! The assistant is not real inference. [`StubResponder`] answers with a
//! canned line after a fixed delay; [`ServerResponder`] forwards the text to
//! the server chat endpoint verbatim.

#[cfg(feature = "async")]
use core::future::Future;
use core::time::Duration;

#[cfg(feature = "async")]
use crate::api::ResourceSource;
#[cfg(feature = "async")]
use crate::error::Result;
use crate::view::{Element, Node};

/// Delay before the stub responder answers.
pub const STUB_DELAY: Duration = Duration::from_millis(600);

/// Reply the stub responder sends.
pub const STUB_REPLY: &str = "This is a sample assistant reply.\n(Real analysis is coming soon.)";

/// Who wrote a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    /// The person using the dashboard.
    User,
    /// The responder.
    Assistant,
}

/// One line of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    /// Author.
    pub sender: Sender,
    /// Text, shown as-is.
    pub text: String,
}

impl ChatLine {
    /// A line typed by the user.
    #[inline]
    #[must_use]
    pub fn user<T: Into<String>>(text: T) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    /// A line from the assistant.
    #[inline]
    #[must_use]
    pub fn assistant<T: Into<String>>(text: T) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }

    /// Renders the line as a transcript bubble.
    ///
    /// User lines sit right in a primary badge, assistant lines left in a
    /// light bordered badge.
    #[must_use]
    pub fn render(&self) -> Node {
        let (row, badge) = match self.sender {
            Sender::User => ("text-end mb-2 msg-user", "badge bg-primary p-2"),
            Sender::Assistant => (
                "text-start mb-2 msg-ai",
                "badge bg-light text-dark p-2 border",
            ),
        };
        Element::new("div")
            .class(row)
            .child(
                Element::new("span")
                    .class(badge)
                    .attr("style", "white-space: pre-line")
                    .text(self.text.as_str()),
            )
            .into()
    }
}

/// Normalises user input: trims it and drops empty messages.
#[must_use]
pub fn prepare_message(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Produces the assistant's reply to a message.
#[cfg(feature = "async")]
pub trait ChatResponder: core::fmt::Debug + Send + Sync {
    /// Answers `message`.
    fn respond(&self, message: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Answers every message with [`STUB_REPLY`] after [`STUB_DELAY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubResponder {
    /// Wait before answering.
    delay: Duration,
    /// Canned reply.
    reply: String,
}

impl StubResponder {
    /// Creates a stub with a custom delay and reply.
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(delay: Duration, reply: T) -> Self {
        Self {
            delay,
            reply: reply.into(),
        }
    }

    /// Delay before answering.
    #[inline]
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Canned reply.
    #[inline]
    #[must_use]
    pub fn reply(&self) -> &str {
        &self.reply
    }
}

impl Default for StubResponder {
    #[inline]
    fn default() -> Self {
        Self::new(STUB_DELAY, STUB_REPLY)
    }
}

#[cfg(feature = "async")]
impl ChatResponder for StubResponder {
    fn respond(&self, message: &str) -> impl Future<Output = Result<String>> + Send {
        tracing::trace!(chars = message.chars().count(), "stub chat reply scheduled");
        async move {
            tokio::time::sleep(self.delay).await;
            Ok(self.reply.clone())
        }
    }
}

/// Forwards messages to `POST /ai-chat/` through a [`ResourceSource`].
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct ServerResponder<'src, R> {
    /// Where the message is sent.
    source: &'src R,
}

#[cfg(feature = "async")]
impl<'src, R: ResourceSource> ServerResponder<'src, R> {
    /// Wraps a resource source.
    #[inline]
    #[must_use]
    pub const fn new(source: &'src R) -> Self {
        Self { source }
    }
}

#[cfg(feature = "async")]
impl<R: ResourceSource> ChatResponder for ServerResponder<'_, R> {
    fn respond(&self, message: &str) -> impl Future<Output = Result<String>> + Send {
        let message = message.to_owned();
        async move {
            let reply = self.source.send_chat(message).await?;
            Ok(reply.response)
        }
    }
}

/// Which responder the chat widget uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChatMode {
    /// Local canned replies.
    #[default]
    Stub,
    /// The server chat endpoint.
    Server,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_line_markup() {
        let html = ChatLine::user("Hi <there>").render().to_html();
        assert_eq!(
            html,
            r#"<div class="text-end mb-2 msg-user"><span class="badge bg-primary p-2" style="white-space: pre-line">Hi &lt;there&gt;</span></div>"#
        );
    }

    #[test]
    fn assistant_line_markup() {
        let node = ChatLine::assistant("Sure").render();
        let row = node.as_element().unwrap();
        assert!(row.has_class("text-start"));
        let badge = row.children().first().and_then(Node::as_element).unwrap();
        assert!(badge.has_class("bg-light"));
        assert!(badge.has_class("border"));
        assert_eq!(node.text_content(), "Sure");
    }

    #[test]
    fn prepare_message_trims_and_drops_empty() {
        assert_eq!(prepare_message("  hello \n"), Some("hello"));
        assert_eq!(prepare_message("   "), None);
        assert_eq!(prepare_message(""), None);
    }

    #[test]
    fn default_stub_settings() {
        assert_eq!(ChatMode::default(), ChatMode::Stub);
        let stub = StubResponder::default();
        assert_eq!(stub.delay(), Duration::from_millis(600));
        assert_eq!(stub.reply(), STUB_REPLY);
    }

    #[cfg(feature = "async")]
    #[tokio::test(start_paused = true)]
    async fn stub_waits_before_replying() {
        let stub = StubResponder::default();
        let started = tokio::time::Instant::now();
        let reply = stub.respond("anything").await.unwrap();
        assert_eq!(reply, STUB_REPLY);
        assert!(started.elapsed() >= STUB_DELAY);
    }
}
