//! CLI for browsing and editing finance tracker data from a terminal.

use std::io::{self, BufRead as _, Write as _};
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use fintrack_rs::api::FinanceApiBlocking;
use fintrack_rs::chart::{ChartStyle, build_chart};
use fintrack_rs::chat::{ChatLine, Sender, StubResponder, prepare_message};
use fintrack_rs::config::ClientConfig;
use fintrack_rs::error::FintrackError;
use fintrack_rs::models::{
    CategoryId, ChartKind, Currency, ForecastResult, Insight, NewTransaction, Period, Priority,
    Recommendation, StatisticsSnapshot, Transaction, TransactionId, TransactionQuery,
    TransactionType, format_money,
};
use fintrack_rs::render;
use fintrack_rs::view::Node;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

/// Finance tracker CLI: statistics, transactions and analytics.
#[derive(Debug, Parser)]
#[command(name = "fintrack", version, about)]
struct Cli {
    /// Print dashboard markup instead of tables.
    #[arg(long, global = true)]
    html: bool,
    /// Override the backend origin (default: `FINTRACK_BASE_URL`).
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Show income, expenses and balance for a period.
    Stats {
        /// Aggregation window: day, week, month or year.
        #[arg(long, default_value = "month", value_parser = parse_period)]
        period: Period,
    },
    /// List transactions, optionally filtered.
    Transactions(TransactionArgs),
    /// Create a transaction.
    Add(AddArgs),
    /// Delete a transaction.
    Delete {
        /// Transaction identifier.
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Show spending recommendations.
    Recommendations,
    /// Show next month's expense forecast.
    Forecast,
    /// Show insight cards.
    Insights,
    /// Print the chart configuration for a series as JSON.
    Chart {
        /// Series: monthly, category or trend.
        #[arg(long, value_parser = parse_chart_kind)]
        kind: ChartKind,
        /// Style: plain, glow or rounded (default depends on the series).
        #[arg(long, value_parser = parse_style)]
        style: Option<ChartStyle>,
    },
    /// Ask the assistant.
    Chat {
        /// Message text.
        #[arg(required = true)]
        message: Vec<String>,
        /// Answer locally with the canned reply instead of the server.
        #[arg(long)]
        stub: bool,
    },
}

/// Arguments for the `transactions` subcommand.
#[derive(Debug, Args)]
struct TransactionArgs {
    /// Only income or only expense.
    #[arg(long = "type", value_parser = parse_kind)]
    kind: Option<TransactionType>,
    /// Start date (inclusive, YYYY-MM-DD). Requires --to.
    #[arg(long, requires = "to", value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// End date (inclusive, YYYY-MM-DD). Requires --from.
    #[arg(long, requires = "from", value_parser = parse_date)]
    to: Option<NaiveDate>,
    /// Full-text search over descriptions.
    #[arg(long)]
    search: Option<String>,
    /// Sort field, prefix with `-` for descending.
    #[arg(long)]
    ordering: Option<String>,
}

/// Arguments for the `add` subcommand.
#[derive(Debug, Args)]
struct AddArgs {
    /// income or expense.
    #[arg(long = "type", value_parser = parse_kind)]
    kind: TransactionType,
    /// Positive amount, e.g. 1250.50.
    #[arg(long, value_parser = parse_amount)]
    amount: Decimal,
    /// Booking date (YYYY-MM-DD, default: today).
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Free-text note.
    #[arg(long, default_value = "")]
    description: String,
    /// Category identifier.
    #[arg(long)]
    category: Option<i64>,
}

/// How results are printed.
#[derive(Debug, Clone, Copy)]
struct Output {
    /// Print markup instead of tables.
    html: bool,
    /// Currency amounts are shown in.
    currency: Currency,
}

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|err| format!("{err}"))
}

/// Parses a statistics period for clap.
fn parse_period(s: &str) -> Result<Period, String> {
    s.parse().map_err(|err: FintrackError| err.to_string())
}

/// Parses a chart kind for clap.
fn parse_chart_kind(s: &str) -> Result<ChartKind, String> {
    s.parse().map_err(|err: FintrackError| err.to_string())
}

/// Parses a transaction type for clap.
fn parse_kind(s: &str) -> Result<TransactionType, String> {
    s.parse().map_err(|err: FintrackError| err.to_string())
}

/// Parses a chart style for clap.
fn parse_style(s: &str) -> Result<ChartStyle, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "plain" => Ok(ChartStyle::Plain),
        "glow" => Ok(ChartStyle::Glow),
        "rounded" | "rounded-segments" => Ok(ChartStyle::RoundedSegments),
        other => Err(format!("unknown chart style `{other}`")),
    }
}

/// Parses a strictly positive amount for clap.
fn parse_amount(s: &str) -> Result<Decimal, String> {
    let amount: Decimal = s
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|err| format!("invalid amount `{s}`: {err}"))?;
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(format!("amount must be positive, got `{s}`"));
    }
    Ok(amount)
}

/// Interprets a confirmation answer; only yes counts.
fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Asks a yes/no question on stdin.
fn confirm_on_stdin(prompt: &str) -> io::Result<bool> {
    let mut err = io::stderr().lock();
    write!(err, "{} [y/N] ", prompt.bold())?;
    err.flush()?;
    let mut answer = String::new();
    _ = io::stdin().lock().read_line(&mut answer)?;
    Ok(parse_confirmation(&answer))
}

/// Builds the list query from CLI arguments.
fn build_query(args: &TransactionArgs) -> TransactionQuery {
    let mut query = TransactionQuery::new();
    if let Some(kind) = args.kind {
        query = query.kind(kind);
    }
    if let Some((from_date, to_date)) = args.from.zip(args.to) {
        query = query.date_range(from_date, to_date);
    }
    if let Some(term) = args.search.as_deref() {
        query = query.search(term);
    }
    if let Some(field) = args.ordering.as_deref() {
        query = query.ordering(field);
    }
    query
}

/// Builds the create payload from CLI arguments.
fn build_new_transaction(args: &AddArgs, today: NaiveDate) -> NewTransaction {
    let mut transaction = NewTransaction::new(args.kind, args.amount, args.date.unwrap_or(today))
        .description(args.description.as_str());
    if let Some(category) = args.category {
        transaction = transaction.category(CategoryId::new(category));
    }
    transaction
}

/// Prints a failed action to stderr and returns the failure code.
fn report_failure(action: &str, err: &FintrackError) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} failed to {action}: {err}",
        "error:".red().bold()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => return report_failure("read configuration", &err),
    };
    if let Some(url) = cli.base_url {
        config = config.base_url(url);
    }

    let client = match config.blocking_client() {
        Ok(client) => client,
        Err(err) => return report_failure("build client", &err),
    };
    let api = FinanceApiBlocking::new(client);
    let output = Output {
        html: cli.html,
        currency: Currency::default(),
    };

    dispatch(&api, cli.command, output)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch(api: &FinanceApiBlocking, command: Command, output: Output) -> io::Result<ExitCode> {
    match command {
        Command::Stats { period } => cmd_stats(api, period, output),
        Command::Transactions(args) => cmd_transactions(api, &args, output),
        Command::Add(args) => cmd_add(api, &args, output),
        Command::Delete { id, yes } => cmd_delete(api, TransactionId::new(id), |prompt| {
            if yes { Ok(true) } else { confirm_on_stdin(prompt) }
        }),
        Command::Recommendations => cmd_recommendations(api, output),
        Command::Forecast => cmd_forecast(api, output),
        Command::Insights => cmd_insights(api, output),
        Command::Chart { kind, style } => {
            let chosen = style.unwrap_or_else(|| ChartStyle::default_for(kind));
            cmd_chart(api, kind, chosen, output.currency)
        }
        Command::Chat { message, stub } => cmd_chat(api, &message.join(" "), stub, output),
    }
}

/// Executes the `stats` subcommand.
fn cmd_stats(api: &FinanceApiBlocking, period: Period, output: Output) -> io::Result<ExitCode> {
    let spinner = make_spinner("Loading statistics...");
    let result = api.statistics(period);
    spinner.finish_and_clear();
    match result {
        Ok(stats) if output.html => {
            print_html(&render::statistics_cards(&stats, output.currency))
        }
        Ok(stats) => {
            print_statistics_table(&stats, period, output.currency)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure("load statistics", &err),
    }
}

/// Executes the `transactions` subcommand.
fn cmd_transactions(
    api: &FinanceApiBlocking,
    args: &TransactionArgs,
    output: Output,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Loading transactions...");
    let result = api.list_transactions(&build_query(args));
    spinner.finish_and_clear();
    match result {
        Ok(txs) if output.html => print_html(&render::transaction_table(&txs, output.currency)),
        Ok(txs) => {
            print_transactions_table(&txs, output.currency)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure("load transactions", &err),
    }
}

/// Executes the `add` subcommand.
fn cmd_add(api: &FinanceApiBlocking, args: &AddArgs, output: Output) -> io::Result<ExitCode> {
    let transaction = build_new_transaction(args, Local::now().date_naive());
    match api.create_transaction(&transaction) {
        Ok(created) if output.html => {
            print_html(&Node::from(render::transaction_row(&created, output.currency)))
        }
        Ok(created) => {
            writeln!(
                io::stdout().lock(),
                "{} {}",
                "Transaction added".green().bold(),
                format_args!("(#{})", created.id).dimmed()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure("add transaction", &err),
    }
}

/// Executes the `delete` subcommand after `confirm` approves.
fn cmd_delete<F>(api: &FinanceApiBlocking, id: TransactionId, confirm: F) -> io::Result<ExitCode>
where
    F: FnOnce(&str) -> io::Result<bool>,
{
    if !confirm(render::DELETE_PROMPT)? {
        writeln!(io::stdout().lock(), "{}", "Cancelled.".dimmed())?;
        return Ok(ExitCode::SUCCESS);
    }
    match api.delete_transaction(id) {
        Ok(()) => {
            writeln!(
                io::stdout().lock(),
                "{} {}",
                "Transaction deleted".green().bold(),
                format_args!("(#{id})").dimmed()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure("delete transaction", &err),
    }
}

/// Executes the `recommendations` subcommand.
fn cmd_recommendations(api: &FinanceApiBlocking, output: Output) -> io::Result<ExitCode> {
    let spinner = make_spinner("Analysing spending...");
    let result = api.recommendations();
    spinner.finish_and_clear();
    match result {
        Ok(recs) if output.html => print_html(&render::recommendations(&recs, output.currency)),
        Ok(recs) => {
            print_recommendations(&recs, output.currency)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure("load recommendations", &err),
    }
}

/// Executes the `forecast` subcommand.
fn cmd_forecast(api: &FinanceApiBlocking, output: Output) -> io::Result<ExitCode> {
    let spinner = make_spinner("Building forecast...");
    let result = api.forecast();
    spinner.finish_and_clear();
    match result {
        Ok(forecast) if output.html => print_html(&render::forecast(&forecast, output.currency)),
        Ok(forecast) => {
            print_forecast_table(&forecast, output.currency)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure("load forecast", &err),
    }
}

/// Executes the `insights` subcommand.
fn cmd_insights(api: &FinanceApiBlocking, output: Output) -> io::Result<ExitCode> {
    match api.insights() {
        Ok(items) if output.html => print_html(&render::insights(&items)),
        Ok(items) => {
            print_insights_table(&items)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure("load insights", &err),
    }
}

/// Executes the `chart` subcommand: prints the chart configuration.
fn cmd_chart(
    api: &FinanceApiBlocking,
    kind: ChartKind,
    style: ChartStyle,
    currency: Currency,
) -> io::Result<ExitCode> {
    let json = api
        .chart_data(kind)
        .and_then(|series| build_chart(kind, &series, style, currency).to_json());
    match json {
        Ok(json) => {
            writeln!(io::stdout().lock(), "{json}")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure("load chart data", &err),
    }
}

/// Executes the `chat` subcommand.
fn cmd_chat(
    api: &FinanceApiBlocking,
    raw: &str,
    stub: bool,
    output: Output,
) -> io::Result<ExitCode> {
    let Some(message) = prepare_message(raw) else {
        writeln!(
            io::stderr().lock(),
            "{} chat message is empty",
            "error:".red().bold()
        )?;
        return Ok(ExitCode::FAILURE);
    };
    let reply = if stub {
        let responder = StubResponder::default();
        std::thread::sleep(responder.delay());
        Ok(responder.reply().to_owned())
    } else {
        let spinner = make_spinner("Waiting for the assistant...");
        let result = api.chat(message).map(|reply| reply.response);
        spinner.finish_and_clear();
        result
    };
    match reply {
        Ok(text) => {
            print_chat(&[ChatLine::user(message), ChatLine::assistant(text)], output)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure("reach the assistant", &err),
    }
}

// ── Output formatting ────────────────────────────────────────────────

/// Prints a rendered node tree as HTML.
fn print_html(node: &Node) -> io::Result<ExitCode> {
    writeln!(io::stdout().lock(), "{}", node.to_html())?;
    Ok(ExitCode::SUCCESS)
}

/// Prints statistics in a table.
fn print_statistics_table(
    stats: &StatisticsSnapshot,
    period: Period,
    currency: Currency,
) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Metric").fg(Color::Cyan),
        Cell::new("Value").fg(Color::Cyan),
    ]);

    let balance = stats.balance();
    let balance_color = if balance.is_sign_negative() && !balance.is_zero() {
        Color::Yellow
    } else {
        Color::Blue
    };
    _ = table.add_row(vec![
        Cell::new("Income"),
        Cell::new(format_money(stats.total_income, currency)).fg(Color::Green),
    ]);
    _ = table.add_row(vec![
        Cell::new("Expenses"),
        Cell::new(format_money(stats.total_expense, currency)).fg(Color::Red),
    ]);
    _ = table.add_row(vec![
        Cell::new("Balance"),
        Cell::new(format_money(balance, currency)).fg(balance_color),
    ]);
    _ = table.add_row(vec![
        Cell::new("Average transaction"),
        Cell::new(format_money(stats.avg_transaction, currency)),
    ]);
    _ = table.add_row(vec![
        Cell::new("Transactions"),
        Cell::new(stats.transactions_count),
    ]);
    _ = table.add_row(vec![
        Cell::new("Categories"),
        Cell::new(stats.categories_count),
    ]);

    writeln!(
        out,
        "{} {}",
        "Statistics".green().bold(),
        format_args!("({period})").dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints transactions in a table.
fn print_transactions_table(txs: &[Transaction], currency: Currency) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if txs.is_empty() {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Description").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
    ]);

    for tx in txs {
        let category = tx.category_name.as_deref().unwrap_or("\u{2014}");
        let amount_cell = match tx.kind {
            TransactionType::Income => {
                Cell::new(format!("+{}", format_money(tx.amount, currency))).fg(Color::Green)
            }
            TransactionType::Expense => {
                Cell::new(format!("-{}", format_money(tx.amount, currency))).fg(Color::Red)
            }
        };
        _ = table.add_row(vec![
            Cell::new(tx.id),
            Cell::new(tx.date),
            Cell::new(category),
            Cell::new(&tx.description),
            amount_cell,
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Transactions".green().bold(),
        format_args!("({})", txs.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints recommendations as a list, most urgent marked in red.
fn print_recommendations(recs: &[Recommendation], currency: Currency) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if recs.is_empty() {
        writeln!(out, "{}", "No recommendations yet.".dimmed())?;
        return Ok(());
    }
    writeln!(out, "{}", "Recommendations".green().bold())?;
    writeln!(out)?;
    for rec in recs {
        let marker = match rec.priority {
            Priority::High => "!".red().bold().to_string(),
            Priority::Medium => "*".yellow().to_string(),
            Priority::Low => "-".dimmed().to_string(),
        };
        writeln!(out, "  {marker} {}", rec.title.bold())?;
        writeln!(out, "    {}", rec.message)?;
        if let Some(amount) = rec.amount {
            writeln!(out, "    {}", format_money(amount, currency).dimmed())?;
        }
    }
    Ok(())
}

/// Prints the forecast in a table.
fn print_forecast_table(forecast: &ForecastResult, currency: Currency) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} {} {}",
        "Forecast".green().bold(),
        format_money(forecast.total_forecast, currency).bold(),
        format_args!("(based on {} months)", forecast.based_on_months).dimmed()
    )?;
    if forecast.category_forecasts.is_empty() {
        return Ok(());
    }
    writeln!(out)?;

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Forecast").fg(Color::Cyan),
    ]);
    for item in &forecast.category_forecasts {
        _ = table.add_row(vec![
            Cell::new(&item.category),
            Cell::new(format_money(item.forecast, currency)),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints insights in a table.
fn print_insights_table(items: &[Insight]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if items.is_empty() {
        writeln!(out, "{}", "No insights yet.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Insight").fg(Color::Cyan),
        Cell::new("Value").fg(Color::Cyan),
        Cell::new("Details").fg(Color::Cyan),
    ]);
    for item in items {
        _ = table.add_row(vec![
            Cell::new(&item.title),
            Cell::new(&item.value).fg(Color::Green),
            Cell::new(&item.description),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints chat lines, as markup or as a plain transcript.
fn print_chat(lines: &[ChatLine], output: Output) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for line in lines {
        if output.html {
            writeln!(out, "{}", line.render().to_html())?;
            continue;
        }
        let label = match line.sender {
            Sender::User => "you".cyan().bold().to_string(),
            Sender::Assistant => "assistant".magenta().bold().to_string(),
        };
        writeln!(out, "{label}: {}", line.text)?;
    }
    Ok(())
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // Last-resort error output; if stderr itself failed, nothing
            // we can do.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
