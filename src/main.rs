//! askdb - Ask your database questions in plain English.

use std::io::{self, BufRead, Write};

use askdb::app::{self, Interaction};
use askdb::cli::Cli;
use askdb::config::{Config, ConnectionConfig};
use askdb::db::{self, DatabaseClient, MockDatabaseClient, Value};
use askdb::error::{AskdbError, Result};
use askdb::llm::{self, LlmClient, LlmProvider};
use askdb::output;
use rust_decimal::Decimal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env before reading any configuration
    dotenvy::dotenv().ok();

    // Initialize logging to stderr so stdout stays clean for results
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        eprintln!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Load configuration file
    let config_path = cli.config_path();
    let config = Config::load_from_file(&config_path)?;

    // Missing credentials or an unknown provider terminate startup here
    let provider = resolve_provider(&cli, &config)?;
    let llm_client = llm::create_client(provider, &config.llm.model)?;

    let db_client: Box<dyn DatabaseClient> = if cli.mock_db {
        Box::new(sample_inventory())
    } else {
        let connection = resolve_connection(&cli, &config)?.ok_or_else(|| {
            AskdbError::config(
                "No database connection configured. Pass --url or set DATABASE_URL.",
            )
        })?;
        info!("Connecting to {}", connection.display_string());
        db::connect(&connection).await?
    };

    let outcome = match &cli.question {
        Some(question) => {
            run_single(question, &cli, llm_client.as_ref(), db_client.as_ref()).await
        }
        None => run_interactive(&cli, llm_client.as_ref(), db_client.as_ref()).await,
    };

    let _ = db_client.close().await;
    outcome
}

/// Answers one question and exits.
async fn run_single(
    question: &str,
    cli: &Cli,
    llm: &dyn LlmClient,
    db: &dyn DatabaseClient,
) -> Result<()> {
    if cli.status {
        print_status(db).await?;
        println!();
    }

    let interaction = app::ask(question, llm, db).await?;
    present(&interaction, cli)
}

/// Reads questions from stdin until EOF or an exit command.
async fn run_interactive(cli: &Cli, llm: &dyn LlmClient, db: &dyn DatabaseClient) -> Result<()> {
    print_status(db).await?;
    println!("\nType a question about the t-shirts inventory ('exit' to quit).\n");

    let stdin = io::stdin();
    loop {
        print!("askdb> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        let bytes = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| AskdbError::internal(format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            break; // EOF
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        // Upstream failures abort the interaction, not the session
        match app::ask(question, llm, db).await {
            Ok(interaction) => present(&interaction, cli)?,
            Err(e) => eprintln!("{}: {}", e.category(), e),
        }
    }

    Ok(())
}

/// Prints the generated SQL, the result table, and the summary line, and
/// writes the CSV export when requested.
fn present(interaction: &Interaction, cli: &Cli) -> Result<()> {
    println!("Generated SQL:");
    println!("{}", interaction.sql);
    println!();

    println!("{}", output::render_table(&interaction.table));
    if let Some(warning) = &interaction.truncation_warning {
        println!("{warning}");
    }
    println!(
        "{} ({:.3}s)",
        output::summary_line(&interaction.table),
        interaction.execution_time.as_secs_f64()
    );

    if let Some(path) = &cli.csv {
        output::write_csv(&interaction.table, path)?;
        println!("Saved CSV to {}", path.display());
    }

    Ok(())
}

/// Prints database status metrics.
async fn print_status(db: &dyn DatabaseClient) -> Result<()> {
    let status = app::database_status(db).await?;

    println!("Database status:");
    println!("  Tables:     {}", status.table_count);
    match status.size_mb {
        Some(mb) => println!("  Size:       {mb} MB"),
        None => println!("  Size:       N/A"),
    }
    println!(
        "  Round trip: {:.3}s",
        status.round_trip.as_secs_f64()
    );

    Ok(())
}

/// Resolves the LLM provider from CLI arguments and config.
fn resolve_provider(cli: &Cli, config: &Config) -> Result<LlmProvider> {
    let name = cli.llm.as_deref().unwrap_or(&config.llm.provider);
    name.parse::<LlmProvider>().map_err(AskdbError::config)
}

/// Resolves the final connection configuration with precedence:
/// 1. CLI arguments (highest)
/// 2. Named connection from config
/// 3. Default connection from config
/// 4. DATABASE_URL environment variable
fn resolve_connection(cli: &Cli, config: &Config) -> Result<Option<ConnectionConfig>> {
    // Start with CLI connection config if provided
    let mut connection = cli.to_connection_config()?;

    // If no CLI connection, try named connection from config
    if connection.is_none() {
        if let Some(name) = cli.connection_name() {
            connection = config.get_connection(Some(name)).cloned();
            if connection.is_none() {
                return Err(AskdbError::config(format!(
                    "Connection '{}' not found in config file",
                    name
                )));
            }
        }
    }

    // If still no connection, try default from config
    if connection.is_none() {
        connection = config.get_connection(None).cloned();
    }

    // Last resort: DATABASE_URL from the environment
    if connection.is_none() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            connection = Some(ConnectionConfig::from_connection_string(&url)?);
        }
    }

    // Apply environment variable defaults
    if let Some(ref mut conn) = connection {
        conn.apply_env_defaults();
    }

    Ok(connection)
}

/// In-memory t-shirts inventory for --mock-db runs.
fn sample_inventory() -> MockDatabaseClient {
    MockDatabaseClient::new()
        .with_table(
            "t_shirts",
            ["t_shirt_id", "brand", "color", "size", "price", "stock_quantity"],
        )
        .with_rows(vec![
            vec![
                Value::Int(1),
                Value::String("Nike".to_string()),
                Value::String("white".to_string()),
                Value::String("XS".to_string()),
                Value::Decimal(Decimal::new(1500, 2)),
                Value::Int(42),
            ],
            vec![
                Value::Int(2),
                Value::String("Adidas".to_string()),
                Value::String("black".to_string()),
                Value::String("L".to_string()),
                Value::Decimal(Decimal::new(1850, 2)),
                Value::Int(17),
            ],
            vec![
                Value::Int(3),
                Value::String("Puma".to_string()),
                Value::String("red".to_string()),
                Value::String("M".to_string()),
                Value::Decimal(Decimal::new(1275, 2)),
                Value::Int(8),
            ],
        ])
}
