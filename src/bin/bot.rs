use std::{
    env::{self},
    fs::OpenOptions,
    sync::{Arc, Mutex},
    time::Duration,
};

use clap::{Parser, ValueEnum};
use rusqlite::Connection;
use teloxide::Bot;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use skarbnyk::{
    Dispatch, JsonLedger, LedgerStore, SqliteLedger, get_local_offset, initialize_db, run_bot,
};

/// How long to wait before reconnecting after the update loop fails.
const RESTART_DELAY: Duration = Duration::from_secs(5);

/// The Telegram bot for skarbnyk.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the ledger database or document.
    #[arg(long, default_value = "finance.db")]
    db_path: String,

    /// The storage backend that keeps the ledger.
    #[arg(long, value_enum, default_value_t = LedgerBackend::Sqlite)]
    ledger: LedgerBackend,

    /// The canonical timezone entries are dated in.
    #[arg(long, default_value = "Europe/Kyiv")]
    timezone: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LedgerBackend {
    /// A SQLite database file.
    Sqlite,
    /// A JSON document file.
    Json,
}

#[tokio::main]
async fn main() {
    setup_logging();

    dotenvy::dotenv().ok();

    let args = Args::parse();

    let token = env::var("BOT_TOKEN").expect("The environment variable 'BOT_TOKEN' must be set");
    let bot = Bot::new(token);

    get_local_offset(&args.timezone)
        .expect("The --timezone argument must be a canonical timezone name, e.g. 'Europe/Kyiv'");

    match args.ledger {
        LedgerBackend::Sqlite => {
            let connection = Connection::open(&args.db_path).unwrap();
            initialize_db(&connection).expect("Could not initialize the database");

            let ledger = SqliteLedger::new(Arc::new(Mutex::new(connection)));
            run(bot, ledger, &args.timezone).await;
        }
        LedgerBackend::Json => {
            let ledger = JsonLedger::open(&args.db_path).expect("Could not open the ledger file");
            run(bot, ledger, &args.timezone).await;
        }
    }
}

/// Serve updates until the bot is stopped, reconnecting after failures.
async fn run<S>(bot: Bot, ledger: S, timezone: &str)
where
    S: LedgerStore + 'static,
{
    let dispatch = Arc::new(Dispatch::new(ledger, timezone));

    loop {
        match run_bot(bot.clone(), Arc::clone(&dispatch)).await {
            Ok(()) => break,
            Err(error) => {
                tracing::error!("the bot stopped with an error: {error}");
                tokio::time::sleep(RESTART_DELAY).await;
            }
        }
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}
