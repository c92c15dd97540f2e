use std::{fs::OpenOptions, path::PathBuf, process::ExitCode, sync::Arc};

use clap::{Parser, Subcommand};
use time::Date;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use budgeteur_sync::{
    ConfigOverrides, Error, HttpPageStore, SyncConfig, SyncProgress, TransactionSynchronizer,
    models::{Category, Transaction},
    period::{day_label, parse_day},
    timezone,
};

/// Record and review expenses in the remote page database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The API token for the remote service.
    #[arg(long, env = "NOTION_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// The ID of the transaction database.
    #[arg(long, env = "NOTION_DATABASE_ID", global = true)]
    database_id: Option<String>,

    /// The ID of the month summary database.
    #[arg(long, env = "NOTION_MONTH_SUMMARY_DATABASE_ID", global = true)]
    month_database_id: Option<String>,

    /// The ID of the week summary database.
    #[arg(long, env = "NOTION_WEEK_SUMMARY_DATABASE_ID", global = true)]
    week_database_id: Option<String>,

    /// The base URL of the remote service.
    #[arg(long, env = "NOTION_BASE_URL", global = true)]
    base_url: Option<String>,

    /// The canonical timezone used to work out today's date, e.g. "Asia/Shanghai".
    #[arg(long, env = "LEDGER_TIMEZONE", global = true)]
    timezone: Option<String>,

    /// Also write debug logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record an expense.
    Add {
        /// The amount spent.
        #[arg(long)]
        amount: f64,

        /// The category code (e.g. FOOD) or label (e.g. 吃饭).
        #[arg(long, default_value = "DAILY")]
        category: Category,

        /// A short note, used as the page title.
        #[arg(long, default_value = "")]
        note: String,

        /// What the transaction was for.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List the most recent transactions.
    List,
    /// Move a transaction to the trash.
    Delete {
        /// The ID of the transaction page.
        id: String,
    },
    /// Show expense totals for a day, its week and its month.
    Stats {
        /// The day to report on as YYYY-MM-DD, defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
    },
    /// List the categories.
    Categories,
}

fn parse_date(value: &str) -> Result<Date, String> {
    parse_day(value).ok_or_else(|| format!("\"{value}\" is not a YYYY-MM-DD date"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.log_file.as_ref());

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Error> {
    if let Command::Categories = args.command {
        print_categories();
        return Ok(());
    }

    let config = SyncConfig::resolve(ConfigOverrides {
        api_key: args.api_key,
        database_id: args.database_id,
        month_database_id: args.month_database_id,
        week_database_id: args.week_database_id,
        base_url: args.base_url,
        local_timezone: args.timezone,
    });
    tracing::debug!("Using {config:?}");

    let store = Arc::new(HttpPageStore::new(&config)?);
    let synchronizer = TransactionSynchronizer::new(store, config);

    match args.command {
        Command::Add {
            amount,
            category,
            note,
            description,
        } => {
            let transaction = Transaction::build(amount, category)
                .note(&note)
                .description(&description)
                .finalise()?;

            match synchronizer.add_transaction(&transaction).await? {
                SyncProgress::Linked {
                    page_id,
                    month,
                    week,
                } => println!(
                    "Added {page_id} ({} {amount:.2}) to {} and {}",
                    category.label(),
                    month.period_label,
                    week.period_label
                ),
                progress => println!("Added {}", progress.page_id()),
            }
        }
        Command::List => {
            let transactions = synchronizer.fetch_transactions().await?;
            print_transactions(&transactions);
        }
        Command::Delete { id } => {
            synchronizer.delete_transaction(&id).await?;
            println!("Deleted {id}");
        }
        Command::Stats { date } => {
            let today = match date {
                Some(date) => date,
                None => timezone::today(synchronizer.config().local_timezone.as_deref())?,
            };
            let statistics = synchronizer.load_statistics(today).await?;

            println!("{:<12}{:>12.2}", "Today", statistics.daily_expenses);
            println!("{:<12}{:>12.2}", "This week", statistics.weekly_expenses);
            println!(
                "{:<12}{:>12.2}",
                statistics.current_month, statistics.monthly_expenses
            );
            println!();
            for (day, total) in &statistics.daily_totals {
                println!("{:<12}{total:>12.2}", day_label(*day));
            }
        }
        Command::Categories => print_categories(),
    }

    Ok(())
}

fn print_transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions.");
        return;
    }

    println!(
        "{:<12}{:>10}  {:<6}{:<38}{}",
        "Date", "Amount", "Tag", "ID", "Description"
    );
    for transaction in transactions {
        let date = transaction.date.split('T').next().unwrap_or_default();
        println!(
            "{date:<12}{:>10.2}  {:<6}{:<38}{}",
            transaction.amount,
            transaction.category.label(),
            transaction.remote_id.as_deref().unwrap_or("-"),
            transaction.description
        );
    }
}

fn print_categories() {
    for category in Category::ALL {
        println!("{:<16}{}", format!("{category:?}").to_uppercase(), category.label());
    }
}

fn setup_logging(log_file: Option<&PathBuf>) {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let debug_log = log_file.map(|path| {
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("Could not create log file");

        tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(Arc::new(log_file))
            .with_filter(filter::LevelFilter::DEBUG)
    });

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}
