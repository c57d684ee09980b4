use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    expense_breakdown, sort_newest_first, Category, CategoryFilter, ExpenseStore,
    NewTransaction, Period, SqliteStorage, Summary, TransactionFilter, TransactionPatch,
    TransactionType, TypeFilter,
};

/// Track income and expenses from the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// File path to the storage database.
    #[arg(long, env = "EXPENSE_TRACKER_DB", default_value = "expense-tracker.db")]
    db: PathBuf,

    /// Namespace the transactions are stored under.
    #[arg(long, env = "EXPENSE_TRACKER_KEY", default_value = expense_tracker::STORAGE_KEY)]
    key: String,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "EXPENSE_TRACKER_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a new transaction
    Add {
        description: String,
        amount: f64,
        #[arg(long, short = 'c', default_value = "Other")]
        category: Category,
        #[arg(long = "type", short = 't', default_value = "expense")]
        transaction_type: TransactionType,
        /// YYYY-MM-DD (local time) or RFC 3339; defaults to now
        #[arg(long, short = 'd')]
        date: Option<String>,
    },
    /// Change some fields of an existing transaction
    Edit {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long, short = 'c')]
        category: Option<Category>,
        #[arg(long = "type", short = 't')]
        transaction_type: Option<TransactionType>,
        #[arg(long, short = 'd')]
        date: Option<String>,
    },
    /// Remove a transaction
    Delete { id: String },
    /// List transactions, newest first
    List {
        #[arg(long = "type", default_value = "all")]
        transaction_type: TypeFilter,
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
        #[arg(long, default_value = "all")]
        period: Period,
    },
    /// Balance, totals and category breakdown
    Summary {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the available categories
    Categories,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let storage = SqliteStorage::open(&cli.db)?;
    let mut store = ExpenseStore::open_with_key(storage, &cli.key)?;
    tracing::info!(db = %cli.db.display(), key = store.key(), count = store.len(), "store opened");

    match cli.command {
        Command::Add {
            description,
            amount,
            category,
            transaction_type,
            date,
        } => {
            validate_description(&description)?;
            validate_amount(amount)?;
            let date = match date {
                Some(raw) => parse_date(&raw)?,
                None => Utc::now(),
            };
            let added = store.add(NewTransaction::new(
                description.trim(),
                amount,
                category,
                transaction_type,
                date,
            ))?;
            println!("✓ Added {}", added.id);
        }
        Command::Edit {
            id,
            description,
            amount,
            category,
            transaction_type,
            date,
        } => {
            let mut patch = TransactionPatch::new();
            if let Some(description) = description {
                validate_description(&description)?;
                patch = patch.description(description.trim());
            }
            if let Some(amount) = amount {
                validate_amount(amount)?;
                patch = patch.amount(amount);
            }
            if let Some(category) = category {
                patch = patch.category(category);
            }
            if let Some(transaction_type) = transaction_type {
                patch = patch.transaction_type(transaction_type);
            }
            if let Some(raw) = date {
                patch = patch.date(parse_date(&raw)?);
            }
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field");
            }

            if store.update(&id, patch)? {
                println!("✓ Updated {}", id);
            } else {
                println!("No transaction with id {}", id);
            }
        }
        Command::Delete { id } => {
            if store.delete(&id)? {
                println!("✓ Deleted {}", id);
            } else {
                println!("No transaction with id {}", id);
            }
        }
        Command::List {
            transaction_type,
            category,
            period,
        } => {
            let filter = TransactionFilter {
                transaction_type,
                category,
                period,
            };
            let all = store.transactions();
            let mut shown = filter.apply(&all, &Local::now());
            sort_newest_first(&mut shown);

            if all.is_empty() {
                println!("No transactions yet. Add your first one with `add`.");
                return Ok(());
            }

            for tx in &shown {
                println!(
                    "{}  {}  {:<10} {:<30} {:+.2}",
                    tx.id,
                    tx.date.with_timezone(&Local).format("%Y-%m-%d"),
                    tx.category,
                    tx.description,
                    tx.signed_amount()
                );
            }
            let noun = if all.len() == 1 { "transaction" } else { "transactions" };
            println!("\nShowing {} of {} {}", shown.len(), all.len(), noun);
        }
        Command::Summary { json } => {
            let transactions = store.transactions();
            let summary = Summary::from_transactions(&transactions);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!("Balance:   {:>12.2}", summary.balance);
            println!("Income:    {:>12.2}", summary.total_income);
            println!("Expenses:  {:>12.2}", summary.total_expenses);

            let breakdown = expense_breakdown(&transactions);
            if breakdown.is_empty() {
                println!("\nNo expenses recorded yet");
            } else {
                println!("\nExpenses by category:");
                for share in breakdown {
                    println!(
                        "  {:<10} {:>12.2}  {:>5.1}%",
                        share.category, share.amount, share.percentage
                    );
                }
            }
        }
        Command::Categories => {
            for category in Category::ALL {
                println!("{}", category);
            }
        }
    }

    Ok(())
}

fn init_logging(default_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        bail!("description must not be empty");
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        bail!("amount must be a positive number, got {}", amount);
    }
    Ok(())
}

/// Accepts a plain local date (midnight local time) or a full RFC 3339 timestamp
fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }

    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}' (expected YYYY-MM-DD)", raw))?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .context("invalid time of day")?;
    let local = Local
        .from_local_datetime(&midnight)
        .earliest()
        .with_context(|| format!("'{}' does not exist in the local time zone", raw))?;
    Ok(local.with_timezone(&Utc))
}
