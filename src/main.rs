use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use quotebook::budget::{resolve_prefix, ActionOutcome, Budget, DestructiveAction};
use quotebook::calc;
use quotebook::config::AppConfig;
use quotebook::db::SqliteStore;
use quotebook::error::BudgetError;
use quotebook::models::ItemInput;
use quotebook::persistence::PersistenceGateway;
use quotebook::render::{self, MoneyFormat};

#[derive(Parser)]
#[command(name = "qb")]
#[command(about = "Quote and budget line items with live totals and saved history")]
struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    /// Database file (overrides config and QUOTEBOOK_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ItemArgs {
    /// What is being quoted
    description: String,
    #[arg(short, long, default_value_t = 1.0)]
    quantity: f64,
    #[arg(short = 'p', long)]
    price: f64,
    /// Discount percentage; values outside 0-100 count as clamped
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    discount: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a line item
    Add(ItemArgs),
    /// Change fields of an existing item
    Edit {
        /// Item id or unique prefix
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        quantity: Option<f64>,
        #[arg(short = 'p', long)]
        price: Option<f64>,
        #[arg(short, long, allow_negative_numbers = true)]
        discount: Option<f64>,
    },
    /// Remove an item
    Remove {
        id: String,
    },
    /// Show the current items and totals
    List,
    /// Show the current totals
    Totals,
    /// Compute an item's amounts without adding it
    Preview {
        #[arg(short, long, default_value_t = 1.0)]
        quantity: f64,
        #[arg(short = 'p', long)]
        price: f64,
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        discount: f64,
    },
    /// Clear the current items and start over
    New,
    /// Save the current items to the history
    Save,
    /// List saved budgets
    History,
    /// Replace the current items with a saved budget
    Restore {
        id: String,
    },
    /// Delete one saved budget
    DeleteSnapshot {
        id: String,
    },
    /// Delete every saved budget
    ClearHistory,
}

/// Initialize tracing on stderr so stdout only carries command output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "quotebook=warn".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_store(cli_path: Option<PathBuf>, config: &AppConfig) -> anyhow::Result<SqliteStore> {
    let path = match cli_path.or_else(|| config.resolved_database_path()) {
        Some(path) => path,
        None => SqliteStore::default_path()?,
    };
    tracing::debug!("Opening database at {}", path.display());

    let store = SqliteStore::open(path.clone())
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    store.migrate()?;
    Ok(store)
}

/// Ask on stdin unless prompts are disabled.
fn confirmer(skip: bool) -> impl FnOnce(DestructiveAction) -> bool {
    move |action| {
        if skip {
            return true;
        }
        print!("{} [y/N] ", action.prompt());
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

fn report(outcome: ActionOutcome, applied: &str, nothing: &str) {
    match outcome {
        ActionOutcome::Applied => println!("{}", applied),
        ActionOutcome::Declined => println!("Cancelled."),
        ActionOutcome::NothingToDo => println!("{}", nothing),
    }
}

fn item_id(budget: &Budget, prefix: &str) -> Result<Uuid, BudgetError> {
    resolve_prefix(prefix, budget.items().iter().map(|i| i.id()))
}

fn snapshot_id(budget: &Budget, prefix: &str) -> Result<Uuid, BudgetError> {
    resolve_prefix(prefix, budget.history_summaries().iter().map(|s| s.id))
}

fn run(
    command: Commands,
    budget: &mut Budget,
    money: &MoneyFormat,
    skip_prompts: bool,
) -> Result<(), BudgetError> {
    match command {
        Commands::Add(args) => {
            let item = budget.add_item(ItemInput::new(
                args.description,
                args.quantity,
                args.price,
                args.discount,
            ))?;
            println!(
                "Added {} ({}): {}",
                item.description(),
                render::short_id(&item.id()),
                money.format(item.subtotal())
            );
        }
        Commands::Edit {
            id,
            description,
            quantity,
            price,
            discount,
        } => {
            let id = item_id(budget, &id)?;
            let current = budget.begin_edit(id)?;
            let item = budget.submit(ItemInput {
                description: description.unwrap_or(current.description),
                quantity: quantity.unwrap_or(current.quantity),
                unit_price: price.unwrap_or(current.unit_price),
                discount_percent: discount.unwrap_or(current.discount_percent),
            });
            if item.is_err() {
                budget.cancel_edit();
            }
            let item = item?;
            println!("Updated {}: {}", item.description(), money.format(item.subtotal()));
        }
        Commands::Remove { id } => {
            let outcome = match item_id(budget, &id) {
                Ok(id) => budget.remove_item(id, confirmer(skip_prompts)),
                Err(BudgetError::NotFound(_)) => ActionOutcome::NothingToDo,
                Err(e) => return Err(e),
            };
            report(outcome, "Item removed.", "No such item.");
        }
        Commands::List => {
            print!("{}", render::render_items(&budget.items(), money));
            println!();
            print!("{}", render::render_totals(&budget.compute_totals(), money));
        }
        Commands::Totals => {
            print!("{}", render::render_totals(&budget.compute_totals(), money));
        }
        Commands::Preview {
            quantity,
            price,
            discount,
        } => {
            print!(
                "{}",
                render::render_preview(&calc::preview(quantity, price, discount), money)
            );
        }
        Commands::New => {
            let outcome = budget.new_budget(confirmer(skip_prompts));
            report(outcome, "New budget started.", "No items to clear.");
        }
        Commands::Save => {
            let snapshot = budget.save_snapshot()?;
            println!(
                "Saved budget {} to history.",
                render::short_id(&snapshot.id())
            );
        }
        Commands::History => {
            print!("{}", render::render_history(&budget.history_summaries(), money));
        }
        Commands::Restore { id } => {
            let id = snapshot_id(budget, &id)?;
            let outcome = budget.restore_snapshot(id, confirmer(skip_prompts))?;
            report(outcome, "Budget restored.", "Nothing to restore.");
        }
        Commands::DeleteSnapshot { id } => {
            let outcome = match snapshot_id(budget, &id) {
                Ok(id) => budget.delete_snapshot_entry(id, confirmer(skip_prompts)),
                Err(BudgetError::NotFound(_)) => ActionOutcome::NothingToDo,
                Err(e) => return Err(e),
            };
            report(outcome, "History entry deleted.", "No such history entry.");
        }
        Commands::ClearHistory => {
            let outcome = budget.clear_history(confirmer(skip_prompts));
            report(outcome, "History cleared.", "History is already empty.");
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load();
    let store = open_store(cli.db, &config)?;
    let mut budget = Budget::open(PersistenceGateway::new(store));
    let money = MoneyFormat::from_config(&config);
    let skip_prompts = cli.yes || !config.confirm_destructive;

    let command = cli.command.unwrap_or(Commands::List);
    if let Err(e) = run(command, &mut budget, &money, skip_prompts) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if !budget.is_durable() {
        eprintln!("Warning: changes are not saved to disk yet.");
    }

    Ok(())
}
