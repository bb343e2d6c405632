use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use tillpoint_client::ProductsClient;
use tillpoint_core::money;
use tillpoint_pos::{commit_restock, NotificationQueue, RestockSelection, TokioScheduler};

const DEFAULT_STAGGER_MS: u64 = 250;

#[derive(Debug, Parser)]
#[command(name = "tillpoint-cli")]
#[command(about = "Tillpoint command line interface")]
struct Cli {
    /// Base URL of the tillpoint server.
    #[arg(
        long,
        global = true,
        env = "TILLPOINT_API_URL",
        default_value = "http://localhost:4000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List catalog products.
    Products {
        /// Filter by a name substring.
        #[arg(long)]
        search: Option<String>,
    },
    /// Insert the demo catalog into the database (requires DATABASE_URL).
    Seed,
    /// Apply stock increases, e.g. --item <uuid>=5 --item <uuid>=3.
    Restock {
        #[arg(long = "item", value_name = "ID=QTY", required = true)]
        items: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Products { search } => list_products(&cli.api_url, search.as_deref()).await,
        Commands::Seed => seed().await,
        Commands::Restock { items } => restock(&cli.api_url, &items).await,
    }
}

async fn list_products(api_url: &str, search: Option<&str>) -> anyhow::Result<()> {
    let client = ProductsClient::new(api_url, 10)?;
    let products = client.list_products(search).await?;

    if products.is_empty() {
        println!("no products found");
        return Ok(());
    }

    println!("{:<38} {:>10} {:>7}  {}", "ID", "PRICE", "STOCK", "NAME");
    for product in &products {
        println!(
            "{:<38} {:>9}{} {:>4} {:<3} {}",
            product.id,
            money::symbol_or_code(product.display_currency()),
            product.price,
            product.stock_quantity,
            product.display_unit(),
            product.name,
        );
    }
    Ok(())
}

async fn seed() -> anyhow::Result<()> {
    let pool = tillpoint_db::connect_pool_from_env().await?;
    tillpoint_db::run_migrations(&pool).await?;
    let inserted = tillpoint_db::seed_demo_catalog(&pool).await?;
    println!("seeded {inserted} row(s)");
    Ok(())
}

async fn restock(api_url: &str, raw_items: &[String]) -> anyhow::Result<()> {
    let mut staged = Vec::with_capacity(raw_items.len());
    for raw in raw_items {
        let (id, qty) = parse_restock_item(raw).map_err(|e| anyhow::anyhow!(e))?;
        staged.push((id, qty));
    }

    let client = ProductsClient::new(api_url, 10)?;
    let catalog = client.list_products(None).await?;

    let ids: Vec<Uuid> = staged.iter().map(|(id, _)| *id).collect();
    let mut selection = RestockSelection::open(&ids);
    for (id, qty) in staged {
        selection.set_quantity(id, qty);
    }

    let notifications = NotificationQueue::new(Arc::new(TokioScheduler));
    let stagger = Duration::from_millis(stagger_ms());
    let report = commit_restock(&mut selection, &catalog, &client, &notifications, stagger).await;

    for applied in &report.applied {
        println!(
            "restocked {} (+{}) -> {}",
            applied.name, applied.added, applied.new_quantity
        );
    }
    if !report.skipped.is_empty() {
        println!("skipped {} item(s) with zero quantity", report.skipped.len());
    }
    if let Some(failed) = &report.failed {
        anyhow::bail!(
            "restock aborted at product {}: {} ({} item(s) were already applied)",
            failed.product_id,
            failed.message,
            report.applied.len()
        );
    }
    Ok(())
}

fn stagger_ms() -> u64 {
    std::env::var("TILLPOINT_RESTOCK_STAGGER_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_STAGGER_MS)
}

/// Parses an `--item` argument of the form `<uuid>=<quantity>`.
fn parse_restock_item(raw: &str) -> Result<(Uuid, i32), String> {
    let (id, qty) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <uuid>=<quantity>, got '{raw}'"))?;
    let id = id
        .trim()
        .parse::<Uuid>()
        .map_err(|e| format!("bad product id '{id}': {e}"))?;
    let qty = qty
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("bad quantity '{qty}': {e}"))?;
    if qty < 0 {
        return Err(format!("quantity must be non-negative, got {qty}"));
    }
    Ok((id, qty))
}
