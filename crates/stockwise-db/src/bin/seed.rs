//! # Seed Data Generator
//!
//! Populates a development database with a small catalogue and receipts.
//!
//! ## Usage
//! ```bash
//! cargo run -p stockwise-db --bin stockwise-seed
//!
//! # Specify database path (overrides stockwise.toml)
//! cargo run -p stockwise-db --bin stockwise-seed -- --db ./data/dev.db
//!
//! # Use an explicit config file
//! cargo run -p stockwise-db --bin stockwise-seed -- --config ./stockwise.toml
//! ```
//!
//! ## What Gets Created
//! - Discrete items (pieces) and loose items (kg, g) across a few categories
//! - One approved GRN that brings opening stock in through the ledger
//! - One pending GRN, including a line for an item not yet in the catalogue

use chrono::Utc;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stockwise_core::{GrnDecision, GrnLineInput, Money, NewGrn, NewItem, NewItemSpec, Quantity};
use stockwise_db::{BroadcastEventSink, Database, StockwiseConfig};

const SEED_ACTOR: &str = "seed";

/// (name, category, cost in cents, opening stock)
const DISCRETE: &[(&str, &str, i64, i64)] = &[
    ("Ballpoint pen, blue", "Stationery", 45, 200),
    ("A5 notebook", "Stationery", 180, 60),
    ("Dish soap 500ml", "Household", 210, 40),
    ("AA batteries 4-pack", "Household", 390, 25),
    ("Cola 1.5L", "Beverages", 120, 48),
];

/// (name, category, unit, min order, step, cost per unit in cents, opening stock), quantities in hundredths
const LOOSE: &[(&str, &str, &str, i64, i64, i64, i64)] = &[
    ("Basmati rice", "Grains", "kg", 50, 25, 320, 5_000),
    ("Red lentils", "Grains", "kg", 25, 25, 280, 2_500),
    ("Brown sugar", "Baking", "kg", 10, 10, 190, 1_200),
    ("Cashews", "Snacks", "kg", 10, 5, 1_850, 400),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stockwise=debug,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockwise Seed Data Generator");
                println!();
                println!("Usage: stockwise-seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path");
                println!("  -c, --config <PATH>    stockwise.toml to load");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut config = StockwiseConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }

    let db = Database::new(config.db_config()).await?;

    let existing = db.items().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has items, skipping seed");
        return Ok(());
    }

    let mut opening = Vec::new();

    for &(name, category, cost, stock) in DISCRETE {
        let mut input = NewItem::discrete(name, Money::from_cents(cost)).with_category(category);
        input.selling_price = Some(Money::from_cents(cost * 3 / 2));
        input.reorder_level = Quantity::from_units(10);
        let item = db.items().create(&input).await?;
        opening.push(GrnLineInput::existing(&item.id, Quantity::from_units(stock), item.cost_price));
    }

    for &(name, category, unit, min, step, cost, stock) in LOOSE {
        let mut input = NewItem::loose(
            name,
            unit,
            Quantity::from_hundredths(min),
            Quantity::from_hundredths(step),
            Money::from_cents(cost),
        )
        .with_category(category);
        input.selling_price = Some(Money::from_cents(cost * 13 / 10));
        input.reorder_level = Quantity::from_units(5);
        let item = db.items().create(&input).await?;
        opening.push(GrnLineInput::existing(&item.id, Quantity::from_hundredths(stock), item.cost_price));
    }

    info!(items = db.items().count().await?, "Catalogue created");

    let sink = BroadcastEventSink::from_settings(&config.events);
    let mut events = sink.subscribe();
    let workflow = db.grn_workflow(Arc::new(sink));
    let header = NewGrn {
        supplier_id: "supplier-wholesale".to_string(),
        po_reference: Some("PO-OPENING".to_string()),
        received_date: Utc::now().date_naive(),
        received_by: SEED_ACTOR.to_string(),
        notes: Some("Opening stock".to_string()),
    };

    let grn = workflow.create(&header, &opening).await?;
    workflow.transition(&grn.id, GrnDecision::Approve, SEED_ACTOR).await?;
    info!(grn_number = %grn.grn_number, total = %grn.total_amount, "Opening stock received");
    while let Ok(event) = events.try_recv() {
        info!(?event, "Domain event");
    }

    let restock = opening
        .iter()
        .take(2)
        .cloned()
        .chain(std::iter::once(GrnLineInput::new_item(
            NewItemSpec {
                name: "Green tea, loose leaf".to_string(),
                category: "Beverages".to_string(),
                sku: None,
                barcode: None,
                unit: "kg".to_string(),
                is_loose: true,
            },
            Quantity::from_units(3),
            Money::from_cents(2_400),
        )))
        .collect::<Vec<_>>();

    let pending = workflow
        .create(
            &NewGrn {
                po_reference: Some("PO-RESTOCK-1".to_string()),
                notes: None,
                ..header
            },
            &restock,
        )
        .await?;
    info!(grn_number = %pending.grn_number, total = %pending.total_amount, "Pending receipt awaiting approval");

    let low = db.items().low_stock().await?;
    info!(low_stock = low.len(), "Seed complete");

    db.close().await;
    Ok(())
}
