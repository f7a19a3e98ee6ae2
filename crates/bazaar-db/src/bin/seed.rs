//! # Seed Data Generator
//!
//! Populates a provisioned database with a small marketplace catalogue for
//! development.
//!
//! ## Usage
//! ```bash
//! # Catalogue plus 3 orders (default)
//! cargo run -p bazaar-db --bin seed
//!
//! # Catalogue plus 20 orders
//! cargo run -p bazaar-db --bin seed -- --orders 20
//! ```
//!
//! Connection settings come from the `DB_*` variables (a `.env` file in the
//! working directory is loaded first). `LOG_LEVEL` sets the log filter.
//!
//! Items, sellers and users have fixed IDs and are skipped when they already
//! exist, so the seed can be rerun. Orders get fresh IDs on every run.

use std::env;

use bazaar_core::{Item, Order, Seller, User};
use bazaar_db::{Database, DbConfig, ErrorKind, Repository};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Sample items: (id, name, description)
const ITEMS: &[(&str, &str, &str)] = &[
    ("item-lamp", "Desk Lamp", "Brass desk lamp with linen shade"),
    ("item-rug", "Wool Rug", "Hand-woven wool rug, 2x3m"),
    ("item-kettle", "Kettle", "Stovetop kettle, 1.5L"),
    ("item-mug", "Stoneware Mug", "Glazed stoneware mug, 350ml"),
    ("item-chair", "Oak Chair", "Solid oak dining chair"),
    ("item-clock", "Wall Clock", "Silent sweep wall clock"),
];

/// Sample sellers: (id, name)
const SELLERS: &[(&str, &str)] = &[
    ("seller-north", "Northwind Goods"),
    ("seller-harbor", "Harbor Home"),
];

/// Sample users: (id, name, password)
const USERS: &[(&str, &str, &str)] = &[
    ("user-ada", "Ada", "seed-password-1"),
    ("user-grace", "Grace", "seed-password-2"),
    ("user-linus", "Linus", "seed-password-3"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut orders: usize = 3;
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    orders = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bazaar Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>   Number of orders to create (default: 3)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = DbConfig::from_env()?;
    let db = Database::connect(&config).await?;

    let mut created = 0;
    for (id, name, description) in ITEMS {
        created += seed_one(&db.items(), &Item::new(*id, *name, *description)).await?;
    }
    for (id, name) in SELLERS {
        created += seed_one(&db.sellers(), &Seller::new(*id, *name)).await?;
    }
    for (id, name, password) in USERS {
        created += seed_one(&db.users(), &User::new(*id, *name, *password)).await?;
    }

    for n in 0..orders {
        let (user_id, _, _) = USERS[n % USERS.len()];
        let items = ITEMS
            .iter()
            .skip(n % ITEMS.len())
            .take(1 + n % 3)
            .map(|(id, _, _)| *id);
        let order = Order::new(Uuid::new_v4().to_string(), user_id, items);
        created += seed_one(&db.orders(), &order).await?;
    }

    info!(created, "Seed complete");

    println!("Items:   {}", db.items().list().await?.len());
    println!("Sellers: {}", db.sellers().list().await?.len());
    println!("Users:   {}", db.users().list().await?.len());
    println!("Orders:  {}", db.orders().list().await?.len());

    db.close().await;
    Ok(())
}

/// Creates one record, treating an existing record as already seeded.
///
/// Returns 1 if the record was created, 0 if it already existed.
async fn seed_one<R>(repo: &R, entity: &R::Entity) -> Result<usize, bazaar_db::DbError>
where
    R: Repository,
{
    match repo.create(entity).await {
        Ok(_) => Ok(1),
        Err(e) if e.is(ErrorKind::DuplicateKey) => {
            warn!(error = %e, "Already seeded, skipping");
            Ok(0)
        }
        Err(e) => Err(e),
    }
}

/// Installs the log subscriber.
///
/// `LOG_LEVEL` takes any `EnvFilter` directive (`debug`, `bazaar_db=trace`).
/// Default: `info`.
fn init_tracing() {
    let filter = env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
