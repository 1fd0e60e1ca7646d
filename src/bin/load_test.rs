//! Load Testing Tool
//!
//! Hammers the Postgres store with crossing transfers and purchases, then
//! checks that no coins were created or destroyed and no balance went
//! negative.
//!
//! Run with: cargo run --bin load_test --release -- --accounts 20 --ops 5000

use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use sqlx::postgres::PgPoolOptions;

use coin_shop::domain::{Balance, Catalog, DomainError, OperationContext};
use coin_shop::handlers::{BuyItemCommand, PurchaseHandler, SendCoinCommand, TransferHandler};
use coin_shop::store::{AccountStore, PgAccountStore};
use coin_shop::db;

const STARTING_COINS: i64 = 1000;

fn arg(args: &[String], name: &str, default: usize) -> usize {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Default)]
struct Tally {
    ok: u64,
    insufficient: u64,
    failed: u64,
    spent: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let account_count = arg(&args, "--accounts", 20).max(2);
    let op_count = arg(&args, "--ops", 5000);

    let database_url = std::env::var("DATABASE_URL")?;

    println!("Load Test - {} operations across {} accounts", op_count, account_count);
    println!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await?;
    db::migrate(&pool).await?;

    let store = Arc::new(PgAccountStore::new(pool.clone()));
    let run_id = uuid::Uuid::new_v4().simple().to_string();
    let usernames: Vec<String> = (0..account_count)
        .map(|i| format!("load_{}_{}", &run_id[..8], i))
        .collect();

    let starting = Balance::new(STARTING_COINS)?;
    for name in &usernames {
        store.create_account(name, "load-test", starting).await?;
    }

    let catalog = Arc::new(Catalog::default());
    let transfers = TransferHandler::new(store.clone());
    let purchases = PurchaseHandler::new(store.clone(), catalog.clone());
    let skus: Vec<(String, i64)> = catalog
        .iter()
        .map(|(sku, price)| (sku.to_string(), price.value()))
        .collect();

    let start = Instant::now();
    let mut tasks = Vec::with_capacity(op_count);

    for _ in 0..op_count {
        let (from, to, buy, amount) = {
            let mut rng = rand::thread_rng();
            let from = rng.gen_range(0..account_count);
            let mut to = rng.gen_range(0..account_count - 1);
            if to >= from {
                to += 1;
            }
            let buy = rng.gen_bool(0.2).then(|| skus[rng.gen_range(0..skus.len())].clone());
            (from, to, buy, rng.gen_range(1..=150))
        };
        let from = usernames[from].clone();
        let to = usernames[to].clone();
        let transfers = transfers.clone();
        let purchases = purchases.clone();

        tasks.push(tokio::spawn(async move {
            let context = OperationContext::new().with_correlation_id(uuid::Uuid::new_v4());
            match buy {
                Some((sku, price)) => purchases
                    .execute(BuyItemCommand::new(from, sku), &context)
                    .await
                    .map(|()| price),
                None => transfers
                    .execute(SendCoinCommand::new(from, to, amount), &context)
                    .await
                    .map(|()| 0),
            }
        }));
    }

    let mut tally = Tally::default();
    for task in tasks {
        match task.await? {
            Ok(spent) => {
                tally.ok += 1;
                tally.spent += spent;
            }
            Err(DomainError::InsufficientFunds) => tally.insufficient += 1,
            Err(e) => {
                tally.failed += 1;
                eprintln!("Operation failed: {}", e);
            }
        }
    }

    let elapsed = start.elapsed();

    let mut total = 0i64;
    let mut negative = 0u64;
    for name in &usernames {
        let account = store
            .resolve_account(name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("account {} disappeared", name))?;
        let coins = account.balance.value();
        if coins < 0 {
            negative += 1;
        }
        total += coins;
    }

    let expected = STARTING_COINS * account_count as i64 - tally.spent;

    println!("\n=== Load Test Results ===");
    println!("Operations: {}", op_count);
    println!("Succeeded: {}", tally.ok);
    println!("Insufficient funds: {}", tally.insufficient);
    println!("Failed: {}", tally.failed);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Rate: {:.0} ops/sec", op_count as f64 / elapsed.as_secs_f64());
    println!("Coins in circulation: {} (expected {})", total, expected);

    if total != expected || negative > 0 {
        anyhow::bail!(
            "integrity violated: total={} expected={} negative_accounts={}",
            total,
            expected,
            negative
        );
    }

    println!("Integrity check passed");
    pool.close().await;

    Ok(())
}
