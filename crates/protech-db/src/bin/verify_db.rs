//! # Database Check
//!
//! Prints a short summary of what the database holds.
//!
//! ```bash
//! cargo run -p protech-db --bin verify-db
//! ```

use protech_core::Money;
use protech_db::{init_tracing, migrations, Database, StoreConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = StoreConfig::load()?;
    let db = Database::new(config.db_config()).await?;

    println!("--- Database Verification ---");
    println!("Database: {}", config.database_path.display());

    let (total, applied) = migrations::migration_status(db.pool()).await?;
    println!("Migrations: {applied}/{total} applied");

    let products = db.products().list().await?;
    println!("\nProducts listed: {}", products.len());
    for p in products.iter().take(5) {
        println!(
            " - {} ({}) : {} [{}, stock {}]",
            p.name,
            p.category,
            p.unit_price(),
            p.availability,
            p.stock
        );
    }
    if products.len() > 5 {
        println!(" ... and {} more.", products.len() - 5);
    }

    let users = db.users().list().await?;
    let admins = users.iter().filter(|u| u.is_admin).count();
    println!("\nUsers registered: {} ({} admin)", users.len(), admins);

    let orders = db.orders().list_all().await?;
    let revenue: Money = orders.iter().map(|o| Money::new(o.total_amount)).sum();
    println!("\nOrders placed: {} totalling {}", orders.len(), revenue);

    println!("\n-----------------------------");
    if db.health_check().await {
        println!("Database is reachable.");
    } else {
        println!("Database did not answer a health check.");
    }

    db.close().await;
    Ok(())
}
