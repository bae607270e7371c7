//! # Catalogue Seeder
//!
//! Loads the launch catalogue into the database.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by PROTECH_DB_PATH (default ./protech.db)
//! cargo run -p protech-db --bin seed
//!
//! # Specify database path
//! cargo run -p protech-db --bin seed -- --db ./data/protech.db
//! ```
//!
//! Products already present (matched by exact name) are left alone, so the
//! seeder can be run repeatedly.

use std::env;

use protech_core::NewProduct;
use protech_db::{init_tracing, Database, StoreConfig};
use tracing::info;

/// (name, category, price FCFA, specs, warranty, image)
const CATALOGUE: &[(&str, &str, i64, &str, &str, &str)] = &[
    (
        "Dell Latitude 5420",
        "Computers",
        450_000,
        "14\" FHD, Intel i5-1135G7, 8GB RAM, 256GB SSD",
        "12 months",
        "images/dell_latitude_5420.png",
    ),
    (
        "HP ProBook 450 G8",
        "Computers",
        520_000,
        "15.6\" FHD, Intel i7-1165G7, 16GB RAM, 512GB SSD",
        "12 months",
        "images/hp_probook_450_g8.png",
    ),
    (
        "Lenovo ThinkPad T14",
        "Computers",
        480_000,
        "14\" FHD, AMD Ryzen 5, 8GB RAM, 256GB SSD",
        "12 months",
        "images/dell_latitude_5420.png",
    ),
    (
        "Cisco Small Business Router",
        "Networking",
        95_000,
        "Dual-band, 5 Gigabit ports, VPN support",
        "24 months",
        "images/cisco_router.png",
    ),
    (
        "TP-Link 24-Port Switch",
        "Networking",
        120_000,
        "10/100/1000 Mbps, Rackmount, Unmanaged",
        "36 months",
        "images/cisco_router.png",
    ),
    (
        "Ubiquiti UniFi AP AC Pro",
        "Networking",
        85_000,
        "Dual-band WiFi, PoE, up to 450 Mbps",
        "12 months",
        "images/cisco_router.png",
    ),
    (
        "Logitech MX Master 3",
        "Accessories",
        35_000,
        "Wireless Mouse, 7 buttons, 4000 DPI",
        "12 months",
        "images/logitech_mx_master_3.png",
    ),
    (
        "Logitech MX Keys",
        "Accessories",
        45_000,
        "Wireless Keyboard, Backlit, USB-C charging",
        "12 months",
        "images/logitech_mx_master_3.png",
    ),
    (
        "HDMI Cable 2m",
        "Accessories",
        3_500,
        "4K support, High speed, Gold plated",
        "6 months",
        "images/logitech_mx_master_3.png",
    ),
    (
        "Seagate Backup Plus 2TB",
        "Storage",
        45_000,
        "External HDD, USB 3.0, Portable",
        "24 months",
        "images/hp_probook_450_g8.png",
    ),
    (
        "Samsung T7 SSD 1TB",
        "Storage",
        95_000,
        "External SSD, USB 3.2, 1050 MB/s read",
        "36 months",
        "images/hp_probook_450_g8.png",
    ),
    (
        "SanDisk Ultra 128GB USB",
        "Storage",
        7_500,
        "USB 3.0, 130 MB/s read speed",
        "12 months",
        "images/hp_probook_450_g8.png",
    ),
];

/// Opening stock for every seeded product.
const INITIAL_STOCK: i64 = 50;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = StoreConfig::load()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: seed [--db PATH]");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║              ProTech Catalogue Seeder                      ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!("  Database: {}", config.database_path.display());

    let db = Database::new(config.db_config()).await?;
    let products = db.products();

    let mut inserted = 0;
    for (name, category, price, specs, warranty, image) in CATALOGUE {
        if products.find_by_name(name).await?.is_some() {
            continue;
        }

        products
            .create(&NewProduct {
                name: name.to_string(),
                category: category.to_string(),
                price: *price,
                description: None,
                specs: Some(specs.to_string()),
                image_url: Some(image.to_string()),
                stock: Some(INITIAL_STOCK),
                warranty: Some(warranty.to_string()),
            })
            .await?;
        inserted += 1;
    }

    info!(inserted, total = CATALOGUE.len(), "Catalogue seeded");
    println!(
        "  Seeded {} new product(s), {} already present.",
        inserted,
        CATALOGUE.len() - inserted
    );

    db.close().await;
    Ok(())
}
