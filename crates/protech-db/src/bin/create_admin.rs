//! # Admin Provisioning
//!
//! Creates the administrator account, or restores an existing account's
//! admin role and password.
//!
//! ## Usage
//! ```bash
//! PROTECH_ADMIN_PASSWORD=... cargo run -p protech-db --bin create-admin
//! ```
//!
//! `PROTECH_ADMIN_EMAIL` picks the account (default
//! `admin@protechsolutions.cm`).

use protech_core::NewUser;
use protech_db::{init_tracing, Database, StoreConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = StoreConfig::load()?;
    let password = config.require_admin_password()?;

    let db = Database::new(config.db_config()).await?;
    let users = db.users();

    if users.find_by_email(&config.admin_email).await?.is_some() {
        users.promote_to_admin(&config.admin_email).await?;
        users.reset_password(&config.admin_email, password).await?;
        println!(
            "Admin user {} already existed; role and password updated.",
            config.admin_email
        );
    } else {
        users
            .create_admin(&NewUser {
                full_name: "System Administrator".to_string(),
                email: config.admin_email.clone(),
                phone: Some("600000000".to_string()),
                password: password.to_string(),
            })
            .await?;
        println!("Created new admin user: {}", config.admin_email);
    }

    db.close().await;
    Ok(())
}
