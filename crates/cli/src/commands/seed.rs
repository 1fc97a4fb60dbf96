//! Seed the admin database with demo data.
//!
//! Inserts two wholesale buyers and one draft invoice so a fresh environment
//! has something to exercise the invoice flow against. Safe to re-run; it
//! skips seeding when any buyer already exists.

use rust_decimal::Decimal;
use secrecy::SecretString;
use tracing::info;

use refit_admin::db::{self, BuyerRepository, InvoiceRepository};
use refit_admin::models::buyer::NewBuyer;
use refit_admin::models::invoice::NewInvoiceItem;
use refit_core::types::Money;
use refit_shipping::Address;

/// Seed demo buyers and a draft invoice.
///
/// # Errors
///
/// Returns an error if `ADMIN_DATABASE_URL` is missing or inserts fail.
pub async fn admin() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "ADMIN_DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to admin database");

    let buyers = BuyerRepository::new(&pool);
    if !buyers.list().await?.is_empty() {
        info!("Buyers already exist, skipping seed");
        return Ok(());
    }

    let first = buyers
        .create(&NewBuyer {
            name: "Marcus Webb".to_owned(),
            company: Some("Peachtree Wireless".to_owned()),
            email: "marcus@peachtreewireless.example".to_owned(),
            phone: Some("404-555-0142".to_owned()),
            address: Address {
                name: "Marcus Webb".to_owned(),
                company: Some("Peachtree Wireless".to_owned()),
                street1: "2200 Piedmont Rd NE".to_owned(),
                street2: Some("Suite 400".to_owned()),
                city: "Atlanta".to_owned(),
                state: "GA".to_owned(),
                zip: "30324".to_owned(),
                country: "US".to_owned(),
                phone: Some("404-555-0142".to_owned()),
                is_default: false,
            },
        })
        .await?;
    info!(buyer = %first.name, "Created buyer");

    let second = buyers
        .create(&NewBuyer {
            name: "Dana Ortiz".to_owned(),
            company: Some("Gulf Coast Devices".to_owned()),
            email: "dana@gulfcoastdevices.example".to_owned(),
            phone: None,
            address: Address {
                name: "Dana Ortiz".to_owned(),
                company: Some("Gulf Coast Devices".to_owned()),
                street1: "811 Harbor Blvd".to_owned(),
                street2: None,
                city: "Tampa".to_owned(),
                state: "FL".to_owned(),
                zip: "33602".to_owned(),
                country: "US".to_owned(),
                phone: None,
                is_default: false,
            },
        })
        .await?;
    info!(buyer = %second.name, "Created buyer");

    let items = vec![
        NewInvoiceItem {
            description: "iPhone 14 Pro 256GB Unlocked (Grade B)".to_owned(),
            quantity: 5,
            unit_price: Money::new(Decimal::new(420_00, 2)),
        },
        NewInvoiceItem {
            description: "iPhone 13 128GB Unlocked (Grade C)".to_owned(),
            quantity: 10,
            unit_price: Money::new(Decimal::new(215_00, 2)),
        },
    ];

    let invoice = InvoiceRepository::new(&pool)
        .create(first.id, Some("Demo draft invoice"), &items)
        .await?;

    info!(
        invoice = %invoice.invoice_number,
        total = %invoice.total,
        "Created draft invoice"
    );
    info!("Seeding complete");

    Ok(())
}
