//! # Seed Data Generator
//!
//! Populates the database with a small demo shop for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p shopbook-db --bin seed
//!
//! # Specify database path
//! cargo run -p shopbook-db --bin seed -- --db ./data/shopbook.db
//! ```
//!
//! ## Generated Data
//! - A handful of categories and products with stock
//! - One vendor, one customer
//! - A stock-in purchase
//! - A fully paid cash sale
//! - A partially paid credit sale with a due date
//! - An expense bill that is already overdue
//! - An outstanding loan
//!
//! Ends with an overdue sweep so the stored statuses are current.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use std::env;

use shopbook_db::repository::catalog::NewProduct;
use shopbook_db::repository::expense::NewExpense;
use shopbook_db::repository::loan::NewLoan;
use shopbook_db::repository::party::NewParty;
use shopbook_db::repository::purchase::NewPurchase;
use shopbook_db::repository::sale::{NewSale, NewSaleLine};
use shopbook_db::{Database, DbConfig};

/// (category, sku, name, price cents, cost cents, stock, reorder level)
const PRODUCTS: &[(&str, &str, &str, i64, i64, i64, i64)] = &[
    ("Stationery", "PEN-01", "Ballpoint Pen", 150, 90, 120, 24),
    ("Stationery", "NBK-A5", "A5 Notebook", 450, 280, 60, 12),
    ("Stationery", "STAP-1", "Desk Stapler", 899, 540, 15, 4),
    ("Beverages", "WTR-500", "Spring Water 500ml", 120, 60, 200, 48),
    ("Beverages", "COF-250", "Ground Coffee 250g", 1_250, 820, 30, 8),
    ("Cleaning", "SOAP-L", "Liquid Soap 1L", 650, 390, 40, 10),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./shopbook_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Shopbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./shopbook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Shopbook Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().count_products().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Utc::now().date_naive();

    // Catalog
    let mut product_ids = Vec::new();
    let mut last_category: Option<(String, String)> = None;
    for &(category, sku, name, price, cost, stock, reorder) in PRODUCTS {
        let category_id = match &last_category {
            Some((cached_name, id)) if cached_name == category => id.clone(),
            _ => {
                let created = db.catalog().create_category(category, None).await?;
                last_category = Some((category.to_string(), created.id.clone()));
                created.id
            }
        };

        let product = db
            .catalog()
            .create_product(NewProduct {
                category_id: Some(category_id),
                sku: sku.to_string(),
                name: name.to_string(),
                description: None,
                unit_price_cents: price,
                unit_cost_cents: Some(cost),
                stock_quantity: stock,
                reorder_level: Some(reorder),
            })
            .await?;
        product_ids.push(product.id);
    }
    println!("✓ Seeded {} products", product_ids.len());

    // Parties
    let vendor = db
        .parties()
        .create_vendor(NewParty {
            name: "Acme Wholesale".to_string(),
            phone: Some("555-0100".to_string()),
            ..Default::default()
        })
        .await?;
    let customer = db
        .parties()
        .create_customer(NewParty {
            name: "Corner Cafe".to_string(),
            phone: Some("555-0188".to_string()),
            ..Default::default()
        })
        .await?;
    println!("✓ Seeded vendor and customer");

    // A stock-in purchase last week
    db.purchases()
        .record(NewPurchase {
            vendor_id: vendor.id.clone(),
            product_id: product_ids[0].clone(),
            quantity: 48,
            unit_cost_cents: 85,
            reference: Some("ACME-1042".to_string()),
            purchased_at: today - Duration::days(7),
        })
        .await?;
    println!("✓ Seeded purchase");

    // A cash sale, paid in full at the counter
    db.sales()
        .create_sale(NewSale {
            invoice_number: None,
            customer_id: None,
            sale_date: today,
            amount_paid_cents: 2 * 150 + 450,
            due_date: None,
            notes: None,
            lines: vec![
                NewSaleLine {
                    product_id: product_ids[0].clone(),
                    quantity: 2,
                },
                NewSaleLine {
                    product_id: product_ids[1].clone(),
                    quantity: 1,
                },
            ],
        })
        .await?;

    // A credit sale to the cafe, half collected, rest due next month
    let credit = db
        .sales()
        .create_sale(NewSale {
            invoice_number: None,
            customer_id: Some(customer.id.clone()),
            sale_date: today,
            amount_paid_cents: 0,
            due_date: Some(today + Duration::days(30)),
            notes: Some("monthly supplies run".to_string()),
            lines: vec![NewSaleLine {
                product_id: product_ids[4].clone(),
                quantity: 4,
            }],
        })
        .await?;
    db.sales()
        .record_payment(&credit.id, credit.total_cents / 2)
        .await?;
    println!("✓ Seeded sales");

    // An expense bill that was due last week
    db.expenses()
        .create(NewExpense {
            title: "Shop rent".to_string(),
            category: Some("rent".to_string()),
            amount_due_cents: 120_000,
            amount_paid_cents: 0,
            due_date: Some(today - Duration::days(7)),
            notes: None,
        })
        .await?;
    println!("✓ Seeded expense");

    // An outstanding loan
    db.loans()
        .create(NewLoan {
            lender: "First Street Bank".to_string(),
            principal_cents: 500_000,
            due_date: NaiveDate::from_ymd_opt(today.year(), 12, 31),
            notes: Some("startup capital".to_string()),
        })
        .await?;
    println!("✓ Seeded loan");

    // Bring stored statuses current
    let now = Utc::now();
    let flipped = db.expenses().refresh_overdue(now).await?
        + db.sales().refresh_overdue(now).await?
        + db.loans().refresh_overdue(now).await?;
    println!("✓ Overdue sweep marked {} record(s)", flipped);

    let summary = serde_json::json!({
        "products": db.catalog().count_products().await?,
        "receivablesOutstanding": db.sales().list_outstanding().await?.len(),
        "expensesOutstanding": db.expenses().list_outstanding().await?.len(),
        "loansOutstanding": db.loans().list_outstanding().await?.len(),
    });
    println!();
    println!("Done: {}", summary);

    db.close().await;
    Ok(())
}
