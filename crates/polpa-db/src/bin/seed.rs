//! # Seed Data Generator
//!
//! Populates the database with the demo açaí-shop catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default store (loja1)
//! cargo run -p polpa-db --bin seed
//!
//! # Specify database path and store
//! cargo run -p polpa-db --bin seed -- --db ./data/polpa.db --store loja2
//! ```
//!
//! ## Seeded Products
//! A fixed menu rather than generated bulk data, in both pricing modes:
//! - Weighable (per-kg): açaí and sorvete sold by the scale
//! - Unit: cup sizes, combos, milkshakes, vitaminas, drinks, add-ons
//!
//! Packaged drinks carry barcodes; everything else is keyed in by code.

use std::env;

use polpa_core::{NewProduct, ProductCategory, DEFAULT_STORE_ID};
use polpa_db::{Database, DbConfig};
use rust_decimal::Decimal;

/// Unit-priced product. Price given in centavos.
fn unit(
    code: &str,
    name: &str,
    category: ProductCategory,
    price_centavos: i64,
    stock: i64,
) -> NewProduct {
    NewProduct {
        code: code.to_string(),
        name: name.to_string(),
        category,
        is_weighable: false,
        unit_price: Some(Decimal::new(price_centavos, 2)),
        price_per_gram: None,
        image_url: None,
        stock_quantity: stock,
        min_stock: 10,
        is_active: true,
        barcode: None,
        description: None,
    }
}

/// Weighable product. Price given in centavos per kilogram; stored per gram.
fn weighed(code: &str, name: &str, category: ProductCategory, centavos_per_kg: i64) -> NewProduct {
    NewProduct {
        code: code.to_string(),
        name: name.to_string(),
        category,
        is_weighable: true,
        unit_price: None,
        price_per_gram: Some(Decimal::new(centavos_per_kg, 5)),
        image_url: None,
        stock_quantity: 0,
        min_stock: 0,
        is_active: true,
        barcode: None,
        description: None,
    }
}

/// The demo menu.
fn demo_catalog() -> Vec<NewProduct> {
    use ProductCategory::*;

    let mut catalog = vec![
        // Sold by the scale
        weighed("ACAI-KG", "Açaí no Peso", Acai, 4499),
        weighed("SORV-KG", "Sorvete no Peso", Sorvetes, 3990),
        // Cup sizes
        unit("ACAI-300", "Açaí 300ml", Acai, 990, 100),
        unit("ACAI-500", "Açaí 500ml", Acai, 1290, 100),
        unit("ACAI-700", "Açaí 700ml", Acai, 1590, 100),
        // Combos
        unit("BARCA-1", "Barca de Açaí", Combo, 2990, 30),
        unit("COMBO-CASAL", "Combo Casal", Combo, 2490, 30),
        // Blended
        unit("MILK-400", "Milkshake Morango 400ml", Milkshake, 1490, 50),
        unit("MILK-500", "Milkshake Chocolate 500ml", Milkshake, 1690, 50),
        unit("VIT-300", "Vitamina de Banana 300ml", Vitamina, 890, 50),
        // Add-ons
        unit("ADD-GRANOLA", "Adicional Granola", Complementos, 200, 200),
        unit("ADD-LEITE", "Adicional Leite em Pó", Complementos, 250, 200),
        unit("ADD-NUTELLA", "Adicional Nutella", Complementos, 400, 150),
        // Desserts
        unit("SOBRE-PUD", "Pudim Fatia", Sobremesas, 750, 20),
    ];

    // Packaged drinks are the only barcoded items
    let mut agua = unit("AGUA-500", "Água Mineral 500ml", Bebidas, 300, 120);
    agua.barcode = Some("7894900011517".to_string());
    catalog.push(agua);

    let mut refri = unit("REFRI-LATA", "Refrigerante Lata", Bebidas, 500, 120);
    refri.barcode = Some("7894900027013".to_string());
    catalog.push(refri);

    catalog
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./polpa_dev.db");
    let mut store_id = String::from(DEFAULT_STORE_ID);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--store" | "-s" => {
                if i + 1 < args.len() {
                    store_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Polpa POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: ./polpa_dev.db)");
                println!("  -s, --store <ID>    Store to seed (default: {})", DEFAULT_STORE_ID);
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Polpa POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Store:    {}", store_id);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let products = db.products(store_id.as_str());
    let existing = products.count().await?;
    if existing > 0 {
        println!("⚠ Store {} already has {} products", store_id, existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Insert the menu
    println!();
    println!("Seeding catalog...");

    let catalog = demo_catalog();
    let mut seeded = 0;

    for product in &catalog {
        if let Err(e) = products.insert(product).await {
            eprintln!("Failed to insert {}: {}", product.code, e);
            continue;
        }
        seeded += 1;
    }

    println!("✓ Seeded {} of {} products", seeded, catalog.len());

    // Verify search
    println!();
    println!("Verifying search...");
    let search_results = products.search("açaí").await?;
    println!("  Search 'açaí': {} results", search_results.len());

    let search_results = products.search("ACAI").await?;
    println!("  Search 'ACAI': {} results", search_results.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
