//! # Seed Data Generator
//!
//! Loads example salary templates for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p cashplan-db --bin seed
//!
//! # Specify database path
//! cargo run -p cashplan-db --bin seed -- --db ./data/cashplan.db
//! ```
//!
//! Denominations are seeded by the initial migration; this only adds
//! templates, and only into an empty template table.

use cashplan_core::NewTemplate;
use cashplan_db::{Database, DbConfig};
use std::env;

/// (name, rank, department, salary)
const TEMPLATES: &[(&str, &str, &str, i64)] = &[
    ("Senior Engineer", "Grade 1", "Engineering", 1_250_000),
    ("Department Manager", "Grade 2", "Administration", 1_450_000),
    ("Medical Doctor", "Specialist", "Healthcare", 1_350_000),
    ("Senior Accountant", "Grade 3", "Finance", 980_000),
    ("IT Specialist", "Grade 4", "Information Technology", 850_000),
    ("HR Manager", "Grade 2", "Human Resources", 1_100_000),
    ("Teacher - High School", "Senior", "Education", 750_000),
    ("Legal Advisor", "Grade 3", "Legal", 1_050_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./cashplan_dev.db");

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
                println!("cashplan Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./cashplan_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 cashplan Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let templates = db.templates();
    let existing = templates.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} templates", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut created = 0;
    for (name, rank, department, salary) in TEMPLATES {
        let input = NewTemplate::new(name, rank, department, *salary);
        if let Err(e) = templates.create(&input).await {
            eprintln!("Failed to insert {}: {}", name, e);
            continue;
        }
        created += 1;
    }

    println!();
    println!("✓ Created {} salary templates", created);
    println!(
        "✓ {} denominations in stock",
        db.denominations().list().await?.len()
    );

    db.close().await;
    Ok(())
}
