//! # Seed Data Generator
//!
//! Populates the database with sample tax definitions for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockroom_dev.db
//! cargo run -p stockroom-db --bin seed
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! ## Generated Taxes
//! One tax per situation the evaluator distinguishes:
//! - US Sales Tax: 7.5%, only when `region == "US"`
//! - Large Order Levy: $50 fixed, only when `total_amount >= 1000`
//! - iPhone Import Duty: 2.5%, scoped to product `iphone15`
//! - Retired Luxury Tax: inactive, never evaluated
//! - Wholesale Surcharge: 1%, `customer_type in [wholesale, distributor]`
//!   AND `quantity >= 10` (two AND'd rules)
//! - Downtown Store Fee: $1.25 fixed, scoped to a store or a category

use std::env;

use stockroom_core::{
    AssignmentTarget, ConditionField, NewTax, RuleOperator, RuleValue, TaxAssignment, TaxRule,
    TaxStatus, TaxType,
};
use stockroom_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockroom_dev.db");

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
                println!("Stockroom Tax Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./stockroom_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("🌱 Stockroom Tax Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.taxes().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} taxes", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let samples = sample_taxes();
    let created = db.taxes().create_many(samples).await?;

    println!();
    for tax in &created {
        println!(
            "  + {:<22} {:>6} {:<10} {:<8} {} rule(s), {} assignment(s)",
            tax.name,
            tax.rate,
            tax.tax_type.as_str(),
            tax.status.as_str(),
            tax.rules.len(),
            tax.assignments.len()
        );
    }

    let active = db.taxes().list_active().await?;
    println!();
    println!("✓ Seeded {} taxes ({} active)", created.len(), active.len());

    Ok(())
}

fn sample_taxes() -> Vec<NewTax> {
    vec![
        sample(
            "US Sales Tax",
            7.5,
            TaxType::Percentage,
            TaxStatus::Active,
            Some("State sales tax for US transactions"),
            vec![],
            vec![rule(
                ConditionField::Region,
                RuleOperator::Eq,
                RuleValue::Str("US".into()),
            )],
        ),
        sample(
            "Large Order Levy",
            50.0,
            TaxType::Fixed,
            TaxStatus::Active,
            Some("Flat levy on orders of 1000 or more"),
            vec![],
            vec![rule(
                ConditionField::TotalAmount,
                RuleOperator::Ge,
                RuleValue::Num(1000.0),
            )],
        ),
        sample(
            "iPhone Import Duty",
            2.5,
            TaxType::Percentage,
            TaxStatus::Active,
            None,
            vec![TaxAssignment::new(
                AssignmentTarget::Product,
                "iphone15",
                "iPhone 15",
            )],
            vec![],
        ),
        sample(
            "Retired Luxury Tax",
            12.0,
            TaxType::Percentage,
            TaxStatus::Inactive,
            Some("No longer collected"),
            vec![],
            vec![],
        ),
        sample(
            "Wholesale Surcharge",
            1.0,
            TaxType::Percentage,
            TaxStatus::Active,
            None,
            vec![],
            vec![
                rule(
                    ConditionField::CustomerType,
                    RuleOperator::In,
                    RuleValue::List(vec!["wholesale".into(), "distributor".into()]),
                ),
                rule(
                    ConditionField::Quantity,
                    RuleOperator::Ge,
                    RuleValue::Num(10.0),
                ),
            ],
        ),
        sample(
            "Downtown Store Fee",
            1.25,
            TaxType::Fixed,
            TaxStatus::Active,
            None,
            vec![
                TaxAssignment::new(AssignmentTarget::Store, "store-downtown", "Downtown Store"),
                TaxAssignment::new(AssignmentTarget::Category, "electronics", "Electronics"),
            ],
            vec![],
        ),
    ]
}

fn sample(
    name: &str,
    rate: f64,
    tax_type: TaxType,
    status: TaxStatus,
    description: Option<&str>,
    assignments: Vec<TaxAssignment>,
    rules: Vec<TaxRule>,
) -> NewTax {
    NewTax {
        name: name.to_string(),
        rate,
        tax_type,
        status,
        description: description.map(str::to_string),
        product_type: None,
        assignments,
        rules,
    }
}

fn rule(field: ConditionField, operator: RuleOperator, value: RuleValue) -> TaxRule {
    TaxRule::new(field, operator, value)
}
