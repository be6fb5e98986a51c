//! # Calculate Command
//!
//! Runs a calculation context against every active tax.
//!
//! ```text
//! context.json ──► validate_context ──► list_active() ──► evaluator::calculate
//!                                                              │
//!                                                              ▼
//!                                       TaxSummary { basePrice, totalTax,
//!                                                    finalPrice, results }
//! ```

use std::time::Instant;
use tracing::info;

use crate::error::CliError;
use stockroom_core::evaluator;
use stockroom_core::validation::validate_context;
use stockroom_core::{CoreError, TaxCalculationContext, TaxSummary};
use stockroom_db::Database;

pub async fn run(db: &Database, context: TaxCalculationContext) -> Result<TaxSummary, CliError> {
    validate_context(&context).map_err(CoreError::InvalidContext)?;

    let start = Instant::now();
    let taxes = db.taxes().list_active().await?;
    let summary = evaluator::calculate(&taxes, &context);

    info!(
        taxes = taxes.len(),
        applied = summary.applied().count(),
        total_tax = %summary.total_tax,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Calculation complete"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use stockroom_core::{
        AssignmentTarget, ConditionField, Money, NewTax, RuleOperator, RuleValue, TaxAssignment,
        TaxRule, TaxStatus, TaxType,
    };
    use stockroom_db::DbConfig;

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.taxes()
            .create_many(vec![
                NewTax {
                    name: "US Sales Tax".into(),
                    rate: 7.5,
                    tax_type: TaxType::Percentage,
                    status: TaxStatus::Active,
                    description: None,
                    product_type: None,
                    assignments: vec![],
                    rules: vec![TaxRule::new(
                        ConditionField::Region,
                        RuleOperator::Eq,
                        RuleValue::Str("US".into()),
                    )],
                },
                NewTax {
                    name: "Large Order Levy".into(),
                    rate: 50.0,
                    tax_type: TaxType::Fixed,
                    status: TaxStatus::Active,
                    description: None,
                    product_type: None,
                    assignments: vec![],
                    rules: vec![TaxRule::new(
                        ConditionField::TotalAmount,
                        RuleOperator::Ge,
                        RuleValue::Num(1000.0),
                    )],
                },
                NewTax {
                    name: "iPhone Duty".into(),
                    rate: 10.0,
                    tax_type: TaxType::Percentage,
                    status: TaxStatus::Inactive,
                    description: None,
                    product_type: None,
                    assignments: vec![TaxAssignment::new(
                        AssignmentTarget::Product,
                        "iphone15",
                        "iPhone 15",
                    )],
                    rules: vec![],
                },
            ])
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_calculate_against_stored_taxes() {
        let db = seeded().await;
        let context = TaxCalculationContext::new(Money::from_cents(120_000))
            .with_region("US")
            .with_product("iphone15")
            .with_total_amount(Money::from_cents(120_000));

        let summary = run(&db, context).await.unwrap();

        // The inactive duty is not part of the output at all.
        assert_eq!(summary.results.len(), 2);
        assert!(summary.results.iter().all(|r| r.applied));
        assert_eq!(summary.total_tax.cents(), 9_000 + 5_000);
        assert_eq!(summary.final_price.cents(), 134_000);
    }

    #[tokio::test]
    async fn test_calculate_wrong_region() {
        let db = seeded().await;
        let context = TaxCalculationContext::new(Money::from_cents(120_000)).with_region("CA");

        let summary = run(&db, context).await.unwrap();
        let sales = summary
            .results
            .iter()
            .find(|r| r.tax_name == "US Sales Tax")
            .unwrap();
        assert!(!sales.applied);
        assert_eq!(sales.amount.cents(), 9_000);
        assert_eq!(summary.final_price.cents(), 120_000);
    }

    #[tokio::test]
    async fn test_calculate_from_json_in_currency_units() {
        let db = seeded().await;
        let context: TaxCalculationContext =
            serde_json::from_str(r#"{"basePrice": 1200, "region": "US", "totalAmount": 1200}"#)
                .unwrap();

        let out = serde_json::to_value(run(&db, context).await.unwrap()).unwrap();
        assert_eq!(out["basePrice"], 1200);
        assert_eq!(out["totalTax"], 140);
        assert_eq!(out["finalPrice"], 1340);

        let levy = out["results"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["taxName"] == "Large Order Levy")
            .unwrap();
        assert_eq!(levy["amount"], 50);
        assert_eq!(levy["applied"], true);
    }

    #[tokio::test]
    async fn test_out_of_range_base_price_rejected() {
        let db = seeded().await;
        let err = run(&db, TaxCalculationContext::new(Money::from_cents(i64::MAX - 10)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_negative_base_price_rejected() {
        let db = seeded().await;
        let err = run(&db, TaxCalculationContext::new(Money::from_cents(-1)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
