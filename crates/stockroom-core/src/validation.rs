//! # Validation Module
//!
//! Input validation for tax definitions and calculation contexts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Tax form (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Operator dropdown filtered by value type                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE, run by the store before create/update           │
//! │  ├── Name, description, rate bounds                                    │
//! │  └── Rule operator/type compatibility                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite CHECK constraints)                          │
//! │                                                                         │
//! │  The evaluator does NOT re-run these checks: a rule that slips         │
//! │  through simply never matches.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_rate, validate_tax_name};
//! use stockroom_core::TaxType;
//!
//! validate_tax_name("US Sales Tax").unwrap();
//! validate_rate(TaxType::Percentage, 7.5).unwrap();
//! assert!(validate_rate(TaxType::Percentage, 120.0).is_err());
//! ```

use crate::context::TaxCalculationContext;
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewTax, RuleValue, RuleValueType, TaxAssignment, TaxRule, TaxType};
use crate::{MAX_AMOUNT, MAX_PERCENTAGE_RATE, MAX_TAX_DESCRIPTION_LEN, MAX_TAX_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a tax name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 100 characters
pub fn validate_tax_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_TAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_TAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional description (at most 500 characters).
pub fn validate_description(description: Option<&str>) -> ValidationResult<()> {
    match description {
        Some(text) if text.trim().chars().count() > MAX_TAX_DESCRIPTION_LEN => {
            Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: MAX_TAX_DESCRIPTION_LEN,
            })
        }
        _ => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a tax rate for its type.
///
/// ## Rules
/// - Must be a finite number
/// - Must not be negative
/// - Percentage rates must not exceed 100
/// - Fixed rates must not exceed [`MAX_AMOUNT`]
pub fn validate_rate(tax_type: TaxType, rate: f64) -> ValidationResult<()> {
    if !rate.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "rate".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if rate < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "rate".to_string(),
        });
    }

    if tax_type == TaxType::Percentage && rate > MAX_PERCENTAGE_RATE {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0.0,
            max: MAX_PERCENTAGE_RATE,
        });
    }

    if tax_type == TaxType::Fixed && rate > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0.0,
            max: MAX_AMOUNT,
        });
    }

    Ok(())
}

// =============================================================================
// Rule & Assignment Validators
// =============================================================================

/// Validates a rule definition.
///
/// ## Rules
/// - Operator must be one the evaluator knows
/// - Operator must be compatible with the declared value type
/// - The value must have the shape the declared type promises
///   (a list for `array`, a number or numeric text for `number`)
pub fn validate_rule(rule: &TaxRule) -> ValidationResult<()> {
    if !rule.operator.is_recognized() {
        return Err(ValidationError::NotAllowed {
            field: "operator".to_string(),
            allowed: crate::types::RuleOperator::SUPPORTED
                .iter()
                .map(|op| op.as_str().to_string())
                .collect(),
        });
    }

    if !rule.operator.accepts(rule.value_type) {
        return Err(ValidationError::IncompatibleOperator {
            operator: rule.operator.to_string(),
            value_type: value_type_name(rule.value_type).to_string(),
        });
    }

    let shape_ok = match (rule.value_type, &rule.value) {
        (RuleValueType::Array, RuleValue::List(_)) => true,
        (RuleValueType::Array, _) => false,
        (_, RuleValue::List(_)) => false,
        (RuleValueType::Number, RuleValue::Num(n)) => n.is_finite(),
        (RuleValueType::Number, RuleValue::Str(s)) => s.trim().parse::<f64>().is_ok(),
        (RuleValueType::Text, _) => true,
    };

    if !shape_ok {
        return Err(ValidationError::InvalidFormat {
            field: "value".to_string(),
            reason: format!("does not match rule type '{}'", value_type_name(rule.value_type)),
        });
    }

    Ok(())
}

fn value_type_name(value_type: RuleValueType) -> &'static str {
    match value_type {
        RuleValueType::Text => "string",
        RuleValueType::Number => "number",
        RuleValueType::Array => "array",
    }
}

/// Validates a scope assignment (target id must be present).
pub fn validate_assignment(assignment: &TaxAssignment) -> ValidationResult<()> {
    if assignment.target_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "targetId".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates a submitted tax definition as a whole.
///
/// ## User Workflow
/// ```text
/// Tax form "Save"
///      │
///      ▼
/// validate_tax(&new_tax) ← THIS FUNCTION
///      │
///      ├── name empty?            → "name is required"
///      ├── percentage rate > 100? → "rate must be between 0 and 100"
///      ├── '>=' on array rule?    → "operator '>=' cannot be used with array values"
///      │
///      └── OK → TaxRepository::create / update
/// ```
pub fn validate_tax(tax: &NewTax) -> ValidationResult<()> {
    validate_tax_name(&tax.name)?;
    validate_rate(tax.tax_type, tax.rate)?;
    validate_description(tax.description.as_deref())?;

    for assignment in &tax.assignments {
        validate_assignment(assignment)?;
    }

    for rule in &tax.rules {
        validate_rule(rule)?;
    }

    Ok(())
}

/// Validates a calculation context at the boundary, before evaluation.
///
/// ## Rules
/// - Base price must not be negative nor exceed [`MAX_AMOUNT`]
/// - Quantity and total amount, when given, must not be negative
/// - Total amount must not exceed [`MAX_AMOUNT`]
pub fn validate_context(context: &TaxCalculationContext) -> ValidationResult<()> {
    if context.base_price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "basePrice".to_string(),
        });
    }

    validate_amount_bound("basePrice", context.base_price)?;
    if let Some(total) = context.total_amount {
        validate_amount_bound("totalAmount", total)?;
    }

    if matches!(context.quantity, Some(q) if q < 0) {
        return Err(ValidationError::MustBeNonNegative {
            field: "quantity".to_string(),
        });
    }

    if matches!(context.total_amount, Some(total) if total.is_negative()) {
        return Err(ValidationError::MustBeNonNegative {
            field: "totalAmount".to_string(),
        });
    }

    Ok(())
}

fn validate_amount_bound(field: &str, amount: Money) -> ValidationResult<()> {
    if amount > Money::from_major(MAX_AMOUNT) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
