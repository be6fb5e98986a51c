//! # Domain Types
//!
//! Tax definitions and the pieces they are assembled from.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tax Definition                                  │
//! │                                                                         │
//! │  ┌──────────────────────────┐                                          │
//! │  │          Tax             │                                          │
//! │  │  ──────────────────────  │                                          │
//! │  │  name, rate, type        │   type: percentage | fixed               │
//! │  │  status                  │   status: active | inactive              │
//! │  │  assignments ───────────────► TaxAssignment (OR: any must match)     │
//! │  │  rules ─────────────────────► TaxRule       (AND: all must match)    │
//! │  └──────────────────────────┘                                          │
//! │                                                                         │
//! │  TaxAssignment: targetType (product|category|customer|store|supplier)  │
//! │                 + targetId                                             │
//! │  TaxRule:       conditionField + operator + value + type               │
//! │                 e.g. region == "US", total_amount >= 1000              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Assignments and rules have no life of their own: they are edited as part
//! of their owning tax and persisted with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Type & Status
// =============================================================================

/// How a tax's `rate` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TaxType {
    /// `rate` is a percent of the base price (7.5 = 7.5%).
    Percentage,
    /// `rate` is a flat currency amount (50 = $50.00).
    Fixed,
}

impl TaxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxType::Percentage => "percentage",
            TaxType::Fixed => "fixed",
        }
    }
}

impl FromStr for TaxType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" => Ok(TaxType::Percentage),
            "fixed" => Ok(TaxType::Fixed),
            _ => Err(ValidationError::not_allowed("type", &["percentage", "fixed"])),
        }
    }
}

/// Whether a tax takes part in evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TaxStatus {
    #[default]
    Active,
    Inactive,
}

impl TaxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxStatus::Active => "active",
            TaxStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for TaxStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(TaxStatus::Active),
            "inactive" => Ok(TaxStatus::Inactive),
            _ => Err(ValidationError::not_allowed("status", &["active", "inactive"])),
        }
    }
}

// =============================================================================
// Tax Assignment
// =============================================================================

/// The kind of entity an assignment restricts a tax to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentTarget {
    Product,
    Category,
    Customer,
    Store,
    Supplier,
}

/// One scope restriction on a tax.
///
/// A tax with no assignments applies to every entity. A tax with one or
/// more assignments applies when at least one of them matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxAssignment {
    #[serde(default)]
    pub id: String,

    /// Owning tax. Empty until the tax is first saved.
    #[serde(default)]
    pub tax_id: String,

    pub target_type: AssignmentTarget,

    pub target_id: String,

    /// Denormalized display label ("iPhone 15", "Downtown Store").
    #[serde(default)]
    pub target_name: String,
}

impl TaxAssignment {
    pub fn new(
        target_type: AssignmentTarget,
        target_id: impl Into<String>,
        target_name: impl Into<String>,
    ) -> Self {
        TaxAssignment {
            id: Uuid::new_v4().to_string(),
            tax_id: String::new(),
            target_type,
            target_id: target_id.into(),
            target_name: target_name.into(),
        }
    }
}

// =============================================================================
// Tax Rule
// =============================================================================

/// The context fact a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ConditionField {
    Region,
    TotalAmount,
    CustomerType,
    ProductCategory,
    StoreLocation,
    Quantity,
}

/// Comparison operator of a rule.
///
/// Operators are stored and exchanged as their symbols (`">="`, `"not_in"`).
/// A symbol this build does not know deserializes to
/// [`RuleOperator::Unrecognized`] rather than failing, so that a tax carrying
/// it still loads and simply never applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleOperator {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
    In,
    NotIn,
    Unrecognized(String),
}

impl RuleOperator {
    /// Every operator the evaluator understands.
    pub const SUPPORTED: [RuleOperator; 8] = [
        RuleOperator::Eq,
        RuleOperator::Ne,
        RuleOperator::Ge,
        RuleOperator::Le,
        RuleOperator::Gt,
        RuleOperator::Lt,
        RuleOperator::In,
        RuleOperator::NotIn,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            RuleOperator::Eq => "==",
            RuleOperator::Ne => "!=",
            RuleOperator::Ge => ">=",
            RuleOperator::Le => "<=",
            RuleOperator::Gt => ">",
            RuleOperator::Lt => "<",
            RuleOperator::In => "in",
            RuleOperator::NotIn => "not_in",
            RuleOperator::Unrecognized(raw) => raw,
        }
    }

    /// Whether this operator may be used with a rule of the given value type.
    ///
    /// ```text
    /// ==, !=          string, number
    /// >=, <=, >, <    number
    /// in, not_in      array
    /// ```
    pub fn accepts(&self, value_type: RuleValueType) -> bool {
        match self {
            RuleOperator::Eq | RuleOperator::Ne => {
                matches!(value_type, RuleValueType::Text | RuleValueType::Number)
            }
            RuleOperator::Ge | RuleOperator::Le | RuleOperator::Gt | RuleOperator::Lt => {
                value_type == RuleValueType::Number
            }
            RuleOperator::In | RuleOperator::NotIn => value_type == RuleValueType::Array,
            RuleOperator::Unrecognized(_) => false,
        }
    }

    #[inline]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, RuleOperator::Unrecognized(_))
    }
}

impl From<&str> for RuleOperator {
    fn from(raw: &str) -> Self {
        match raw {
            "==" => RuleOperator::Eq,
            "!=" => RuleOperator::Ne,
            ">=" => RuleOperator::Ge,
            "<=" => RuleOperator::Le,
            ">" => RuleOperator::Gt,
            "<" => RuleOperator::Lt,
            "in" => RuleOperator::In,
            "not_in" => RuleOperator::NotIn,
            _ => RuleOperator::Unrecognized(raw.to_string()),
        }
    }
}

impl From<String> for RuleOperator {
    fn from(raw: String) -> Self {
        RuleOperator::from(raw.as_str())
    }
}

impl From<RuleOperator> for String {
    fn from(op: RuleOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for RuleOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declares how a rule's `value` is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum RuleValueType {
    #[serde(rename = "string")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "string"))]
    Text,
    #[serde(rename = "number")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "number"))]
    Number,
    #[serde(rename = "array")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "array"))]
    Array,
}

/// The right-hand side of a rule.
///
/// Untagged in JSON: `"US"`, `1000` and `["retail", "wholesale"]` are all
/// valid rule values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum RuleValue {
    Num(f64),
    Str(String),
    List(Vec<String>),
}

impl RuleValue {
    /// The value type this value naturally carries.
    pub fn natural_type(&self) -> RuleValueType {
        match self {
            RuleValue::Num(_) => RuleValueType::Number,
            RuleValue::Str(_) => RuleValueType::Text,
            RuleValue::List(_) => RuleValueType::Array,
        }
    }
}

/// One conditional predicate on a tax. All rules of a tax must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxRule {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub tax_id: String,

    pub condition_field: ConditionField,

    #[ts(as = "String")]
    pub operator: RuleOperator,

    pub value: RuleValue,

    #[serde(rename = "type")]
    pub value_type: RuleValueType,
}

impl TaxRule {
    /// Creates a rule whose value type is inferred from `value`.
    pub fn new(condition_field: ConditionField, operator: RuleOperator, value: RuleValue) -> Self {
        TaxRule {
            id: Uuid::new_v4().to_string(),
            tax_id: String::new(),
            condition_field,
            operator,
            value_type: value.natural_type(),
            value,
        }
    }

    /// Overrides the declared value type.
    pub fn with_value_type(mut self, value_type: RuleValueType) -> Self {
        self.value_type = value_type;
        self
    }
}

// =============================================================================
// Tax
// =============================================================================

/// A configured tax definition.
///
/// ## Applicability
/// ```text
/// applies = status == active
///           AND (assignments empty OR any assignment matches)
///           AND (rules empty OR all rules match)
/// ```
/// `product_type` is informational only and is never consulted when
/// deciding applicability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tax {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display label shown on receipts and the tax list.
    pub name: String,

    /// Percent for percentage taxes, currency amount for fixed taxes.
    pub rate: f64,

    #[serde(rename = "type")]
    pub tax_type: TaxType,

    pub status: TaxStatus,

    pub description: Option<String>,

    pub product_type: Option<String>,

    #[serde(default)]
    pub assignments: Vec<TaxAssignment>,

    #[serde(default)]
    pub rules: Vec<TaxRule>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Tax {
    /// Creates an active, unrestricted tax with a fresh id.
    pub fn new(name: impl Into<String>, rate: f64, tax_type: TaxType) -> Self {
        let now = Utc::now();
        Tax {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            rate,
            tax_type,
            status: TaxStatus::Active,
            description: None,
            product_type: None,
            assignments: Vec::new(),
            rules: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: TaxStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_rule(mut self, mut rule: TaxRule) -> Self {
        rule.tax_id = self.id.clone();
        self.rules.push(rule);
        self
    }

    pub fn with_assignment(mut self, mut assignment: TaxAssignment) -> Self {
        assignment.tax_id = self.id.clone();
        self.assignments.push(assignment);
        self
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == TaxStatus::Active
    }

    /// Computes this tax's amount against a base price.
    ///
    /// ```text
    /// percentage:  base_price × rate / 100   (rounded to the cent once)
    /// fixed:       rate (in currency units)
    /// ```
    pub fn amount_for(&self, base_price: Money) -> Money {
        match self.tax_type {
            TaxType::Percentage => base_price.percent(self.rate),
            TaxType::Fixed => Money::from_major(self.rate),
        }
    }
}

// =============================================================================
// New Tax (create / update input)
// =============================================================================

/// The editable part of a tax, as submitted by the tax form.
///
/// The store turns this into a [`Tax`] by assigning the id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewTax {
    pub name: String,

    pub rate: f64,

    #[serde(rename = "type")]
    pub tax_type: TaxType,

    #[serde(default)]
    pub status: TaxStatus,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub product_type: Option<String>,

    #[serde(default)]
    pub assignments: Vec<TaxAssignment>,

    #[serde(default)]
    pub rules: Vec<TaxRule>,
}

impl NewTax {
    /// Builds the stored form of this tax.
    ///
    /// Every assignment and rule is stamped with `id` as its owning tax, and
    /// children submitted without an id get a fresh one. Blank optional text
    /// is normalized to `None`.
    pub fn into_tax(self, id: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Tax {
        let assignments = self
            .assignments
            .into_iter()
            .map(|mut a| {
                if a.id.trim().is_empty() {
                    a.id = Uuid::new_v4().to_string();
                }
                a.tax_id = id.clone();
                a
            })
            .collect();

        let rules = self
            .rules
            .into_iter()
            .map(|mut r| {
                if r.id.trim().is_empty() {
                    r.id = Uuid::new_v4().to_string();
                }
                r.tax_id = id.clone();
                r
            })
            .collect();

        Tax {
            id,
            name: self.name.trim().to_string(),
            rate: self.rate,
            tax_type: self.tax_type,
            status: self.status,
            description: non_blank(self.description),
            product_type: non_blank(self.product_type),
            assignments,
            rules,
            created_at,
            updated_at,
        }
    }
}

impl From<Tax> for NewTax {
    fn from(tax: Tax) -> Self {
        NewTax {
            name: tax.name,
            rate: tax.rate,
            tax_type: tax.tax_type,
            status: tax.status,
            description: tax.description,
            product_type: tax.product_type,
            assignments: tax.assignments,
            rules: tax.rules,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_for_percentage_and_fixed() {
        let vat = Tax::new("VAT", 7.5, TaxType::Percentage);
        assert_eq!(vat.amount_for(Money::from_cents(120_000)).cents(), 9_000);

        let levy = Tax::new("Luxury levy", 50.0, TaxType::Fixed);
        assert_eq!(levy.amount_for(Money::from_cents(120_000)).cents(), 5_000);
        assert_eq!(levy.amount_for(Money::zero()).cents(), 5_000);
    }

    #[test]
    fn test_amount_for_uses_unrounded_rate() {
        let fine = Tax::new("Fine-grained", 7.125, TaxType::Percentage);
        assert_eq!(fine.amount_for(Money::from_cents(120_000)).cents(), 8_550);

        let tiny = Tax::new("Tiny", 0.004, TaxType::Percentage);
        assert_eq!(tiny.amount_for(Money::from_cents(100_000_000)).cents(), 4_000);
    }

    #[test]
    fn test_operator_symbols() {
        for op in RuleOperator::SUPPORTED {
            assert_eq!(RuleOperator::from(op.as_str()), op);
        }
        assert_eq!(
            RuleOperator::from("~="),
            RuleOperator::Unrecognized("~=".to_string())
        );
        assert!(!RuleOperator::from("between").is_recognized());

        // stored symbols are taken literally, padding included
        for padded in [" == ", ">= ", " in"] {
            assert_eq!(
                RuleOperator::from(padded),
                RuleOperator::Unrecognized(padded.to_string())
            );
        }
    }

    #[test]
    fn test_operator_type_compatibility() {
        assert!(RuleOperator::Eq.accepts(RuleValueType::Text));
        assert!(RuleOperator::Ne.accepts(RuleValueType::Number));
        assert!(!RuleOperator::Eq.accepts(RuleValueType::Array));

        assert!(RuleOperator::Ge.accepts(RuleValueType::Number));
        assert!(!RuleOperator::Lt.accepts(RuleValueType::Text));

        assert!(RuleOperator::In.accepts(RuleValueType::Array));
        assert!(!RuleOperator::NotIn.accepts(RuleValueType::Text));

        assert!(!RuleOperator::Unrecognized("?".into()).accepts(RuleValueType::Number));
    }

    #[test]
    fn test_rule_json_shape() {
        let json = r#"{
            "conditionField": "total_amount",
            "operator": ">=",
            "value": 1000,
            "type": "number"
        }"#;
        let rule: TaxRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.condition_field, ConditionField::TotalAmount);
        assert_eq!(rule.operator, RuleOperator::Ge);
        assert_eq!(rule.value, RuleValue::Num(1000.0));
        assert_eq!(rule.value_type, RuleValueType::Number);
        assert!(rule.id.is_empty());

        let list: TaxRule = serde_json::from_str(
            r#"{"conditionField":"customer_type","operator":"in","value":["retail","vip"],"type":"array"}"#,
        )
        .unwrap();
        assert_eq!(
            list.value,
            RuleValue::List(vec!["retail".to_string(), "vip".to_string()])
        );

        let odd: TaxRule = serde_json::from_str(
            r#"{"conditionField":"region","operator":"like","value":"U%","type":"string"}"#,
        )
        .unwrap();
        assert_eq!(odd.operator, RuleOperator::Unrecognized("like".to_string()));

        let out = serde_json::to_value(&rule).unwrap();
        assert_eq!(out["operator"], ">=");
        assert_eq!(out["type"], "number");
    }

    #[test]
    fn test_tax_json_shape() {
        let tax = Tax::new("GST", 5.0, TaxType::Percentage)
            .with_assignment(TaxAssignment::new(AssignmentTarget::Store, "s-1", "Downtown"));
        let json = serde_json::to_value(&tax).unwrap();

        assert_eq!(json["type"], "percentage");
        assert_eq!(json["status"], "active");
        assert_eq!(json["assignments"][0]["targetType"], "store");
        assert_eq!(json["assignments"][0]["taxId"], tax.id.as_str());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_new_tax_into_tax_stamps_children() {
        let input: NewTax = serde_json::from_str(
            r#"{
                "name": "  City Tax ",
                "rate": 2,
                "type": "percentage",
                "description": "   ",
                "assignments": [{"targetType": "category", "targetId": "electronics"}],
                "rules": [{"conditionField": "region", "operator": "==", "value": "US", "type": "string"}]
            }"#,
        )
        .unwrap();
        assert_eq!(input.status, TaxStatus::Active);

        let now = Utc::now();
        let tax = input.into_tax("tax-1".to_string(), now, now);

        assert_eq!(tax.name, "City Tax");
        assert_eq!(tax.description, None);
        assert_eq!(tax.assignments[0].tax_id, "tax-1");
        assert!(!tax.assignments[0].id.is_empty());
        assert_eq!(tax.rules[0].tax_id, "tax-1");
        assert!(!tax.rules[0].id.is_empty());
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!("Percentage".parse::<TaxType>().unwrap(), TaxType::Percentage);
        assert_eq!("inactive".parse::<TaxStatus>().unwrap(), TaxStatus::Inactive);
        assert!("flat".parse::<TaxType>().is_err());
    }
}
