//! # Calculation Context
//!
//! The transaction-time facts a tax is evaluated against. Contexts are built
//! by the caller (sale screen, invoice editor) and never persisted.
//!
//! ## Field Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Rules read facts by ConditionField     Assignments read ids by target │
//! │  ─────────────────────────────────     ──────────────────────────────  │
//! │  region           → region              product  → product_id          │
//! │  total_amount     → total_amount        category → category_id         │
//! │  customer_type    → customer_type       customer → customer_id         │
//! │  product_category → product_category    store    → store_id            │
//! │  store_location   → store_location      supplier → supplier_id         │
//! │  quantity         → quantity                                           │
//! │                                                                         │
//! │  A fact the caller did not supply is None: the rule or assignment      │
//! │  reading it does not match.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{AssignmentTarget, ConditionField};

/// Input to tax evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculationContext {
    /// The amount taxes are computed against, in currency units.
    pub base_price: Money,

    pub product_id: Option<String>,
    pub category_id: Option<String>,
    pub customer_id: Option<String>,
    pub store_id: Option<String>,
    pub supplier_id: Option<String>,

    pub region: Option<String>,
    pub customer_type: Option<String>,
    pub quantity: Option<i64>,
    pub product_category: Option<String>,
    pub store_location: Option<String>,

    /// Transaction total, in currency units.
    pub total_amount: Option<Money>,
}

/// A context fact as seen by a rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContextValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl ContextValue<'_> {
    /// The value coerced to a number. Text that does not parse is `NaN`.
    pub fn as_number(&self) -> f64 {
        match self {
            ContextValue::Number(n) => *n,
            ContextValue::Text(s) => coerce_number(s),
        }
    }

    /// The value's string form, used for list membership.
    pub fn to_text(&self) -> String {
        match self {
            ContextValue::Text(s) => (*s).to_string(),
            ContextValue::Number(n) => number_to_text(*n),
        }
    }
}

/// Formats a number the way the tax forms print it: plain decimals for
/// everyday magnitudes, exponent form (`1e+21`, `1.5e-7`) outside
/// `1e-6 ..< 1e21`.
fn number_to_text(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return n.to_string();
    }

    let text = format!("{:e}", n);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}

/// Parses text as a number the lenient way form inputs are read.
///
/// - surrounding whitespace is ignored, blank text is zero
/// - decimal and exponent numerals (`12`, `-.5`, `1e3`)
/// - `0x`/`0o`/`0b` integers, unsigned
/// - `Infinity` with an optional sign, spelled exactly
///
/// Anything else (`inf`, `nan`, `12px`, `1_000`) is `NaN`.
pub fn coerce_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return u128::from_str_radix(digits, radix).map_or(f64::INFINITY, |v| v as f64);
    }

    // f64::from_str also takes "inf", "infinity" and "nan" in any case;
    // only digits, signs, a point and an exponent marker are numerals here.
    let numeral = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !numeral {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

impl TaxCalculationContext {
    /// Creates a context carrying only a base price.
    pub fn new(base_price: Money) -> Self {
        TaxCalculationContext {
            base_price,
            ..Default::default()
        }
    }

    /// Reads the fact a rule condition refers to.
    pub fn field_value(&self, field: ConditionField) -> Option<ContextValue<'_>> {
        match field {
            ConditionField::Region => self.region.as_deref().map(ContextValue::Text),
            ConditionField::CustomerType => self.customer_type.as_deref().map(ContextValue::Text),
            ConditionField::ProductCategory => {
                self.product_category.as_deref().map(ContextValue::Text)
            }
            ConditionField::StoreLocation => self.store_location.as_deref().map(ContextValue::Text),
            ConditionField::Quantity => self.quantity.map(|q| ContextValue::Number(q as f64)),
            ConditionField::TotalAmount => self
                .total_amount
                .map(|amount| ContextValue::Number(amount.as_major())),
        }
    }

    /// Reads the entity id an assignment of the given target type refers to.
    pub fn target_id(&self, target: AssignmentTarget) -> Option<&str> {
        match target {
            AssignmentTarget::Product => self.product_id.as_deref(),
            AssignmentTarget::Category => self.category_id.as_deref(),
            AssignmentTarget::Customer => self.customer_id.as_deref(),
            AssignmentTarget::Store => self.store_id.as_deref(),
            AssignmentTarget::Supplier => self.supplier_id.as_deref(),
        }
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    pub fn with_product(mut self, id: impl Into<String>) -> Self {
        self.product_id = Some(id.into());
        self
    }

    pub fn with_category(mut self, id: impl Into<String>) -> Self {
        self.category_id = Some(id.into());
        self
    }

    pub fn with_customer(mut self, id: impl Into<String>) -> Self {
        self.customer_id = Some(id.into());
        self
    }

    pub fn with_store(mut self, id: impl Into<String>) -> Self {
        self.store_id = Some(id.into());
        self
    }

    pub fn with_supplier(mut self, id: impl Into<String>) -> Self {
        self.supplier_id = Some(id.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_customer_type(mut self, customer_type: impl Into<String>) -> Self {
        self.customer_type = Some(customer_type.into());
        self
    }

    pub fn with_product_category(mut self, category: impl Into<String>) -> Self {
        self.product_category = Some(category.into());
        self
    }

    pub fn with_store_location(mut self, location: impl Into<String>) -> Self {
        self.store_location = Some(location.into());
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_total_amount(mut self, total: Money) -> Self {
        self.total_amount = Some(total);
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
