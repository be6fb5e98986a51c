//! # Tax Rule Evaluator
//!
//! Decides, for each configured tax, whether it applies to a transaction and
//! what it costs.
//!
//! ## Evaluation Flow (per active tax)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  applies := true                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RULES (AND, short-circuit)                                             │
//! │  region == "US" ✓ ──► total_amount >= 1000 ✗ ──► stop, applies = false  │
//! │       │                                                                 │
//! │       ▼ (only while applies)                                            │
//! │  ASSIGNMENTS (OR, skipped when empty)                                   │
//! │  product = iphone15 ✗ │ category = phones ✓ ──► applies stays true      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AMOUNT (always computed, whether or not the tax applies)               │
//! │  percentage: base × rate / 100        fixed: rate                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TaxCalculationResult { taxName, taxType, rate, amount, applied }       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fail Closed
//! Nothing in here returns an error. An unknown operator, an operator used
//! with the wrong value type, a missing context fact or a non-numeric value
//! in a numeric comparison all make the rule false, so the tax is left off
//! rather than charged by mistake.
//!
//! Taxes are evaluated independently of each other; the functions are pure
//! and may be called from any number of threads.

use serde::{Deserialize, Serialize};
use tracing::trace;
use ts_rs::TS;

use crate::context::{coerce_number, ContextValue, TaxCalculationContext};
use crate::money::Money;
use crate::types::{RuleOperator, RuleValue, Tax, TaxAssignment, TaxRule, TaxType};

// =============================================================================
// Result Types
// =============================================================================

/// Outcome of evaluating one tax against one context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculationResult {
    pub tax_id: String,
    pub tax_name: String,
    pub tax_type: TaxType,
    pub rate: f64,
    /// Computed with the same formula whether or not the tax applied.
    pub amount: Money,
    /// Whether `amount` counts towards the total.
    pub applied: bool,
}

/// Evaluation results plus the totals a receipt or invoice shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxSummary {
    pub base_price: Money,
    /// Sum of `amount` over applied results.
    pub total_tax: Money,
    /// `base_price + total_tax`.
    pub final_price: Money,
    pub results: Vec<TaxCalculationResult>,
}

impl TaxSummary {
    /// Results that count towards the total.
    pub fn applied(&self) -> impl Iterator<Item = &TaxCalculationResult> {
        self.results.iter().filter(|r| r.applied)
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Evaluates every active tax against `context`.
///
/// Returns one result per active tax, in input order. Inactive taxes are
/// left out of the output entirely.
pub fn evaluate(taxes: &[Tax], context: &TaxCalculationContext) -> Vec<TaxCalculationResult> {
    taxes
        .iter()
        .filter(|tax| tax.is_active())
        .map(|tax| evaluate_tax(tax, context))
        .collect()
}

/// Aggregates results into totals. Sums saturate rather than overflow.
pub fn summarize(context: &TaxCalculationContext, results: Vec<TaxCalculationResult>) -> TaxSummary {
    let total_tax: Money = results.iter().filter(|r| r.applied).map(|r| r.amount).sum();

    TaxSummary {
        base_price: context.base_price,
        total_tax,
        final_price: context.base_price + total_tax,
        results,
    }
}

/// Evaluates and aggregates in one step.
pub fn calculate(taxes: &[Tax], context: &TaxCalculationContext) -> TaxSummary {
    summarize(context, evaluate(taxes, context))
}

/// Evaluates a single tax, regardless of its status.
///
/// [`evaluate`] is the entry point that honours `status`; this one is for
/// previewing a tax on the edit form before it is switched on.
pub fn evaluate_tax(tax: &Tax, context: &TaxCalculationContext) -> TaxCalculationResult {
    let applied = rules_match(tax, context) && scope_matches(tax, context);

    TaxCalculationResult {
        tax_id: tax.id.clone(),
        tax_name: tax.name.clone(),
        tax_type: tax.tax_type,
        rate: tax.rate,
        amount: tax.amount_for(context.base_price),
        applied,
    }
}

// =============================================================================
// Rules
// =============================================================================

/// All rules hold. Stops at the first rule that does not.
fn rules_match(tax: &Tax, context: &TaxCalculationContext) -> bool {
    match tax.rules.iter().position(|rule| !rule_matches(rule, context)) {
        Some(index) => {
            trace!(tax = %tax.name, rule = index, "Rule did not match, tax not applied");
            false
        }
        None => true,
    }
}

/// Evaluates one rule against the context.
pub fn rule_matches(rule: &TaxRule, context: &TaxCalculationContext) -> bool {
    if !rule.operator.accepts(rule.value_type) {
        return false;
    }

    let Some(actual) = context.field_value(rule.condition_field) else {
        return false;
    };

    compare(&rule.operator, actual, &rule.value)
}

fn compare(operator: &RuleOperator, actual: ContextValue<'_>, expected: &RuleValue) -> bool {
    match operator {
        RuleOperator::Eq => strict_eq(actual, expected).unwrap_or(false),
        RuleOperator::Ne => !strict_eq(actual, expected).unwrap_or(false),
        RuleOperator::Ge => actual.as_number() >= rule_number(expected),
        RuleOperator::Le => actual.as_number() <= rule_number(expected),
        RuleOperator::Gt => actual.as_number() > rule_number(expected),
        RuleOperator::Lt => actual.as_number() < rule_number(expected),
        RuleOperator::In => list_contains(expected, actual).unwrap_or(false),
        RuleOperator::NotIn => list_contains(expected, actual)
            .map(|found| !found)
            .unwrap_or(false),
        RuleOperator::Unrecognized(_) => false,
    }
}

/// Same-kind equality. `None` when the kinds differ (text against number,
/// anything against a list): `==` is then false and `!=` true.
fn strict_eq(actual: ContextValue<'_>, expected: &RuleValue) -> Option<bool> {
    match (actual, expected) {
        (ContextValue::Text(a), RuleValue::Str(e)) => Some(a == e),
        (ContextValue::Number(a), RuleValue::Num(e)) => Some(a == *e),
        _ => None,
    }
}

/// The rule value coerced to a number. Lists are never numbers.
fn rule_number(value: &RuleValue) -> f64 {
    match value {
        RuleValue::Num(n) => *n,
        RuleValue::Str(s) => coerce_number(s),
        RuleValue::List(_) => f64::NAN,
    }
}

/// Membership of the context value's string form. `None` when the rule
/// value is not a list.
fn list_contains(expected: &RuleValue, actual: ContextValue<'_>) -> Option<bool> {
    match expected {
        RuleValue::List(items) => {
            let needle = actual.to_text();
            Some(items.iter().any(|item| *item == needle))
        }
        _ => None,
    }
}

// =============================================================================
// Scope
// =============================================================================

/// Unrestricted when there are no assignments, otherwise any one must match.
fn scope_matches(tax: &Tax, context: &TaxCalculationContext) -> bool {
    if tax.assignments.is_empty() {
        return true;
    }

    let matched = tax
        .assignments
        .iter()
        .any(|assignment| assignment_matches(assignment, context));

    if !matched {
        trace!(tax = %tax.name, "No assignment matched, tax not applied");
    }
    matched
}

/// An assignment matches when the context carries the same id for its target.
pub fn assignment_matches(assignment: &TaxAssignment, context: &TaxCalculationContext) -> bool {
    context.target_id(assignment.target_type) == Some(assignment.target_id.as_str())
}

// =============================================================================
// Unit Tests
// =============================================================================
