//! # stockroom-core: Pure Tax Logic for Stockroom
//!
//! This crate is the **heart** of the Stockroom tax module. It decides which
//! configured taxes apply to a transaction and how much each one costs, as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Front end (tax forms, sales, invoices)             │   │
//! │  │    builds a TaxCalculationContext, renders the results          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ stockroom-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  context  │  │ evaluator │  │ validation│  │   │
//! │  │   │   Tax     │  │ basePrice │  │  rules    │  │  name     │  │   │
//! │  │   │   Rule    │  │ region... │  │  scope    │  │  rate     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-db (Tax Store)                        │   │
//! │  │           SQLite queries, migrations, TaxRepository             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Tax definitions, assignments and rules
//! - [`context`] - The transaction facts a tax is evaluated against
//! - [`evaluator`] - Decides which taxes apply and computes amounts
//! - [`money`] - Integer-cent amounts, exchanged in currency units
//! - [`query`] - Filter/sort/paginate parameters for listing taxes
//! - [`validation`] - Input-time checks for tax definitions
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::evaluator::calculate;
//! use stockroom_core::{
//!     ConditionField, Money, RuleOperator, RuleValue, Tax, TaxCalculationContext, TaxRule,
//!     TaxType,
//! };
//!
//! let sales_tax = Tax::new("US Sales Tax", 7.5, TaxType::Percentage).with_rule(TaxRule::new(
//!     ConditionField::Region,
//!     RuleOperator::Eq,
//!     RuleValue::Str("US".to_string()),
//! ));
//!
//! let context = TaxCalculationContext::new(Money::from_cents(120_000)).with_region("US");
//! let summary = calculate(&[sales_tax], &context);
//!
//! assert_eq!(summary.total_tax.cents(), 9_000);
//! assert_eq!(summary.final_price.cents(), 129_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod context;
pub mod error;
pub mod evaluator;
pub mod money;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use context::{ContextValue, TaxCalculationContext};
pub use error::{CoreError, ValidationError};
pub use evaluator::{TaxCalculationResult, TaxSummary};
pub use money::Money;
pub use query::{Page, SortDirection, TaxQuery, TaxSortField};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a tax name, in characters.
pub const MAX_TAX_NAME_LEN: usize = 100;

/// Maximum length of a tax description, in characters.
pub const MAX_TAX_DESCRIPTION_LEN: usize = 500;

/// Highest percentage rate accepted at input time.
pub const MAX_PERCENTAGE_RATE: f64 = 100.0;

/// Largest currency amount accepted at input time, for fixed rates, base
/// prices and totals. Sums of a few thousand such amounts still fit in cents.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;
