//! # Money
//!
//! Tax amounts are whole cents in an `i64`. On the wire they are plain
//! currency numbers (`1200`, `85.5`), the same unit rates and rule values
//! are written in.
//!
//! ```text
//!  base 1200 @ 7.125%    ──► 85.50      (base × rate / 100, rounded once)
//!  fixed 50              ──► 50.00
//!                            ─────
//!  total_tax               135.50      (integer sum, no drift)
//! ```
//!
//! Multiplication by a rate goes through `rust_decimal`, so `7.125` is used
//! exactly as typed and only the final result is rounded to the cent.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;
use ts_rs::TS;

/// An amount held in minor units (cents), exchanged in major units.
///
/// ```text
/// TaxCalculationContext.base_price ──► percentage tax amount ──┐
///                                                              ├──► total_tax
/// Tax.rate (fixed) ─────────────────► fixed tax amount ────────┘        │
///                                                                       ▼
///                                          base_price + total_tax = final_price
/// ```
///
/// Arithmetic saturates at the `i64` bounds instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a major-unit amount, rounding half away from zero to the
    /// nearest cent. Saturates when the amount does not fit; NaN is zero.
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(50.0).cents(), 5000);
    /// assert_eq!(Money::from_major(2.005).cents(), 201);
    /// ```
    pub fn from_major(amount: f64) -> Self {
        Money::try_from_major(amount).unwrap_or_else(|| saturating_cents(amount * 100.0))
    }

    /// Like [`Money::from_major`], but `None` for non-finite amounts and
    /// amounts outside the representable range.
    pub fn try_from_major(amount: f64) -> Option<Self> {
        let scaled = exact_decimal(amount)?.checked_mul(Decimal::ONE_HUNDRED)?;
        round_to_cents(scaled)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// The value in major units.
    ///
    /// This is how money-valued facts are exposed to tax rules, which are
    /// written in currency units (`total_amount >= 1000`).
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(120_000).as_major(), 1200.0);
    /// ```
    #[inline]
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// The minor unit portion, always 0-99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `self × pct / 100`, rounded half away from zero once, at the end.
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_cents(120_000); // 1200.00
    /// assert_eq!(price.percent(7.5).cents(), 9_000);
    /// assert_eq!(price.percent(7.125).cents(), 8_550);
    /// ```
    pub fn percent(&self, pct: f64) -> Money {
        let exact = exact_decimal(pct)
            .and_then(|rate| Decimal::from(self.0).checked_mul(rate))
            .and_then(|scaled| round_to_cents(scaled / Decimal::ONE_HUNDRED));

        exact.unwrap_or_else(|| saturating_cents(self.0 as f64 * pct / 100.0))
    }
}

/// The decimal a float was written as: `7.125` stays `7.125`, not the
/// nearest binary fraction. `None` for NaN, infinities and values outside
/// the decimal range.
fn exact_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    // f64's Display is the shortest text that reads back as the same float.
    Decimal::from_str(&value.to_string()).ok()
}

fn round_to_cents(value: Decimal) -> Option<Money> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .map(Money)
}

fn saturating_cents(cents: f64) -> Money {
    if cents.is_nan() {
        return Money::zero();
    }
    // float-to-int `as` saturates at the i64 bounds
    Money(cents.round() as i64)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// For logs and the CLI. The web front end formats currency itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

/// Whole amounts serialize as integers (`90`), others as decimals (`85.5`).
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_major())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MajorUnitsVisitor)
    }
}

struct MajorUnitsVisitor;

impl Visitor<'_> for MajorUnitsVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an amount in currency units")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom(format!("amount {} is out of range", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Money)
            .ok_or_else(|| E::custom(format!("amount {} is out of range", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::try_from_major(v).ok_or_else(|| E::custom(format!("amount {} is out of range", v)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
