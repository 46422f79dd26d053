//! # Quantity Module
//!
//! Fixed-point quantities for stock, cart lines and receipts.
//!
//! ## Why Fixed-Point?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE INCREMENT-STEP PROBLEM                                             │
//! │                                                                         │
//! │  With f64:                                                              │
//! │    (0.3 - 0.1) % 0.1 = 0.09999999999999998   ❌ "not on the step"      │
//! │                                                                         │
//! │  With hundredths (i64):                                                 │
//! │    (30 - 10) % 10 = 0                         ✅ exact                  │
//! │                                                                         │
//! │  Every quantity is stored as hundredths of the item's unit:            │
//! │    12 pieces  → 1200                                                    │
//! │    2.5 kg     → 250                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Number of stored units per whole unit (two decimal places).
pub const QUANTITY_SCALE: i64 = 100;

/// Largest magnitude accepted from a float before scaling would overflow.
const MAX_FLOAT_MAGNITUDE: f64 = 9.0e15;

/// A quantity measured in hundredths of an item's unit.
///
/// Discrete items only ever hold whole quantities (multiples of
/// [`QUANTITY_SCALE`]); loose items may hold any hundredth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from hundredths of a unit.
    ///
    /// ## Example
    /// ```rust
    /// use stockwise_core::Quantity;
    ///
    /// let qty = Quantity::from_hundredths(250); // 2.5
    /// assert!(!qty.is_whole());
    /// ```
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Quantity(hundredths)
    }

    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * QUANTITY_SCALE)
    }

    /// Converts a float, rounding to the nearest hundredth.
    ///
    /// Returns `None` for NaN, infinities and values too large to scale.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * QUANTITY_SCALE as f64).round();
        if scaled.abs() > MAX_FLOAT_MAGNITUDE {
            return None;
        }
        Some(Quantity(scaled as i64))
    }

    /// Returns the raw value in hundredths.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit part (truncated toward zero).
    #[inline]
    pub const fn whole_units(&self) -> i64 {
        self.0 / QUANTITY_SCALE
    }

    /// Returns the quantity as a float, for display only.
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / QUANTITY_SCALE as f64
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// True when the quantity has no fractional part.
    #[inline]
    pub const fn is_whole(&self) -> bool {
        self.0 % QUANTITY_SCALE == 0
    }

    /// Checked addition, `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Quantity(v)),
            None => None,
        }
    }

    /// Checked subtraction, `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Quantity(v)),
            None => None,
        }
    }

    /// Negated quantity (used for debit deltas).
    #[inline]
    pub const fn negate(self) -> Self {
        Quantity(-self.0)
    }
}

/// Whole quantities print without decimals ("4"), others with two ("4.25").
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = QUANTITY_SCALE as u64;
        if abs % scale == 0 {
            write!(f, "{}{}", sign, abs / scale)
        } else {
            write!(f, "{}{}.{:02}", sign, abs / scale, abs % scale)
        }
    }
}

/// Parses a decimal string such as `"12"`, `"2.5"` or `"0.125"`.
///
/// Digits beyond the second decimal place round half away from zero on the
/// third digit.
impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("must be a number"));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid("must be a number"));
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid("is too large"))?
        };

        let mut frac_digits = frac_part.bytes().map(|b| i64::from(b - b'0'));
        let mut frac = 0i64;
        for _ in 0..2 {
            frac = frac * 10 + frac_digits.next().unwrap_or(0);
        }
        if frac_digits.next().is_some_and(|d| d >= 5) {
            frac += 1;
        }

        let hundredths = whole
            .checked_mul(QUANTITY_SCALE)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(|| invalid("is too large"))?;

        Ok(Quantity(if negative { -hundredths } else { hundredths }))
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl std::iter::Sum for Quantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), |acc, q| acc + q)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
