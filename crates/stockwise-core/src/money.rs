//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A GRN total is Σ(received_quantity × unit_price). Summing floats      │
//! │  across lines drifts; summing integer cents does not.                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    100 units × 50.00  = 5000.00  → 500000 cents                         │
//! │    2.5 kg    × 3.99   = 9.975    → 998 cents (rounded once, per line)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockwise_core::{Money, Quantity};
//!
//! let unit_price = Money::from_cents(5000);              // 50.00
//! let line = unit_price.times(Quantity::from_units(100)); // 5000.00
//! assert_eq!(line.cents(), 500_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::quantity::{Quantity, QUANTITY_SCALE};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Item.cost_price / Item.selling_price
///        │
///        ├──► OrderItem.unit_price (frozen at checkout)
///        │
///        └──► GrnLine.unit_price ──► GrnLine.line_total ──► Grn.total_amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use stockwise_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use stockwise_core::money::Money;
    ///
    /// let price = Money::from_major_minor(200, 0); // 200.00
    /// assert_eq!(price.cents(), 20000);
    ///
    /// let negative = Money::from_major_minor(-5, 50); // -5.50
    /// assert_eq!(negative.cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
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

    /// Multiplies a unit price by a fixed-point quantity.
    ///
    /// ## Implementation
    /// `cents × hundredths / 100`, computed in i128 and rounded half away
    /// from zero to whole cents. Rounding happens once per line, never on
    /// the sum.
    ///
    /// Returns `None` when the result does not fit in i64 cents.
    ///
    /// ## Example
    /// ```rust
    /// use stockwise_core::{Money, Quantity};
    ///
    /// let per_kg = Money::from_cents(399);           // 3.99 / kg
    /// let qty: Quantity = "2.5".parse().unwrap();    // 2.5 kg
    /// assert_eq!(per_kg.checked_times(qty), Some(Money::from_cents(998)));
    ///
    /// let huge = Money::from_cents(i64::MAX);
    /// assert_eq!(huge.checked_times(Quantity::from_units(2)), None);
    /// ```
    pub fn checked_times(&self, quantity: Quantity) -> Option<Money> {
        let scale = QUANTITY_SCALE as i128;
        let product = self.0 as i128 * quantity.hundredths() as i128;
        let half = scale / 2;
        let rounded = if product >= 0 {
            (product + half) / scale
        } else {
            (product - half) / scale
        };
        i64::try_from(rounded).ok().map(Money::from_cents)
    }

    /// Like [`Money::checked_times`], clamped to the i64 range.
    ///
    /// For display figures only. Anything persisted goes through
    /// `checked_times`.
    pub fn times(&self, quantity: Quantity) -> Money {
        self.checked_times(quantity).unwrap_or_else(|| {
            if self.is_negative() != quantity.is_negative() {
                Money::from_cents(i64::MIN)
            } else {
                Money::from_cents(i64::MAX)
            }
        })
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `major.minor`. Currency symbols are a rendering concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
