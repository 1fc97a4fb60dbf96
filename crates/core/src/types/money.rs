//! USD money amounts backed by decimal arithmetic.
//!
//! All quoting and invoicing happens in USD; crypto payout amounts are a
//! derived view (see [`crate::quote`]). Amounts serialize as strings to
//! avoid floating-point drift on the wire.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A USD amount in dollars (not cents).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, Hash,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a money amount from a decimal dollar value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a money amount from a whole number of dollars.
    #[must_use]
    pub fn from_dollars(dollars: i64) -> Self {
        Self(Decimal::from(dollars))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Round to the nearest whole dollar, halves away from zero.
    ///
    /// Quotes are presented in whole dollars.
    #[must_use]
    pub fn round_dollars(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Clamp negative amounts up to zero.
    #[must_use]
    pub fn clamp_non_negative(&self) -> Self {
        if self.0.is_sign_negative() {
            Self::ZERO
        } else {
            *self
        }
    }

    /// True if the amount is strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_dollars_midpoint_away_from_zero() {
        let m = Money::new(Decimal::new(60050, 2)); // 600.50
        assert_eq!(m.round_dollars(), Money::from_dollars(601));

        let m = Money::new(Decimal::new(60024, 2)); // 600.24
        assert_eq!(m.round_dollars(), Money::from_dollars(600));
    }

    #[test]
    fn test_clamp_non_negative() {
        let m = Money::from_dollars(100) - Money::from_dollars(250);
        assert!(m.is_negative());
        assert_eq!(m.clamp_non_negative(), Money::ZERO);

        let m = Money::from_dollars(50);
        assert_eq!(m.clamp_non_negative(), m);
    }

    #[test]
    fn test_sum() {
        let total: Money = [10, 20, 30].map(Money::from_dollars).into_iter().sum();
        assert_eq!(total, Money::from_dollars(60));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_dollars(450).to_string(), "$450.00");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Money::from_dollars(600)).expect("serialize");
        assert_eq!(json, "\"600\"");
        let back: Money = serde_json::from_str("\"450\"").expect("deserialize");
        assert_eq!(back, Money::from_dollars(450));
    }
}
