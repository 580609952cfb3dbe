//! Monetary amounts.

use core::ops::{Add, Sub};
use serde::{Deserialize, Serialize};

/// An amount of Indian Rupees held in paise (1/100 rupee).
///
/// Integer storage keeps subtotal/tax/total arithmetic exact; presentation
/// (grouping, currency symbol) lives with the mail composer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_paise(paise: i64) -> Self {
        Self(paise)
    }

    pub const fn from_rupees(rupees: i64) -> Self {
        Self(rupees * 100)
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute whole-rupee part.
    pub const fn whole_rupees(self) -> u64 {
        self.0.unsigned_abs() / 100
    }

    /// Absolute paise remainder (`0..=99`).
    pub const fn paise_part(self) -> u8 {
        (self.0.unsigned_abs() % 100) as u8
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}
