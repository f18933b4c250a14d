//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ← wrong                         │
//! │                                                                     │
//! │  OUR SOLUTION: integer paise                                        │
//! │    ₹10.00 = 1000 paise; 1000 / 3 = 333 (×3 = 999)                   │
//! │    We KNOW we lost 1 paisa, and handle it explicitly                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The database, calculations, and API all use paise. Only the UI converts
//! to rupees for display.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (the smallest currency unit).
///
/// Signed so that refunds and change calculations stay representable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount using round-half-to-even.
    ///
    /// Half-even keeps totals unbiased over many lines, which matters when
    /// receipts are reconciled against daily reports.
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let numerator = self.0 as i128 * rate.bps() as i128;
        let mut quotient = numerator / 10_000;
        let remainder = numerator % 10_000;

        let twice = remainder.abs() * 2;
        if twice > 10_000 || (twice == 10_000 && quotient % 2 != 0) {
            quotient += if numerator >= 0 { 1 } else { -1 };
        }

        Money(quotient as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        Money(self.0 * rhs)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        Money(iter.map(|m| m.0).sum())
    }
}

impl fmt::Display for Money {
    /// Formats as rupees: `₹10.99`, `-₹5.50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}₹{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
