use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// Minor units per major currency unit (cents per dollar).
pub const MINOR_PER_MAJOR: i64 = 100;

/// A monetary amount in integer minor units.
///
/// All engine arithmetic happens in minor units so that totals, installment
/// schedules and split allocations stay exact; fractional results are rounded
/// half-up at the point they are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    pub fn minor(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiply by a rate and round half-up to the nearest minor unit.
    pub fn apply_rate(self, rate: f64) -> Money {
        Money((self.0 as f64 * rate).round() as i64)
    }

    /// Round half-up to the nearest whole major unit.
    pub fn round_to_major(self) -> Money {
        let rem = self.0.rem_euclid(MINOR_PER_MAJOR);
        let floor = self.0 - rem;
        if rem * 2 >= MINOR_PER_MAJOR {
            Money(floor + MINOR_PER_MAJOR)
        } else {
            Money(floor)
        }
    }

    /// Divide by `n`, rounding half-up.
    pub fn div_round(self, n: i64) -> Money {
        debug_assert!(n > 0);
        Money((self.0 + n / 2) / n)
    }

    /// Divide into `n` shares that sum exactly to `self`.
    ///
    /// The integer remainder lands on the first share.
    pub fn split_even(self, n: usize) -> Vec<Money> {
        debug_assert!(n > 0);
        let per = self.0 / n as i64;
        let rem = self.0 - per * n as i64;
        let mut shares = vec![Money(per); n];
        shares[0] = Money(per + rem);
        shares
    }

    pub fn abs(self) -> Money {
        Money(self.0.abs())
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(
            f,
            "{}${}.{:02}",
            sign,
            abs / MINOR_PER_MAJOR,
            abs % MINOR_PER_MAJOR
        )
    }
}
