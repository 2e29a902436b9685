use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Sub},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------        Fare         ---------------------------------------------------------
/// A ride fare in the smallest currency unit. Fares are always whole numbers.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Fare(i64);

op!(binary Fare, Add, add);
op!(binary Fare, Sub, sub);
op!(inplace Fare, AddAssign, add_assign);

impl Mul<i64> for Fare {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Fare {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a fare: {0}")]
pub struct FareConversionError(String);

impl From<i64> for Fare {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Fare {
    type Error = FareConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        i64::try_from(value).map(Self).map_err(|_| FareConversionError(format!("{value} is too large for a fare")))
    }
}

impl Display for Fare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "¥{}", self.0)
    }
}

impl Fare {
    pub fn value(&self) -> i64 {
        self.0
    }
}
