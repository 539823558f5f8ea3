//! Fixed-point amounts scaled by 10^7.
//!
//! Every amount crossing the contract boundary is an integer count of
//! 10^-7 units: a human value of `1.2345678` travels as `12345678`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits carried on-chain.
pub const AMOUNT_DECIMALS: u32 = 7;

/// `10^AMOUNT_DECIMALS`.
pub const AMOUNT_SCALE: i128 = 10_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("invalid amount '{0}'")]
    Invalid(String),

    #[error("amount '{0}' has more than 7 decimal places")]
    TooPrecise(String),

    #[error("amount '{0}' is out of range")]
    OutOfRange(String),
}

/// An amount in on-chain units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(i128);

impl Amount {
    /// Wrap an already-scaled integer.
    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    /// The scaled integer.
    pub const fn raw(self) -> i128 {
        self.0
    }

    /// Scale a human decimal. Rejects values that would lose precision.
    pub fn from_decimal(value: Decimal) -> Result<Self, AmountError> {
        let normalized = value.normalize();
        if normalized.scale() > AMOUNT_DECIMALS {
            return Err(AmountError::TooPrecise(value.to_string()));
        }
        let scaled = normalized
            .checked_mul(Decimal::from(AMOUNT_SCALE as i64))
            .ok_or_else(|| AmountError::OutOfRange(value.to_string()))?;
        scaled
            .to_i128()
            .map(Self)
            .ok_or_else(|| AmountError::OutOfRange(value.to_string()))
    }

    /// Parse a human string such as `"123.4567890"`.
    pub fn from_human(s: &str) -> Result<Self, AmountError> {
        let value = Decimal::from_str(s.trim()).map_err(|_| AmountError::Invalid(s.to_string()))?;
        Self::from_decimal(value)
    }

    /// Human decimal with trailing zeros removed.
    pub fn to_decimal(self) -> Result<Decimal, AmountError> {
        Decimal::try_from_i128_with_scale(self.0, AMOUNT_DECIMALS)
            .map(|d| d.normalize())
            .map_err(|_| AmountError::OutOfRange(self.0.to_string()))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_human(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Ok(d) => write!(f, "{}", d),
            Err(_) => write!(f, "{}e-7", self.0),
        }
    }
}
