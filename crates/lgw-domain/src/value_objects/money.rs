//! Fixed-point USD amounts
//!
//! Budgets and unit costs are configured in dollars but compared in
//! micro-dollars so that cumulative spend never drifts past a cap through
//! float rounding.

use crate::constants::MICROS_PER_USD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Add;

/// A non-negative USD amount stored as micro-dollars
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Usd(u64);

impl Usd {
    /// Zero dollars
    pub const ZERO: Usd = Usd(0);

    /// Create an amount from micro-dollars
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Create an amount from a dollar value
    ///
    /// Non-finite and negative values collapse to zero.
    pub fn from_dollars(dollars: f64) -> Self {
        if !dollars.is_finite() || dollars <= 0.0 {
            return Self::ZERO;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let micros = (dollars * MICROS_PER_USD as f64).round() as u64;
        Self(micros)
    }

    /// Amount in micro-dollars
    pub const fn micros(self) -> u64 {
        self.0
    }

    /// Amount in dollars
    #[allow(clippy::cast_precision_loss)]
    pub fn as_dollars(self) -> f64 {
        self.0 as f64 / MICROS_PER_USD as f64
    }

    /// Whether the amount is zero
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add, returning `None` on overflow
    pub fn checked_add(self, other: Usd) -> Option<Usd> {
        self.0.checked_add(other.0).map(Usd)
    }

    /// Subtract, clamping at zero
    pub fn saturating_sub(self, other: Usd) -> Usd {
        Usd(self.0.saturating_sub(other.0))
    }
}

impl Add for Usd {
    type Output = Usd;

    fn add(self, rhs: Usd) -> Usd {
        Usd(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.6}", self.as_dollars())
    }
}

impl Serialize for Usd {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_dollars())
    }
}

impl<'de> Deserialize<'de> for Usd {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let dollars = f64::deserialize(deserializer)?;
        if dollars < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "USD amount cannot be negative: {dollars}"
            )));
        }
        Ok(Usd::from_dollars(dollars))
    }
}
