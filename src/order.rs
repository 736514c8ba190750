//! Entrenchment degree: an exact scalar in `[0, 1]`.
//!
//! `f64` would let `expand`'s `b.order <= new.order < d` comparisons flip on
//! rounding noise, so entrenchment is stored as a fixed-point integer instead
//! (scale 10⁻⁶) — exact equality, exact ordering, no epsilon anywhere.

use crate::error::CoreError;
use std::fmt;

const SCALE: i64 = 1_000_000;

/// An entrenchment degree in `[0, 1]`, stored as a fixed-point fraction with
/// six decimal digits of precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Order(i64);

impl Order {
    /// The minimum entrenchment, `0`.
    pub const ZERO: Order = Order(0);
    /// The maximum entrenchment, `1` — always held by tautological beliefs.
    pub const ONE: Order = Order(SCALE);

    /// Builds an `Order` from a floating-point value in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OutOfRange`] if `value` is outside `[0, 1]` or
    /// not finite.
    pub fn new(value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(CoreError::OutOfRange {
                order: value.to_string(),
            });
        }
        Ok(Order((value * SCALE as f64).round() as i64))
    }

    /// Renders this order back as a floating-point value in `[0, 1]`.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// `true` if this is the maximum entrenchment.
    pub fn is_one(self) -> bool {
        self == Order::ONE
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.as_f64())
    }
}

impl TryFrom<f64> for Order {
    type Error = CoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Order::new(value)
    }
}
