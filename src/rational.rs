//! Exact fractions as stored in EXIF `RATIONAL` / `SRATIONAL` fields.
//!
//! A [`Rational`] keeps the numerator/denominator pair exactly as it was
//! decoded, so a renderer can write it back unchanged. Reduction and the
//! decimal renderings are computed on demand and never mutate the value.
//!
//! A zero denominator is representable (cameras do write `0/0` for "unknown")
//! but every numeric operation on it fails with
//! [`RationalError::DivisionByZero`] instead of quietly producing `0`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RationalError {
    #[error("division by zero in rational {0}")]
    DivisionByZero(Rational),
}

/// An exact `numerator / denominator` pair.
///
/// Equality is structural: `1/2` and `2/4` are different values here because
/// the decoded pair must survive a round trip. Compare [`Rational::reduce`]
/// results to test numeric equivalence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    pub numerator: i64,
    pub denominator: i64,
}

impl Rational {
    pub const fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    fn check(self) -> Result<Self, RationalError> {
        if self.denominator == 0 {
            Err(RationalError::DivisionByZero(self))
        } else {
            Ok(self)
        }
    }

    /// Lowest terms with a positive denominator. `0/n` reduces to `0/1`.
    pub fn reduce(self) -> Result<Rational, RationalError> {
        self.check()?;
        let divisor = gcd(self.numerator.unsigned_abs(), self.denominator.unsigned_abs()) as i64;
        let sign = if self.denominator < 0 { -1 } else { 1 };
        Ok(Rational::new(
            sign * self.numerator / divisor,
            sign * self.denominator / divisor,
        ))
    }

    pub fn to_f64(self) -> Result<f64, RationalError> {
        self.check()?;
        Ok(self.numerator as f64 / self.denominator as f64)
    }

    /// Shortest decimal that parses back to the same `f64`, without a
    /// trailing `.0`: `28/10` → `"2.8"`, `8/1` → `"8"`.
    pub fn to_decimal_string(self) -> Result<String, RationalError> {
        let value = self.to_f64()?;
        if self.numerator == 0 {
            return Ok("0".to_string());
        }
        // f64's Display is already shortest-round-trip and omits ".0".
        Ok(format!("{value}"))
    }

    /// Exposure time in photographic notation.
    ///
    /// One second or longer renders as a plain decimal count of seconds
    /// (`2/1` → `"2"`, `5/2` → `"2.5"`). Shorter times render as `1/x`, with
    /// `x = denominator / numerator` rounded to one decimal place and a
    /// trailing `.0` dropped (`1/200` → `"1/200"`, `3/10` → `"1/3.3"`).
    pub fn to_exposure_string(self) -> Result<String, RationalError> {
        let value = self.to_f64()?;
        if self.numerator == 0 {
            return Ok("0".to_string());
        }
        if value >= 1.0 {
            return self.to_decimal_string();
        }
        let reciprocal = self.denominator as f64 / self.numerator as f64;
        Ok(format!("1/{}", strip_trailing_zero(format!("{reciprocal:.1}"))))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

fn strip_trailing_zero(s: String) -> String {
    match s.strip_suffix(".0") {
        Some(stripped) => stripped.to_string(),
        None => s,
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}
