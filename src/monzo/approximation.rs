use num_traits::ToPrimitive;

use super::TimeMonzo;
use crate::error::{Error, Result};
use crate::fraction::{approximate_real, continued_fraction, from_continued, simplify};

const DEFAULT_SIMPLE_EPSILON: f64 = 0.001;

impl TimeMonzo {
    /// Continued fraction expansion of the linear-space value.
    /// Exact for fractional values that fit in 64 bits.
    pub fn to_continued(&self) -> Result<Vec<i64>> {
        if self.is_fractional() {
            if let Ok(fraction) = self.to_fraction() {
                return Ok(continued_fraction(fraction));
            }
        }
        let value = approximate_real(self.value_of()).ok_or(Error::Overflow {
            operation: "continued fraction",
        })?;
        Ok(continued_fraction(value))
    }

    /// Convergent of the continued fraction expansion truncated after `depth` terms
    /// past the whole part.
    pub fn get_convergent(&self, depth: usize) -> Result<TimeMonzo> {
        let coefficients = self.to_continued()?;
        let end = coefficients.len().min(depth.saturating_add(1));
        let convergent = from_continued(&coefficients[..end]).ok_or(Error::Overflow {
            operation: "convergent",
        })?;
        TimeMonzo::from_fraction(convergent, Some(self.number_of_components()))
    }

    /// Simplest rational within `epsilon` of the linear-space value, 0.001 by default.
    pub fn approximate_simple(&self, epsilon: Option<f64>) -> Result<TimeMonzo> {
        let epsilon = epsilon.unwrap_or(DEFAULT_SIMPLE_EPSILON);
        let simple = simplify(self.value_of(), epsilon).ok_or(Error::Overflow {
            operation: "approximate",
        })?;
        TimeMonzo::from_fraction(simple, Some(self.number_of_components()))
    }

    /// Closest ratio with the given denominator.
    pub fn approximate_harmonic(&self, denominator: i64) -> Result<TimeMonzo> {
        let numerator = (self.value_of() * denominator as f64)
            .round()
            .to_i64()
            .ok_or(Error::Overflow {
                operation: "approximate by harmonic",
            })?;
        TimeMonzo::from_ratio(numerator, denominator, Some(self.number_of_components()))
    }

    /// Closest ratio with the given numerator.
    pub fn approximate_subharmonic(&self, numerator: i64) -> Result<TimeMonzo> {
        let denominator = (numerator as f64 / self.value_of())
            .round()
            .to_i64()
            .ok_or(Error::Overflow {
                operation: "approximate by subharmonic",
            })?;
        TimeMonzo::from_ratio(numerator, denominator, Some(self.number_of_components()))
    }
}
