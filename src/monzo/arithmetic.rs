use std::ops::Mul;

use log::debug;
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, One, Signed, ToPrimitive, Zero};

use super::TimeMonzo;
use crate::error::{Error, Result};
use crate::fraction::{
    approximate_real, mmod, mmod_f64, pow_exact, simplify, to_f64, value_to_cents,
};

/// Rational exponents with a denominator this large are treated as real numbers.
const MAX_POW_DENOMINATOR: i64 = 10000;

/// Tolerance for cents products in dot products.
const DOT_CENTS_EPSILON: f64 = 1e-8;

/// Exponent or logarithm base accepted by [`TimeMonzo::pow`] and [`TimeMonzo::log`].
#[derive(Debug, Clone)]
pub enum Operand {
    Rational(Rational64),
    Real(f64),
    Monzo(TimeMonzo),
}

impl From<Rational64> for Operand {
    fn from(value: Rational64) -> Self {
        Self::Rational(value)
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Self::Rational(Rational64::from_integer(value))
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<TimeMonzo> for Operand {
    fn from(value: TimeMonzo) -> Self {
        Self::Monzo(value)
    }
}

impl From<&TimeMonzo> for Operand {
    fn from(value: &TimeMonzo) -> Self {
        Self::Monzo(value.clone())
    }
}

/// Move a residual product that doesn't fit in 64 bits into the cents offset.
/// Only the sign stays in the residual.
fn fold_into_cents(left: Rational64, right: Rational64, divide: bool) -> (Rational64, f64) {
    let sign = left.signum() * right.signum();
    let left_cents = value_to_cents(to_f64(&left.abs()));
    let right_cents = value_to_cents(to_f64(&right.abs()));
    if divide {
        (sign, left_cents - right_cents)
    } else {
        (sign, left_cents + right_cents)
    }
}

impl TimeMonzo {
    fn check_dimensions(&self, other: &TimeMonzo, operation: &'static str) -> Result<()> {
        if self.time_exponent != other.time_exponent {
            return Err(Error::DimensionMismatch {
                operation,
                left: self.time_exponent,
                right: other.time_exponent,
            });
        }
        Ok(())
    }

    /// Linear-space operation that stays exact while both operands are fractional and
    /// the result fits, otherwise goes through real values.
    fn combine_linear(
        &self,
        other: &TimeMonzo,
        operation: &'static str,
        exact: impl Fn(Rational64, Rational64) -> Option<Rational64>,
        real: impl Fn(f64, f64) -> f64,
    ) -> Result<TimeMonzo> {
        self.check_dimensions(other, operation)?;
        let n = self
            .number_of_components()
            .max(other.number_of_components());
        if self.is_fractional() && other.is_fractional() {
            let result = self
                .to_fraction()
                .ok()
                .zip(other.to_fraction().ok())
                .and_then(|(a, b)| exact(a, b));
            if let Some(result) = result {
                let monzo = TimeMonzo::from_fraction(result, Some(n))?;
                return Ok(monzo.with_time_exponent(self.time_exponent));
            }
            debug!("Exact {operation} doesn't fit in 64 bits, falling back to real values");
        }
        Ok(
            TimeMonzo::from_value(real(self.value_of(), other.value_of()), Some(n))?
                .with_time_exponent(self.time_exponent),
        )
    }

    /// Linear-space addition. Both operands must have the same units.
    pub fn add(&self, other: &TimeMonzo) -> Result<TimeMonzo> {
        self.combine_linear(other, "add", |a, b| a.checked_add(&b), |a, b| a + b)
    }

    /// Linear-space subtraction. Both operands must have the same units.
    pub fn sub(&self, other: &TimeMonzo) -> Result<TimeMonzo> {
        self.combine_linear(other, "subtract", |a, b| a.checked_sub(&b), |a, b| a - b)
    }

    /// Linear-space modulo. The result has the sign of `other`.
    pub fn mmod(&self, other: &TimeMonzo) -> Result<TimeMonzo> {
        if other.residual.is_zero() {
            return Err(Error::DivisionByZero);
        }
        self.combine_linear(other, "reduce modulo", mmod, mmod_f64)
    }

    /// Linear-space negation.
    pub fn neg(&self) -> TimeMonzo {
        TimeMonzo::from_parts(
            self.time_exponent,
            self.prime_exponents.clone(),
            -self.residual,
            self.cents,
        )
    }

    /// Linear-space multiplication, i.e. pitch-space addition.
    ///
    /// A residual product too large for 64 bits moves to the cents offset. Exponents
    /// that no longer fit are reported as [`Error::Overflow`].
    pub fn mul(&self, other: &TimeMonzo) -> Result<TimeMonzo> {
        let overflow = || Error::Overflow {
            operation: "multiply",
        };
        let time_exponent = self
            .time_exponent
            .checked_add(&other.time_exponent)
            .ok_or_else(overflow)?;
        let prime_exponents = self
            .prime_exponents
            .checked_add(&other.prime_exponents)
            .ok_or_else(overflow)?;
        let cents = self.cents + other.cents;
        Ok(match self.residual.checked_mul(&other.residual) {
            Some(residual) => {
                TimeMonzo::from_parts(time_exponent, prime_exponents, residual, cents)
            }
            None => {
                debug!(
                    "Residual {} * {} doesn't fit in 64 bits, moving it to cents",
                    self.residual, other.residual
                );
                let (residual, offset) = fold_into_cents(self.residual, other.residual, false);
                TimeMonzo::from_parts(time_exponent, prime_exponents, residual, cents + offset)
            }
        })
    }

    /// Linear-space division, i.e. pitch-space subtraction.
    pub fn div(&self, other: &TimeMonzo) -> Result<TimeMonzo> {
        let overflow = || Error::Overflow {
            operation: "divide",
        };
        if other.residual.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let time_exponent = self
            .time_exponent
            .checked_sub(&other.time_exponent)
            .ok_or_else(overflow)?;
        let prime_exponents = self
            .prime_exponents
            .checked_sub(&other.prime_exponents)
            .ok_or_else(overflow)?;
        let cents = self.cents - other.cents;
        Ok(match self.residual.checked_div(&other.residual) {
            Some(residual) => {
                TimeMonzo::from_parts(time_exponent, prime_exponents, residual, cents)
            }
            None => {
                debug!(
                    "Residual {} / {} doesn't fit in 64 bits, moving it to cents",
                    self.residual, other.residual
                );
                let (residual, offset) = fold_into_cents(self.residual, other.residual, true);
                TimeMonzo::from_parts(time_exponent, prime_exponents, residual, cents + offset)
            }
        })
    }

    /// Linear-space reciprocal, i.e. pitch-space negation.
    pub fn inverse(&self) -> Result<TimeMonzo> {
        if self.residual.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(TimeMonzo::from_parts(
            -self.time_exponent,
            -&self.prime_exponents,
            self.residual.recip(),
            -self.cents,
        ))
    }

    /// Linear-space exponentiation, i.e. pitch-space scaling.
    ///
    /// Rational exponents with small denominators stay exact in the vector part. Others
    /// fall back to a cents offset, which is only possible for dimensionless values.
    /// The same goes for exact powers whose exponents outgrow 64 bits.
    pub fn pow(&self, exponent: impl Into<Operand>) -> Result<TimeMonzo> {
        let (rational, real) = match exponent.into() {
            Operand::Rational(exponent) => (Some(exponent), to_f64(&exponent)),
            Operand::Real(exponent) => (approximate_real(exponent), exponent),
            Operand::Monzo(exponent) => {
                if !exponent.is_scalar() {
                    return Err(Error::NonScalar {
                        operation: "raise to a power with units",
                    });
                }
                let real = exponent.value_of();
                let rational = exponent
                    .to_fraction()
                    .ok()
                    .or_else(|| approximate_real(real));
                (rational, real)
            }
        };
        match rational.filter(|exponent| *exponent.denom() < MAX_POW_DENOMINATOR) {
            Some(exponent) => match self.pow_rational(exponent) {
                Err(Error::Overflow { .. }) if self.is_scalar() => {
                    debug!("Exact power by {exponent} doesn't fit in 64 bits, using cents");
                    self.pow_real(real)
                }
                result => result,
            },
            None => self.pow_real(real),
        }
    }

    fn pow_rational(&self, exponent: Rational64) -> Result<TimeMonzo> {
        let overflow = || Error::Overflow {
            operation: "raise to a power",
        };
        let prime_exponents = self
            .prime_exponents
            .checked_scale(exponent)
            .ok_or_else(overflow)?;
        let time_exponent = self
            .time_exponent
            .checked_mul(&exponent)
            .ok_or_else(overflow)?;
        let mut cents = self.cents;
        let residual = match pow_exact(self.residual, exponent) {
            Some(residual) => residual,
            None => {
                debug!(
                    "Residual {} to the power of {exponent} is not rational, moving it to cents",
                    self.residual
                );
                cents += value_to_cents(to_f64(&self.residual));
                Rational64::one()
            }
        };
        TimeMonzo::new(time_exponent, prime_exponents, residual, cents * to_f64(&exponent))
    }

    fn pow_real(&self, exponent: f64) -> Result<TimeMonzo> {
        if !self.is_scalar() {
            return Err(Error::IrrationalTimePower);
        }
        let n = Some(self.number_of_components());
        if self.residual.is_positive() {
            TimeMonzo::from_cents(self.total_cents() * exponent, n)
        } else {
            TimeMonzo::from_value(self.value_of().powf(exponent), n)
        }
    }

    /// Exact rational logarithm.
    ///
    /// Every exponent (the time exponent included) has to be the same multiple of the
    /// base's and the residual has to match the base's residual raised to that multiple.
    /// Dimensionless values carrying a cents offset never have an exact solution.
    pub fn log_exact(&self, base: &TimeMonzo) -> Result<Rational64> {
        let n = self
            .number_of_components()
            .max(base.number_of_components());
        let pairs = std::iter::once((self.time_exponent, base.time_exponent)).chain(
            (0..n).map(|i| {
                (
                    self.prime_exponents.component(i),
                    base.prime_exponents.component(i),
                )
            }),
        );
        let mut solution = None;
        for (this, that) in pairs {
            match solution {
                Some(solution) => {
                    if that.checked_mul(&solution) != Some(this) {
                        return Err(Error::NoLogSolution);
                    }
                }
                None if !that.is_zero() => {
                    solution = Some(this.checked_div(&that).ok_or(Error::Overflow {
                        operation: "logarithm",
                    })?);
                }
                None if !this.is_zero() => return Err(Error::NoLogSolution),
                None => {}
            }
        }
        let solution = solution.ok_or(Error::NoLogSolution)?;
        if self.cents != 0.0 || base.cents != 0.0 {
            if self.is_scalar() && base.is_scalar() {
                return Err(Error::NoLogSolution);
            }
            let expected = base.cents * to_f64(&solution);
            if (self.cents - expected).abs() > 1e-9 * self.cents.abs().max(1.0) {
                return Err(Error::NoLogSolution);
            }
        }
        if pow_exact(base.residual, solution) != Some(self.residual) {
            return Err(Error::NoLogSolution);
        }
        Ok(solution)
    }

    /// Logarithm in the given base, i.e. pitch-space division.
    ///
    /// Exact when possible. Dimensionless values fall back to a real-valued result,
    /// values with units need a base with units and an exact solution.
    pub fn log(&self, base: impl Into<Operand>) -> Result<TimeMonzo> {
        let base = base.into();
        if !self.is_scalar() {
            return match base {
                Operand::Monzo(base) if !base.is_scalar() => {
                    TimeMonzo::from_fraction(self.log_exact(&base)?, None)
                }
                _ => Err(Error::ScalarLogOfTimeUnits),
            };
        }
        match base {
            Operand::Monzo(base) => match self.log_exact(&base) {
                Ok(solution) => TimeMonzo::from_fraction(solution, None),
                Err(e) => {
                    debug!("{e}, falling back to real logarithm");
                    self.log_real(base.value_of())
                }
            },
            Operand::Rational(base) => self.log_real(to_f64(&base)),
            Operand::Real(base) => self.log_real(base),
        }
    }

    fn log_real(&self, base: f64) -> Result<TimeMonzo> {
        TimeMonzo::from_value(self.value_of().ln() / base.ln(), None)
    }

    /// Inner product in pitch-space.
    ///
    /// Residuals that don't factor within the shorter operand's components prevent
    /// the product.
    pub fn dot(&self, other: &TimeMonzo) -> Result<Rational64> {
        if self.number_of_components() > other.number_of_components() {
            return other.dot(self);
        }
        if !other.residual.is_one() {
            return Err(Error::ResidualsPreventDot);
        }
        if !self.residual.is_one() {
            let factored =
                TimeMonzo::from_fraction(self.residual, Some(other.number_of_components()))?;
            if !factored.residual.is_one() {
                return Err(Error::ResidualsPreventDot);
            }
            let mut unit = self.clone();
            unit.residual = Rational64::one();
            return unit.mul(&factored)?.dot(other);
        }
        let overflow = Error::Overflow {
            operation: "dot product",
        };
        let cents = simplify(self.cents * other.cents, DOT_CENTS_EPSILON).ok_or(overflow.clone())?;
        let time = self
            .time_exponent
            .checked_mul(&other.time_exponent)
            .ok_or(overflow.clone())?;
        let primes = self
            .prime_exponents
            .dot(&other.prime_exponents)
            .ok_or(overflow.clone())?;
        cents
            .checked_add(&time)
            .and_then(|sum| sum.checked_add(&primes))
            .ok_or(overflow)
    }

    /// Inverse under the dot product: the result dotted with `self` gives one.
    pub fn geometric_inverse(&self) -> Result<TimeMonzo> {
        let magnitude = self.dot(self)?;
        if magnitude.is_zero() {
            return Err(Error::NoGeometricInverse);
        }
        self.pow(Operand::Rational(magnitude.recip()))
    }

    /// Scale the size in pitch-space. The excess goes to the cents offset.
    pub fn stretch(&self, factor: f64) -> Result<TimeMonzo> {
        if !self.is_scalar() {
            return Err(Error::NonScalar { operation: "stretch" });
        }
        let offset = self.total_cents() * (factor - 1.0);
        TimeMonzo::new(
            self.time_exponent,
            self.prime_exponents.clone(),
            self.residual,
            self.cents + offset,
        )
    }

    /// Linear-space absolute value.
    pub fn abs(&self) -> TimeMonzo {
        if self.residual.is_negative() {
            self.neg()
        } else {
            self.clone()
        }
    }

    /// Pitch-space absolute value: intervals below unison are inverted.
    pub fn pitch_abs(&self) -> Result<TimeMonzo> {
        if self.total_cents() < 0.0 {
            self.inverse()
        } else {
            Ok(self.clone())
        }
    }

    /// Pitch-space modulo, e.g. octave reduction.
    ///
    /// Dimensionless values too far from the divisor to reduce exactly are reduced in
    /// cents instead.
    pub fn reduce(&self, other: &TimeMonzo) -> Result<TimeMonzo> {
        let total = self.total_cents();
        let divisor = other.total_cents();
        if divisor == 0.0 {
            return Err(Error::ReductionByUnison);
        }
        let steps = (total / divisor).floor();
        if !steps.is_finite() {
            return Err(Error::NonFiniteCents(steps));
        }
        let exact = match steps.to_i64() {
            Some(steps) => other
                .pow_rational(Rational64::from_integer(steps))
                .and_then(|power| self.div(&power)),
            None => Err(Error::Overflow {
                operation: "reduce",
            }),
        };
        match exact {
            Err(Error::Overflow { .. }) if self.is_scalar() && other.is_scalar() => {
                debug!("Reducing {total} cents by {divisor} cents in floating point");
                TimeMonzo::from_cents(mmod_f64(total, divisor), Some(self.number_of_components()))
            }
            result => result,
        }
    }
}

impl Mul<&TimeMonzo> for &TimeMonzo {
    type Output = Result<TimeMonzo>;

    fn mul(self, rhs: &TimeMonzo) -> Result<TimeMonzo> {
        TimeMonzo::mul(self, rhs)
    }
}
