use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::Rational64;
use num_traits::{CheckedMul, One, ToPrimitive, Zero, checked_pow};
use serde::{Deserialize, Serialize};

use crate::config::resolve_components;
use crate::error::{Error, Result};
use crate::fraction::{cents_to_value, to_f64, value_to_cents};
use crate::primes::{
    PRIMES, factor_big_integer, prime_cents, prime_limit, to_monzo_and_residual,
};
use crate::vector::PrimeVector;

mod approximation;
mod arithmetic;

pub use arithmetic::Operand;

const CENTS_PER_OCTAVE: i64 = 1200;

/// Fractional monzo with multiplicative residue and arbitrary cents offset measured in
/// time-related units (usually Hz).
///
/// Represents the value of musical objects like 432 Hz, 5/3, 7\12 (N-of-EDO) or arbitrary
/// intervals measured in cents. The same quantity can be split differently between the
/// vector, the residual and the cents offset; operations keep as much as they can in the
/// vector, then in the residual and only fall back to cents when nothing exact is left.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TimeMonzoParts")]
pub struct TimeMonzo {
    time_exponent: Rational64,
    prime_exponents: PrimeVector,
    residual: Rational64,
    cents: f64,
}

/// Serialized form, validated on the way in.
#[derive(Deserialize)]
struct TimeMonzoParts {
    time_exponent: Rational64,
    prime_exponents: PrimeVector,
    residual: Rational64,
    cents: f64,
}

impl TryFrom<TimeMonzoParts> for TimeMonzo {
    type Error = Error;

    fn try_from(parts: TimeMonzoParts) -> Result<Self> {
        Self::new(
            parts.time_exponent,
            parts.prime_exponents,
            parts.residual,
            parts.cents,
        )
    }
}

/// Pitch-space fraction of a frequency-space equave, e.g. 7\12 = (7/12, 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EqualTemperament {
    pub fraction_of_equave: Rational64,
    pub equave: Rational64,
}

impl TimeMonzo {
    /// Construct a time monzo from its parts.
    ///
    /// `time_exponent` is the exponent of seconds, `residual` the multiplicative residue
    /// that is too complex to fit in the vector part and `cents` an additive offset in
    /// pitch-space. The vector part can't be longer than the prime table.
    pub fn new(
        time_exponent: Rational64,
        prime_exponents: impl Into<PrimeVector>,
        residual: Rational64,
        cents: f64,
    ) -> Result<Self> {
        if !cents.is_finite() {
            return Err(Error::NonFiniteCents(cents));
        }
        let prime_exponents = prime_exponents.into();
        if prime_exponents.len() > PRIMES.len() {
            return Err(Error::TooManyComponents {
                requested: prime_exponents.len(),
                available: PRIMES.len(),
            });
        }
        Ok(Self::from_parts(
            time_exponent,
            prime_exponents,
            residual,
            cents,
        ))
    }

    /// Unchecked constructor for parts already known to be valid.
    fn from_parts(
        time_exponent: Rational64,
        prime_exponents: PrimeVector,
        residual: Rational64,
        cents: f64,
    ) -> Self {
        Self {
            time_exponent,
            prime_exponents,
            residual,
            cents,
        }
    }

    /// Dimensionless value made of the vector part alone.
    pub fn from_prime_vector(prime_exponents: impl Into<PrimeVector>) -> Result<Self> {
        Self::new(Rational64::zero(), prime_exponents, Rational64::one(), 0.0)
    }

    /// Just intonation interval from a rational number. Factors that don't fit the
    /// first `number_of_components` primes end up in the residual.
    pub fn from_fraction(
        fraction: Rational64,
        number_of_components: Option<usize>,
    ) -> Result<Self> {
        let n = resolve_components(number_of_components)?;
        let (vector, residual) = to_monzo_and_residual(fraction, n);
        Ok(Self::from_parts(
            Rational64::zero(),
            PrimeVector::from_integers(&vector),
            residual,
            0.0,
        ))
    }

    pub fn from_integer(value: i64, number_of_components: Option<usize>) -> Result<Self> {
        Self::from_fraction(Rational64::from_integer(value), number_of_components)
    }

    pub fn from_ratio(
        numerator: i64,
        denominator: i64,
        number_of_components: Option<usize>,
    ) -> Result<Self> {
        if denominator == 0 {
            return Err(Error::DivisionByZero);
        }
        Self::from_fraction(
            Rational64::new(numerator, denominator),
            number_of_components,
        )
    }

    /// Interval measured in cents. 1200 cents make an octave.
    pub fn from_cents(cents: f64, number_of_components: Option<usize>) -> Result<Self> {
        let n = resolve_components(number_of_components)?;
        Self::new(Rational64::zero(), PrimeVector::zeros(n), Rational64::one(), cents)
    }

    /// Pitch-space fraction of a frequency-space equave, the octave by default.
    /// The equave has to factor completely within the vector part.
    pub fn from_equal_temperament(
        fraction_of_equave: Rational64,
        equave: Option<Rational64>,
        number_of_components: Option<usize>,
    ) -> Result<Self> {
        let equave = equave.unwrap_or_else(|| Rational64::from_integer(2));
        let limit = prime_limit(equave);
        let n = match number_of_components {
            Some(n) => resolve_components(Some(n))?,
            None => resolve_components(None)?.max(limit.unwrap_or(0)),
        };
        match limit {
            Some(required) if required <= n => {}
            _ => {
                return Err(Error::InsufficientComponents {
                    equave,
                    required: limit.unwrap_or(PRIMES.len() + 1),
                    available: n,
                });
            }
        }
        let (equave_vector, residual) = to_monzo_and_residual(equave, n);
        if !residual.is_one() {
            return Err(Error::NonUnitResidual {
                target: "an equave monzo",
            });
        }
        let prime_exponents = PrimeVector::from_integers(&equave_vector)
            .checked_scale(fraction_of_equave)
            .ok_or(Error::Overflow {
                operation: "equal temperament",
            })?;
        Self::from_prime_vector(prime_exponents)
    }

    /// Arbitrary real ratio stored as a cents offset. The sign goes to the residual.
    pub fn from_value(value: f64, number_of_components: Option<usize>) -> Result<Self> {
        let n = resolve_components(number_of_components)?;
        if !value.is_finite() {
            return Err(Error::NonFiniteCents(value));
        }
        let (residual, cents) = if value == 0.0 {
            (Rational64::zero(), 0.0)
        } else {
            (
                Rational64::from_integer(value.signum() as i64),
                value_to_cents(value.abs()),
            )
        };
        Self::new(Rational64::zero(), PrimeVector::zeros(n), residual, cents)
    }

    /// Rational frequency in Hz.
    pub fn from_fractional_frequency(
        frequency: Rational64,
        number_of_components: Option<usize>,
    ) -> Result<Self> {
        let frequency = Self::from_fraction(frequency, number_of_components)?;
        Ok(frequency.with_time_exponent(-Rational64::one()))
    }

    /// Real frequency in Hz.
    pub fn from_arbitrary_frequency(
        frequency: f64,
        number_of_components: Option<usize>,
    ) -> Result<Self> {
        let frequency = Self::from_value(frequency, number_of_components)?;
        Ok(frequency.with_time_exponent(-Rational64::one()))
    }

    pub fn from_big_integer(
        value: &BigInt,
        number_of_components: Option<usize>,
    ) -> Result<Self> {
        let n = resolve_components(number_of_components)?;
        let (vector, residual) = factor_big_integer(value, n);
        let residual = residual.to_i64().ok_or(Error::ResidualOverflow)?;
        Ok(Self::from_parts(
            Rational64::zero(),
            PrimeVector::from_integers(&vector),
            Rational64::from_integer(residual),
            0.0,
        ))
    }

    pub fn from_big_ratio(
        numerator: &BigInt,
        denominator: &BigInt,
        number_of_components: Option<usize>,
    ) -> Result<Self> {
        if denominator.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let n = resolve_components(number_of_components)?;
        let (positive, numerator_residual) = factor_big_integer(numerator, n);
        let (negative, denominator_residual) = factor_big_integer(denominator, n);
        let common_factor = numerator_residual.gcd(&denominator_residual);
        let residual_numerator = (numerator_residual / &common_factor)
            .to_i64()
            .ok_or(Error::ResidualOverflow)?;
        let residual_denominator = (denominator_residual / &common_factor)
            .to_i64()
            .ok_or(Error::ResidualOverflow)?;
        let prime_exponents = PrimeVector::from_integers(&positive)
            .checked_sub(&PrimeVector::from_integers(&negative))
            .ok_or(Error::Overflow {
                operation: "factor a big ratio",
            })?;
        Ok(Self::from_parts(
            Rational64::zero(),
            prime_exponents,
            Rational64::new(residual_numerator, residual_denominator),
            0.0,
        ))
    }

    fn with_time_exponent(mut self, time_exponent: Rational64) -> Self {
        self.time_exponent = time_exponent;
        self
    }

    pub fn time_exponent(&self) -> Rational64 {
        self.time_exponent
    }

    pub fn prime_exponents(&self) -> &PrimeVector {
        &self.prime_exponents
    }

    pub fn residual(&self) -> Rational64 {
        self.residual
    }

    pub fn cents(&self) -> f64 {
        self.cents
    }

    /// Number of components in the vector part.
    pub fn number_of_components(&self) -> usize {
        self.prime_exponents.len()
    }

    /// Linear-space ratio, in units of time if the time exponent is non-zero.
    pub fn to_fraction(&self) -> Result<Rational64> {
        const TARGET: &str = "fraction";
        if self.cents != 0.0 {
            return Err(Error::Irrational { target: TARGET });
        }
        let mut result = self.residual;
        for (component, &prime) in self.prime_exponents.iter().zip(PRIMES.iter()) {
            if !component.is_integer() {
                return Err(Error::Irrational { target: TARGET });
            }
            let power = component.to_integer();
            let magnitude = usize::try_from(power.unsigned_abs())
                .map_err(|_| Error::Overflow {
                    operation: "to_fraction",
                })?;
            let factor = checked_pow(prime, magnitude).ok_or(Error::Overflow {
                operation: "to_fraction",
            })?;
            let factor = if power < 0 {
                Rational64::new(1, factor)
            } else {
                Rational64::from_integer(factor)
            };
            result = result.checked_mul(&factor).ok_or(Error::Overflow {
                operation: "to_fraction",
            })?;
        }
        Ok(result)
    }

    /// Linear-space integer, in units of time if the time exponent is non-zero.
    pub fn to_big_integer(&self) -> Result<BigInt> {
        const TARGET: &str = "integer";
        if self.cents != 0.0 {
            return Err(Error::Irrational { target: TARGET });
        }
        if !self.residual.is_integer() {
            return Err(Error::Fractional { target: TARGET });
        }
        let mut result = BigInt::from(self.residual.to_integer());
        for (component, &prime) in self.prime_exponents.iter().zip(PRIMES.iter()) {
            if !component.is_integer() {
                return Err(Error::Irrational { target: TARGET });
            }
            let power = usize::try_from(component.to_integer())
                .map_err(|_| Error::NegativeExponent { target: TARGET })?;
            result *= num_traits::pow(BigInt::from(prime), power);
        }
        Ok(result)
    }

    /// Size in cents. Only defined for dimensionless values.
    pub fn to_cents(&self) -> Result<f64> {
        if !self.is_scalar() {
            return Err(Error::NonScalar {
                operation: "convert to cents",
            });
        }
        Ok(self.total_cents())
    }

    /// Express as a pitch-space fraction of the simplest frequency-space equave
    /// the value is a whole multiple of. The equave is kept at or above unison.
    pub fn to_equal_temperament(&self) -> Result<EqualTemperament> {
        const TARGET: &str = "equal temperament";
        if !self.is_scalar() {
            return Err(Error::NonScalar {
                operation: "convert to equal temperament",
            });
        }
        if self.cents != 0.0 {
            return Err(Error::Irrational { target: TARGET });
        }
        if !self.residual.is_one() {
            return Err(Error::NonUnitResidual { target: TARGET });
        }
        let overflow = || Error::Overflow {
            operation: "convert to equal temperament",
        };
        let denominator = self
            .prime_exponents
            .iter()
            .try_fold(1i64, |acc, component| {
                (acc / acc.gcd(component.denom())).checked_mul(*component.denom())
            })
            .ok_or_else(overflow)?;
        let scale = Rational64::from_integer(denominator);
        let numerator = self
            .prime_exponents
            .iter()
            .try_fold(0i64, |acc, component| {
                Some(acc.gcd(&component.checked_mul(&scale)?.to_integer()))
            })
            .ok_or_else(overflow)?;
        if numerator == 0 {
            return Ok(EqualTemperament {
                fraction_of_equave: Rational64::zero(),
                equave: Rational64::one(),
            });
        }
        let fraction_of_equave = Rational64::new(numerator, denominator);
        let equave = self
            .pow(Operand::Rational(fraction_of_equave.recip()))?
            .to_fraction()?;
        if equave < Rational64::one() {
            return Ok(EqualTemperament {
                fraction_of_equave: -fraction_of_equave,
                equave: equave.recip(),
            });
        }
        Ok(EqualTemperament {
            fraction_of_equave,
            equave,
        })
    }

    /// Plain integer prime exponents.
    pub fn to_integer_monzo(&self) -> Result<Vec<i64>> {
        const TARGET: &str = "integer monzo";
        if !self.residual.is_one() {
            return Err(Error::NonUnitResidual { target: TARGET });
        }
        if self.cents != 0.0 {
            return Err(Error::Irrational { target: TARGET });
        }
        self.prime_exponents
            .iter()
            .map(|component| {
                if component.is_integer() {
                    Ok(component.to_integer())
                } else {
                    Err(Error::Fractional { target: TARGET })
                }
            })
            .collect()
    }

    /// Lacks units of time/frequency.
    pub fn is_scalar(&self) -> bool {
        self.time_exponent.is_zero()
    }

    /// Exact whole number: no offset, integral residual, non-negative integral exponents.
    pub fn is_integral(&self) -> bool {
        self.cents == 0.0
            && self.residual.is_integer()
            && self
                .prime_exponents
                .iter()
                .all(|component| component.is_integer() && *component >= Rational64::zero())
    }

    /// Exact and writable as a finite decimal without inverting 3 or primes past 5.
    pub fn is_decimal(&self) -> bool {
        if self.cents != 0.0 {
            return false;
        }
        let mut d = *self.residual.denom();
        while d % 2 == 0 {
            d /= 2;
        }
        while d % 5 == 0 {
            d /= 5;
        }
        if d != 1 || !self.prime_exponents.is_integral() {
            return false;
        }
        self.prime_exponents
            .iter()
            .enumerate()
            .filter(|&(i, _)| i == 1 || i >= 3)
            .all(|(_, component)| *component >= Rational64::zero())
    }

    /// Interpretable as a ratio in frequency-space.
    pub fn is_fractional(&self) -> bool {
        self.cents == 0.0 && self.prime_exponents.is_integral()
    }

    /// Interpretable as a pitch-space fraction of a frequency-space fraction.
    pub fn is_equal_temperament(&self) -> bool {
        self.is_scalar() && self.cents == 0.0 && self.residual.is_one()
    }

    /// Pure cents offset without a vector part or residual.
    pub fn is_cents(&self) -> bool {
        self.is_scalar() && self.prime_exponents.is_zero() && self.residual.is_one()
    }

    /// Not simply fractional, equal temperament or pure cents.
    pub fn is_composite(&self) -> bool {
        !(self.is_fractional() || self.is_equal_temperament() || self.is_cents())
    }

    /// Power of two in frequency-space.
    pub fn is_power_of_two(&self) -> bool {
        if self.cents != 0.0 {
            return false;
        }
        if self.prime_exponents.is_empty() {
            return self.residual.numer().unsigned_abs().is_power_of_two()
                && self.residual.denom().unsigned_abs().is_power_of_two();
        }
        self.residual.is_one() && self.prime_exponents[1..].iter().all(Zero::is_zero)
    }

    /// Size in cents ignoring time units. Negative values measure as their magnitude.
    pub fn total_cents(&self) -> f64 {
        let residual = to_f64(&self.residual).abs();
        let mut total = self.cents + value_to_cents(residual);
        for (i, component) in self.prime_exponents.iter().enumerate() {
            total += if i == 0 {
                // keeps N\EDO sizes exact
                component
                    .checked_mul(&Rational64::from_integer(CENTS_PER_OCTAVE))
                    .map_or_else(|| to_f64(component) * prime_cents(0), |c| to_f64(&c))
            } else {
                to_f64(component) * prime_cents(i)
            };
        }
        total
    }

    /// Frequency-space multiplier.
    pub fn value_of(&self) -> f64 {
        if self.residual.is_zero() {
            return 0.0;
        }
        let magnitude = cents_to_value(self.total_cents());
        if self.residual < Rational64::zero() {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Same time exponent, prime exponents, residual and cents offset.
    pub fn strict_equals(&self, other: &TimeMonzo) -> bool {
        self.time_exponent == other.time_exponent
            && self.prime_exponents == other.prime_exponents
            && self.residual == other.residual
            && self.cents == other.cents
    }

    /// Same size regardless of representation.
    pub fn equals(&self, other: &TimeMonzo) -> bool {
        self.total_cents() == other.total_cents()
    }

    /// Negative if `other` is larger, positive if smaller and zero if equal in linear-space.
    pub fn compare(&self, other: &TimeMonzo) -> f64 {
        self.value_of() - other.value_of()
    }
}

impl PartialEq for TimeMonzo {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}
