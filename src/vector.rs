use itertools::{EitherOrBoth, Itertools};
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedMul, CheckedSub, Zero};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, Neg};

/// Rational exponents of successive primes, index 0 being the exponent of 2.
///
/// Vectors of different lengths combine as if the shorter one was padded with zeros,
/// so the longer operand's excess components come through unchanged (or negated when
/// they are subtracted). Nothing is ever truncated.
///
/// Arithmetic is checked: `None` means a component no longer fits in 64 bits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimeVector(Vec<Rational64>);

impl PrimeVector {
    pub fn zeros(length: usize) -> Self {
        Self(vec![Rational64::zero(); length])
    }

    pub fn from_integers(exponents: &[i64]) -> Self {
        exponents
            .iter()
            .map(|&exponent| Rational64::from_integer(exponent))
            .collect()
    }

    /// Component at `index`, zero past the end.
    pub fn component(&self, index: usize) -> Rational64 {
        self.0.get(index).copied().unwrap_or_else(Rational64::zero)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(Zero::is_zero)
    }

    /// Every component is a whole number.
    pub fn is_integral(&self) -> bool {
        self.0.iter().all(|component| component.is_integer())
    }

    /// Sum of pairwise products over the indices both vectors have.
    pub fn dot(&self, other: &PrimeVector) -> Option<Rational64> {
        self.0
            .iter()
            .zip(other.0.iter())
            .try_fold(Rational64::zero(), |sum, (a, b)| {
                sum.checked_add(&a.checked_mul(b)?)
            })
    }

    pub fn checked_add(&self, other: &PrimeVector) -> Option<PrimeVector> {
        self.combine(other, |a, b| a.checked_add(&b), Some)
    }

    pub fn checked_sub(&self, other: &PrimeVector) -> Option<PrimeVector> {
        self.combine(other, |a, b| a.checked_sub(&b), |b| Some(-b))
    }

    /// Every component multiplied by `scalar`.
    pub fn checked_scale(&self, scalar: Rational64) -> Option<PrimeVector> {
        self.0
            .iter()
            .map(|component| component.checked_mul(&scalar))
            .collect()
    }

    fn combine(
        &self,
        other: &PrimeVector,
        both: impl Fn(Rational64, Rational64) -> Option<Rational64>,
        right_only: impl Fn(Rational64) -> Option<Rational64>,
    ) -> Option<PrimeVector> {
        self.0
            .iter()
            .zip_longest(other.0.iter())
            .map(|pair| match pair {
                EitherOrBoth::Both(&a, &b) => both(a, b),
                EitherOrBoth::Left(&a) => Some(a),
                EitherOrBoth::Right(&b) => right_only(b),
            })
            .collect()
    }

    pub fn into_inner(self) -> Vec<Rational64> {
        self.0
    }
}

impl Deref for PrimeVector {
    type Target = [Rational64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Rational64>> for PrimeVector {
    fn from(components: Vec<Rational64>) -> Self {
        Self(components)
    }
}

impl FromIterator<Rational64> for PrimeVector {
    fn from_iter<I: IntoIterator<Item = Rational64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl PartialEq for PrimeVector {
    /// Pointwise equality, the shorter vector padded with zeros.
    fn eq(&self, other: &Self) -> bool {
        self.0
            .iter()
            .zip_longest(other.0.iter())
            .all(|pair| match pair {
                EitherOrBoth::Both(a, b) => a == b,
                EitherOrBoth::Left(c) | EitherOrBoth::Right(c) => c.is_zero(),
            })
    }
}

impl Eq for PrimeVector {}

impl Neg for &PrimeVector {
    type Output = PrimeVector;

    fn neg(self) -> PrimeVector {
        self.0.iter().map(|&component| -component).collect()
    }
}
