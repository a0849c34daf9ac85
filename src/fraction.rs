//! Rational helpers on top of `num-rational`: exact powers, continued fractions,
//! conversions from floats and the size of ratios in cents.

use num_integer::Roots;
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, One, Zero, checked_pow};

const CENTS_PER_OCTAVE: f64 = 1200.0;

/// Float conversions stop refining once the convergent is this close (relative).
const FLOAT_TOLERANCE: f64 = 1e-15;

/// Continued fraction expansions never exceed this many terms.
const MAX_CONTINUED_TERMS: usize = 64;

pub fn to_f64(value: &Rational64) -> f64 {
    *value.numer() as f64 / *value.denom() as f64
}

/// Size of a frequency ratio in cents.
pub fn value_to_cents(value: f64) -> f64 {
    CENTS_PER_OCTAVE * value.log2()
}

/// Frequency ratio of an interval measured in cents.
pub fn cents_to_value(cents: f64) -> f64 {
    (cents / CENTS_PER_OCTAVE).exp2()
}

/// Mathematical modulo of reals, the result has the sign of `divisor`.
pub fn mmod_f64(value: f64, divisor: f64) -> f64 {
    ((value % divisor) + divisor) % divisor
}

/// Mathematical modulo of rationals, the result has the sign of `divisor`.
/// `None` on a zero divisor or overflow.
pub fn mmod(value: Rational64, divisor: Rational64) -> Option<Rational64> {
    let quotient = value.checked_div(&divisor)?.floor();
    value.checked_sub(&divisor.checked_mul(&quotient)?)
}

fn nth_root_exact(n: i64, root: u32) -> Option<i64> {
    if root == 1 {
        return Some(n);
    }
    if n < 0 {
        if root % 2 == 0 {
            return None;
        }
        return nth_root_exact(n.checked_neg()?, root).map(|r| -r);
    }
    let candidate = n.nth_root(root);
    (checked_pow(candidate, root as usize)? == n).then_some(candidate)
}

/// `base` raised to a rational power, if the result is rational and fits.
pub fn pow_exact(base: Rational64, exponent: Rational64) -> Option<Rational64> {
    let root = u32::try_from(*exponent.denom()).ok()?;
    let power = *exponent.numer();
    if base.is_zero() {
        return match power.signum() {
            1 => Some(Rational64::zero()),
            0 => Some(Rational64::one()),
            _ => None,
        };
    }
    let base = if power < 0 { base.recip() } else { base };
    let magnitude = usize::try_from(power.unsigned_abs()).ok()?;
    let numerator = checked_pow(nth_root_exact(*base.numer(), root)?, magnitude)?;
    let denominator = checked_pow(nth_root_exact(*base.denom(), root)?, magnitude)?;
    Some(Rational64::new(numerator, denominator))
}

/// Continued fraction coefficients of a rational number. The first one is the whole part.
pub fn continued_fraction(value: Rational64) -> Vec<i64> {
    let mut result = vec![];
    let mut value = value;
    loop {
        let whole = value.floor();
        result.push(whole.to_integer());
        let remainder = value - whole;
        if remainder.is_zero() || result.len() >= MAX_CONTINUED_TERMS {
            return result;
        }
        value = remainder.recip();
    }
}

/// Rebuild a rational number from continued fraction coefficients.
/// `None` for an empty sequence, a zero in a non-leading position or overflow.
pub fn from_continued(coefficients: &[i64]) -> Option<Rational64> {
    let (&last, init) = coefficients.split_last()?;
    let mut result = Rational64::from_integer(last);
    for &coefficient in init.iter().rev() {
        if result.is_zero() {
            return None;
        }
        result = result
            .recip()
            .checked_add(&Rational64::from_integer(coefficient))?;
    }
    Some(result)
}

/// Best rational reading of a float: the first convergent that reproduces it
/// to within float precision, or the last one that fits in 64 bits.
pub fn approximate_real(value: f64) -> Option<Rational64> {
    let whole = value.floor();
    if !value.is_finite() || whole.abs() >= i64::MAX as f64 {
        return None;
    }
    let (mut h_prev, mut h) = (1i64, whole as i64);
    let (mut k_prev, mut k) = (0i64, 1i64);
    let mut remainder = value - whole;
    let tolerance = FLOAT_TOLERANCE * value.abs().max(1.0);
    for _ in 0..MAX_CONTINUED_TERMS {
        if remainder == 0.0 || (h as f64 / k as f64 - value).abs() <= tolerance {
            break;
        }
        let inverse = remainder.recip();
        let coefficient = inverse.floor();
        remainder = inverse - coefficient;
        if coefficient >= i64::MAX as f64 {
            break;
        }
        let coefficient = coefficient as i64;
        let next = coefficient
            .checked_mul(h)
            .and_then(|x| x.checked_add(h_prev))
            .zip(
                coefficient
                    .checked_mul(k)
                    .and_then(|x| x.checked_add(k_prev)),
            );
        let Some((h_next, k_next)) = next else {
            break;
        };
        (h_prev, h) = (h, h_next);
        (k_prev, k) = (k, k_next);
    }
    Some(Rational64::new(h, k))
}

/// Simplest convergent of `value` within `epsilon`.
pub fn simplify(value: f64, epsilon: f64) -> Option<Rational64> {
    let magnitude = approximate_real(value.abs())?;
    let sign = Rational64::from_integer(if value < 0.0 { -1 } else { 1 });
    let coefficients = continued_fraction(magnitude);
    for i in 1..coefficients.len() {
        let candidate = from_continued(&coefficients[..i])?;
        if (to_f64(&candidate) - value.abs()).abs() < epsilon {
            return Some(candidate * sign);
        }
    }
    Some(magnitude * sign)
}

/// Exact decimal text of a rational whose denominator only has factors 2 and 5.
pub fn decimal_string(value: &Rational64) -> Option<String> {
    let mut denominator = *value.denom();
    let (mut twos, mut fives) = (0u32, 0u32);
    while denominator % 2 == 0 {
        denominator /= 2;
        twos += 1;
    }
    while denominator % 5 == 0 {
        denominator /= 5;
        fives += 1;
    }
    if denominator != 1 {
        return None;
    }
    let digits = twos.max(fives);
    let scaled = (*value.numer() as i128).checked_mul(10i128.checked_pow(digits)?)?
        / *value.denom() as i128;
    if digits == 0 {
        return Some(scaled.to_string());
    }
    let sign = if scaled < 0 { "-" } else { "" };
    let padded = format!(
        "{:0>width$}",
        scaled.unsigned_abs(),
        width = digits as usize + 1
    );
    let (whole, fractional) = padded.split_at(padded.len() - digits as usize);
    Some(format!("{sign}{whole}.{fractional}"))
}
