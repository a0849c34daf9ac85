use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::Rational64;
use num_traits::Zero;

/// The primes backing the components of a monzo, in canonical order.
pub const PRIMES: [i64; 64] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293,
    307, 311,
];

const CENTS_PER_OCTAVE: f64 = 1200.0;

/// Size of the `index`-th prime in cents.
pub fn prime_cents(index: usize) -> f64 {
    if index == 0 {
        return CENTS_PER_OCTAVE;
    }
    CENTS_PER_OCTAVE * (PRIMES[index] as f64).log2()
}

/// Split an integer into exponents of the first `count` primes and whatever is left.
/// The sign stays with the leftover. Zero has an all-zero vector and a zero leftover.
pub fn factor_integer(mut n: i64, count: usize) -> (Vec<i64>, i64) {
    let mut vector = vec![0; count];
    if n == 0 {
        return (vector, 0);
    }
    for (exponent, &prime) in vector.iter_mut().zip(PRIMES.iter()) {
        while n % prime == 0 {
            n /= prime;
            *exponent += 1;
        }
    }
    (vector, n)
}

/// Big integer counterpart of [`factor_integer`].
pub fn factor_big_integer(n: &BigInt, count: usize) -> (Vec<i64>, BigInt) {
    let mut vector = vec![0; count];
    if n.is_zero() {
        return (vector, BigInt::zero());
    }
    let mut n = n.clone();
    for (exponent, &prime) in vector.iter_mut().zip(PRIMES.iter()) {
        let prime = BigInt::from(prime);
        loop {
            let (quotient, remainder) = n.div_rem(&prime);
            if !remainder.is_zero() {
                break;
            }
            n = quotient;
            *exponent += 1;
        }
    }
    (vector, n)
}

/// Factor a rational number over the first `count` primes.
/// Returns the exponent vector and the rational residual that didn't fit.
pub fn to_monzo_and_residual(value: Rational64, count: usize) -> (Vec<i64>, Rational64) {
    let (numerator_vector, numerator_residual) = factor_integer(*value.numer(), count);
    let (denominator_vector, denominator_residual) = factor_integer(*value.denom(), count);
    let vector = numerator_vector
        .into_iter()
        .zip(denominator_vector)
        .map(|(n, d)| n - d)
        .collect();
    // numerator and denominator were coprime so the residuals are too
    (
        vector,
        Rational64::new_raw(numerator_residual, denominator_residual),
    )
}

/// Number of leading components needed to factor `value` completely.
/// `None` if it has a prime factor beyond the table.
pub fn prime_limit(value: Rational64) -> Option<usize> {
    if value.numer().is_zero() {
        return None;
    }
    let (vector, residual) = to_monzo_and_residual(value, PRIMES.len());
    if residual.numer().abs() != 1 || *residual.denom() != 1 {
        return None;
    }
    Some(
        vector
            .iter()
            .rposition(|&exponent| exponent != 0)
            .map_or(0, |index| index + 1),
    )
}
