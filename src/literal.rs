//! Text and literal projections of time monzos.

use std::fmt::{Display, Formatter, Result as FmtResult};

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::Rational64;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fraction::decimal_string;
use crate::monzo::TimeMonzo;

/// Literal shapes a value can be re-expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IntervalLiteral {
    #[serde(rename = "IntegerLiteral")]
    Integer { value: BigInt },
    /// `numerator` steps of `denominator` equal divisions of the octave.
    #[serde(rename = "NedoLiteral")]
    Nedo { numerator: i64, denominator: i64 },
}

impl Display for IntervalLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Integer { value } => write!(f, "{value}"),
            Self::Nedo {
                numerator,
                denominator,
            } => write!(f, "{numerator}\\{denominator}"),
        }
    }
}

impl Display for TimeMonzo {
    /// Linear-space rendering: integers, ratios, decimal frequencies in Hz
    /// and real values as a last resort.
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_scalar() {
            if self.is_integral() {
                if let Ok(value) = self.to_big_integer() {
                    return write!(f, "{value}");
                }
            } else if self.is_fractional() {
                if let Ok(value) = self.to_fraction() {
                    return write!(f, "{value}");
                }
            }
        } else if self.is_decimal() && self.time_exponent() == -Rational64::from_integer(1) {
            if let Some(text) = self.to_fraction().ok().and_then(|v| decimal_string(&v)) {
                return write!(f, "{text} Hz");
            }
        }
        // decimal literals use a comma separator
        write!(f, "{}", self.value_of().to_string().replace('.', ","))
    }
}

impl TimeMonzo {
    /// Logarithmic rendering as steps of an equal division, e.g. `7\12` or `1\13<3>`.
    pub fn to_backslash_string(&self) -> Result<String> {
        let temperament = self.to_equal_temperament()?;
        let steps = temperament
            .fraction_of_equave
            .to_string()
            .replace('/', "\\");
        if temperament.equave != Rational64::from_integer(2) || !steps.contains('\\') {
            return Ok(format!("{steps}<{}>", temperament.equave));
        }
        Ok(steps)
    }

    /// Re-express the value in the shape of `literal`.
    ///
    /// Equal divisions keep the requested denominator when the value is a whole number
    /// of its steps and report the finer division otherwise. `None` when the value has
    /// no exact form of that shape.
    pub fn as_literal(&self, literal: &IntervalLiteral) -> Option<IntervalLiteral> {
        match literal {
            IntervalLiteral::Integer { .. } => self
                .to_big_integer()
                .ok()
                .map(|value| IntervalLiteral::Integer { value }),
            IntervalLiteral::Nedo { denominator, .. } => {
                if !self.is_equal_temperament() {
                    return None;
                }
                let temperament = self.to_equal_temperament().ok()?;
                let fraction = temperament.fraction_of_equave;
                if fraction.is_zero() && *denominator > 0 {
                    return Some(IntervalLiteral::Nedo {
                        numerator: 0,
                        denominator: *denominator,
                    });
                }
                if temperament.equave != Rational64::from_integer(2) {
                    return None;
                }
                let lcm = fraction.denom().lcm(denominator);
                if *denominator > 0 && lcm == *denominator {
                    return Some(IntervalLiteral::Nedo {
                        numerator: lcm / fraction.denom() * fraction.numer(),
                        denominator: *denominator,
                    });
                }
                Some(IntervalLiteral::Nedo {
                    numerator: *fraction.numer(),
                    denominator: *fraction.denom(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> Rational64 {
        Rational64::new(n, d)
    }

    fn nedo(numerator: i64, denominator: i64) -> IntervalLiteral {
        IntervalLiteral::Nedo {
            numerator,
            denominator,
        }
    }

    #[test]
    fn test_display_exact_values() {
        assert_eq!(TimeMonzo::from_integer(12, None).unwrap().to_string(), "12");
        assert_eq!(TimeMonzo::from_integer(-5, None).unwrap().to_string(), "-5");
        assert_eq!(
            TimeMonzo::from_fraction(r(81, 80), None).unwrap().to_string(),
            "81/80"
        );
        assert_eq!(
            TimeMonzo::from_fraction(r(7, 17), Some(2)).unwrap().to_string(),
            "7/17"
        );
    }

    #[test]
    fn test_display_frequencies() {
        let frequency = TimeMonzo::from_fractional_frequency(r(2093, 8), None).unwrap();
        assert_eq!(frequency.to_string(), "261.625 Hz");
        let frequency = TimeMonzo::from_fractional_frequency(r(440, 1), None).unwrap();
        assert_eq!(frequency.to_string(), "440 Hz");
    }

    #[test]
    fn test_display_real_values() {
        let value = TimeMonzo::from_cents(700.0, None).unwrap();
        assert!(value.to_string().starts_with("1,498"));
        let tempered = TimeMonzo::from_equal_temperament(r(1, 2), None, None).unwrap();
        assert!(tempered.to_string().starts_with("1,414"));
    }

    #[test]
    fn test_backslash_string() {
        let fifth = TimeMonzo::from_equal_temperament(r(7, 12), None, None).unwrap();
        assert_eq!(fifth.to_backslash_string().unwrap(), "7\\12");

        let tritave = TimeMonzo::from_equal_temperament(r(1, 13), Some(r(3, 1)), None).unwrap();
        assert_eq!(tritave.to_backslash_string().unwrap(), "1\\13<3>");

        let octave = TimeMonzo::from_integer(4, None).unwrap();
        assert_eq!(octave.to_backslash_string().unwrap(), "2<2>");

        let septimal = TimeMonzo::from_fraction(r(7, 4), Some(3)).unwrap();
        assert!(septimal.to_backslash_string().is_err());
    }

    #[test]
    fn test_as_integer_literal() {
        let target = IntervalLiteral::Integer {
            value: BigInt::from(0),
        };
        let twelve = TimeMonzo::from_integer(12, None).unwrap();
        assert_eq!(
            twelve.as_literal(&target),
            Some(IntervalLiteral::Integer {
                value: BigInt::from(12)
            })
        );
        let half = TimeMonzo::from_fraction(r(1, 2), None).unwrap();
        assert_eq!(half.as_literal(&target), None);
    }

    #[test]
    fn test_as_nedo_literal() {
        let fifth = TimeMonzo::from_equal_temperament(r(7, 12), None, None).unwrap();
        // compatible denominators scale up
        assert_eq!(fifth.as_literal(&nedo(0, 24)), Some(nedo(14, 24)));
        assert_eq!(fifth.as_literal(&nedo(0, 12)), Some(nedo(7, 12)));
        // incompatible ones report the finer division
        assert_eq!(fifth.as_literal(&nedo(0, 5)), Some(nedo(7, 12)));

        let tritave = TimeMonzo::from_equal_temperament(r(1, 13), Some(r(3, 1)), None).unwrap();
        assert_eq!(tritave.as_literal(&nedo(0, 13)), None);

        let septimal = TimeMonzo::from_fraction(r(7, 4), None).unwrap();
        assert_eq!(septimal.as_literal(&nedo(0, 12)), None);

        let unison = TimeMonzo::from_integer(1, None).unwrap();
        assert_eq!(unison.as_literal(&nedo(1, 12)), Some(nedo(0, 12)));
    }

    #[test]
    fn test_literal_serde_shape() {
        let json = serde_json::to_string(&nedo(7, 12)).unwrap();
        assert_eq!(json, r#"{"type":"NedoLiteral","numerator":7,"denominator":12}"#);
        assert_eq!(nedo(7, 12).to_string(), "7\\12");
    }
}
