use std::fmt::{Display, Formatter, Result as FmtResult};

use num_rational::Rational64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::monzo::TimeMonzo;

/// Augmented unison 2187/2048 as exponents of 2 and 3.
const APOTOME: (i64, i64) = (-11, 7);

/// Octave in which nominals have their reference values.
const REFERENCE_OCTAVE: i64 = 4;

const DEGREES_PER_OCTAVE: i64 = 7;

/// Fractional quality prefixes in quarters of an apotome.
const FRACTIONAL_QUALITIES: [(&str, &str, i64); 6] = [
    ("qA", "¼A", 1),
    ("qd", "¼d", -1),
    ("QA", "¾A", 3),
    ("Qd", "¾d", -3),
    ("sA", "½A", 2),
    ("sd", "½d", -2),
];

/// Fractional accidental prefixes in quarters of the accidental.
const FRACTIONAL_ACCIDENTALS: [(&str, &str, i64); 3] =
    [("½", "s", 2), ("¼", "q", 1), ("¾", "Q", 3)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degree {
    pub negative: bool,
    /// 1 to 7
    pub base: usize,
    /// Half a step above `base`, e.g. 4.5 for the semioctave.
    pub interordinal: bool,
    pub octaves: i64,
}

/// Relative interval in Pythagorean notation, e.g. M3 or P-5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pythagorean {
    pub quality: String,
    /// Seconds, thirds, sixths and sevenths, which come in major and minor.
    pub imperfect: bool,
    pub degree: Degree,
}

/// Absolute pitch relative to C4, e.g. F♯4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsolutePitch {
    pub nominal: String,
    pub accidentals: Vec<String>,
    pub octave: i64,
}

/// Neutral intervals for imperfect degrees, perfect ones otherwise. Halves of exponents.
fn pythagorean_halves(base: usize) -> Option<(i64, i64)> {
    Some(match base {
        1 => (0, 0),
        2 => (5, -3),
        3 => (-1, 1),
        4 => (4, -2),
        5 => (-2, 2),
        6 => (3, -1),
        7 => (-3, 3),
        _ => return None,
    })
}

/// Interordinals related to Pythagorean intervals by a semioctave.
/// Splits the whole tone in half precisely in the middle. Halves of exponents.
fn tonesplitter_halves(base: usize) -> Option<(i64, i64)> {
    Some(match base {
        1 => (-3, 2),
        2 => (-9, 6),
        3 => (7, -4),
        4 => (1, 0),
        5 => (-5, 4),
        6 => (11, -6),
        7 => (5, -2),
        _ => return None,
    })
}

/// Halves of exponents.
fn nominal_halves(nominal: &str) -> Option<(i64, i64)> {
    Some(match nominal {
        "F" => (4, -2),
        "C" => (0, 0),
        "G" => (-2, 2),
        "D" => (-6, 4),
        "a" | "A" => (-8, 6),
        "E" => (-12, 8),
        "B" => (-14, 10),
        "beta" | "β" => (5, -2),
        "zeta" | "ζ" => (1, 0),
        "gamma" | "γ" => (-3, 2),
        "eta" | "η" => (-5, 4),
        "delta" | "δ" => (-9, 6),
        "alpha" | "α" => (-11, 8),
        "epsilon" | "ε" => (-15, 10),
        _ => return None,
    })
}

/// Size of an accidental in quarters of an apotome.
fn accidental_quarters(accidental: &str) -> Option<i64> {
    let whole = |accidental: &str| match accidental {
        "♯" | "#" => Some(4),
        "♭" | "b" => Some(-4),
        _ => None,
    };
    match accidental {
        "♮" | "=" => return Some(0),
        "𝄪" | "x" => return Some(8),
        "𝄫" => return Some(-8),
        "𝄲" | "‡" | "t" => return Some(2),
        "𝄳" | "d" => return Some(-2),
        _ => {}
    }
    for (symbol, letter, quarters) in FRACTIONAL_ACCIDENTALS {
        if let Some(rest) = accidental
            .strip_prefix(symbol)
            .or_else(|| accidental.strip_prefix(letter))
        {
            return whole(rest).map(|q| q / 4 * quarters);
        }
    }
    whole(accidental)
}

/// Widening of a quality relative to perfect (or neutral) in quarters of an apotome.
fn quality_quarters(quality: &str) -> Option<i64> {
    let mut rest = quality;
    let mut quarters = 0;
    for (letter, symbol, amount) in FRACTIONAL_QUALITIES {
        if let Some(tail) = rest
            .strip_prefix(letter)
            .or_else(|| rest.strip_prefix(symbol))
        {
            rest = tail;
            quarters += amount;
        }
    }
    while let Some(tail) = rest.strip_prefix('A') {
        rest = tail;
        quarters += 4;
    }
    while let Some(tail) = rest.strip_prefix('d') {
        rest = tail;
        quarters -= 4;
    }
    quarters += match rest {
        "" | "P" | "n" => 0,
        "M" => 2,
        "m" => -2,
        "sM" | "½M" => 1,
        "sm" | "½m" => -1,
        _ => return None,
    };
    Some(quarters)
}

fn from_quarters(two: i64, three: i64) -> Result<TimeMonzo> {
    TimeMonzo::from_prime_vector(vec![Rational64::new(two, 4), Rational64::new(three, 4)])
}

/// Value of a relative Pythagorean interval over the primes 2 and 3.
pub fn pythagorean_monzo(node: &Pythagorean) -> Result<TimeMonzo> {
    let degree = &node.degree;
    let table = if degree.interordinal {
        tonesplitter_halves
    } else {
        pythagorean_halves
    };
    let (two, three) = table(degree.base).ok_or(Error::UnrecognizedDegree(degree.base))?;
    let mut quarters = quality_quarters(&node.quality)
        .ok_or_else(|| Error::UnrecognizedQuality(node.quality.clone()))?;
    // imperfect intervals start from neutral
    if node.imperfect {
        if node.quality.ends_with('A') {
            quarters += 2;
        } else if node.quality.ends_with('d') {
            quarters -= 2;
        }
    }
    let monzo = from_quarters(
        2 * two + APOTOME.0 * quarters + 4 * degree.octaves,
        2 * three + APOTOME.1 * quarters,
    )?;
    if degree.negative {
        monzo.inverse()
    } else {
        Ok(monzo)
    }
}

/// Value of an absolute pitch relative to C4.
pub fn absolute_monzo(node: &AbsolutePitch) -> Result<TimeMonzo> {
    let (two, three) = nominal_halves(&node.nominal)
        .ok_or_else(|| Error::UnrecognizedNominal(node.nominal.clone()))?;
    let quarters = node.accidentals.iter().try_fold(0, |sum, accidental| {
        accidental_quarters(accidental)
            .map(|q| sum + q)
            .ok_or_else(|| Error::UnrecognizedAccidental(accidental.clone()))
    })?;
    from_quarters(
        2 * two + APOTOME.0 * quarters + 4 * (node.octave - REFERENCE_OCTAVE),
        2 * three + APOTOME.1 * quarters,
    )
}

impl Display for Pythagorean {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let sign = if self.degree.negative { "-" } else { "" };
        let number = self.degree.base as i64 + DEGREES_PER_OCTAVE * self.degree.octaves;
        let half = if self.degree.interordinal { ".5" } else { "" };
        write!(f, "{}{sign}{number}{half}", self.quality)
    }
}

impl Display for AbsolutePitch {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{}{}{}",
            self.nominal,
            self.accidentals.concat(),
            self.octave
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> Rational64 {
        Rational64::new(n, d)
    }

    fn interval(quality: &str, base: usize, imperfect: bool) -> Pythagorean {
        Pythagorean {
            quality: quality.to_string(),
            imperfect,
            degree: Degree {
                negative: false,
                base,
                interordinal: false,
                octaves: 0,
            },
        }
    }

    fn pitch(nominal: &str, accidentals: &[&str], octave: i64) -> AbsolutePitch {
        AbsolutePitch {
            nominal: nominal.to_string(),
            accidentals: accidentals.iter().map(|a| a.to_string()).collect(),
            octave,
        }
    }

    fn fraction_of(node: &Pythagorean) -> Rational64 {
        pythagorean_monzo(node).unwrap().to_fraction().unwrap()
    }

    #[test]
    fn test_basic_intervals() {
        assert_eq!(fraction_of(&interval("P", 1, false)), r(1, 1));
        assert_eq!(fraction_of(&interval("M", 2, true)), r(9, 8));
        assert_eq!(fraction_of(&interval("m", 2, true)), r(256, 243));
        assert_eq!(fraction_of(&interval("M", 3, true)), r(81, 64));
        assert_eq!(fraction_of(&interval("m", 3, true)), r(32, 27));
        assert_eq!(fraction_of(&interval("P", 4, false)), r(4, 3));
        assert_eq!(fraction_of(&interval("P", 5, false)), r(3, 2));
        assert_eq!(fraction_of(&interval("M", 6, true)), r(27, 16));
        assert_eq!(fraction_of(&interval("m", 7, true)), r(16, 9));
    }

    #[test]
    fn test_augmented_and_diminished() {
        assert_eq!(fraction_of(&interval("A", 4, false)), r(729, 512));
        assert_eq!(fraction_of(&interval("d", 5, false)), r(1024, 729));
        // one apotome above major
        assert_eq!(fraction_of(&interval("A", 3, true)), r(177147, 131072));
        assert_eq!(fraction_of(&interval("AA", 1, false)), r(4782969, 4194304));
        // one apotome below minor
        assert_eq!(fraction_of(&interval("d", 3, true)), r(65536, 59049));
    }

    #[test]
    fn test_neutral_and_fractional_qualities() {
        let neutral = pythagorean_monzo(&interval("n", 3, true)).unwrap();
        assert_eq!(**neutral.prime_exponents(), [r(-1, 2), r(1, 2)]);

        let semiaugmented = pythagorean_monzo(&interval("sA", 1, false)).unwrap();
        let also = pythagorean_monzo(&interval("½A", 1, false)).unwrap();
        assert_eq!(**semiaugmented.prime_exponents(), [r(-11, 2), r(7, 2)]);
        assert!(semiaugmented.strict_equals(&also));

        let quarter = pythagorean_monzo(&interval("qA", 1, false)).unwrap();
        assert_eq!(**quarter.prime_exponents(), [r(-11, 4), r(7, 4)]);

        let semimajor = pythagorean_monzo(&interval("sM", 3, true)).unwrap();
        assert_eq!(**semimajor.prime_exponents(), [r(-13, 4), r(9, 4)]);
    }

    #[test]
    fn test_compound_negative_and_interordinal() {
        let mut octave = interval("P", 1, false);
        octave.degree.octaves = 1;
        assert_eq!(fraction_of(&octave), r(2, 1));
        assert_eq!(octave.to_string(), "P8");

        let mut down = interval("P", 5, false);
        down.degree.negative = true;
        assert_eq!(fraction_of(&down), r(2, 3));
        assert_eq!(down.to_string(), "P-5");

        let mut semioctave = interval("n", 4, false);
        semioctave.degree.interordinal = true;
        let monzo = pythagorean_monzo(&semioctave).unwrap();
        assert_eq!(**monzo.prime_exponents(), [r(1, 2), r(0, 1)]);
        assert_eq!(monzo.to_cents(), Ok(600.0));
    }

    #[test]
    fn test_unrecognized_interval_tokens() {
        assert_eq!(
            pythagorean_monzo(&interval("X", 5, false)),
            Err(Error::UnrecognizedQuality("X".to_string()))
        );
        assert_eq!(
            pythagorean_monzo(&interval("P", 8, false)),
            Err(Error::UnrecognizedDegree(8))
        );
    }

    #[test]
    fn test_absolute_pitches() {
        let value = |node: AbsolutePitch| absolute_monzo(&node).unwrap().to_fraction().unwrap();
        assert_eq!(value(pitch("C", &[], 4)), r(1, 1));
        assert_eq!(value(pitch("C", &[], 5)), r(2, 1));
        assert_eq!(value(pitch("A", &[], 4)), r(27, 16));
        assert_eq!(value(pitch("a", &[], 4)), r(27, 16));
        assert_eq!(value(pitch("F", &["♯"], 4)), r(729, 512));
        assert_eq!(value(pitch("F", &["#"], 4)), r(729, 512));
        assert_eq!(value(pitch("B", &["b"], 3)), r(8, 9));
        assert_eq!(value(pitch("E", &["♭", "♭"], 4)), r(65536, 59049));
        assert_eq!(value(pitch("C", &["x"], 4)), r(4782969, 4194304));
    }

    #[test]
    fn test_fractional_accidentals() {
        let semisharp = absolute_monzo(&pitch("C", &["½♯"], 4)).unwrap();
        assert_eq!(**semisharp.prime_exponents(), [r(-11, 2), r(7, 2)]);
        let also = absolute_monzo(&pitch("C", &["t"], 4)).unwrap();
        assert!(semisharp.strict_equals(&also));

        let sesquiflat = absolute_monzo(&pitch("C", &["Qb"], 4)).unwrap();
        assert_eq!(**sesquiflat.prime_exponents(), [r(33, 4), r(-21, 4)]);
    }

    #[test]
    fn test_semiquartal_nominals() {
        let zeta = absolute_monzo(&pitch("ζ", &[], 4)).unwrap();
        assert_eq!(zeta.to_cents(), Ok(600.0));
        let spelled = absolute_monzo(&pitch("zeta", &[], 4)).unwrap();
        assert!(zeta.strict_equals(&spelled));
        assert_eq!(pitch("F", &["♯"], 4).to_string(), "F♯4");
    }

    #[test]
    fn test_unrecognized_pitch_tokens() {
        assert_eq!(
            absolute_monzo(&pitch("H", &[], 4)),
            Err(Error::UnrecognizedNominal("H".to_string()))
        );
        assert_eq!(
            absolute_monzo(&pitch("C", &["?"], 4)),
            Err(Error::UnrecognizedAccidental("?".to_string()))
        );
    }
}
