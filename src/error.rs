use num_rational::Rational64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Cannot {operation} time monzos with disparate units. Have s^{left} and s^{right}")]
    DimensionMismatch {
        operation: &'static str,
        left: Rational64,
        right: Rational64,
    },
    #[error("Unable to convert irrational number to {target}")]
    Irrational { target: &'static str },
    #[error("Unable to convert fractional number to {target}")]
    Fractional { target: &'static str },
    #[error("Unable to convert negative exponent to {target}")]
    NegativeExponent { target: &'static str },
    #[error("Unable to convert non-representable fraction to {target}")]
    NonUnitResidual { target: &'static str },
    #[error("Unable to {operation} a non-scalar")]
    NonScalar { operation: &'static str },
    #[error("Solution doesn't exist")]
    NoLogSolution,
    #[error("Cannot take a scalar logarithm of a value with time units")]
    ScalarLogOfTimeUnits,
    #[error("No geometric inverse exists")]
    NoGeometricInverse,
    #[error("Reduction by unison")]
    ReductionByUnison,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Residuals prevent calculating the dot product")]
    ResidualsPreventDot,
    #[error("Invalid cents value: {0}")]
    NonFiniteCents(f64),
    #[error("Not enough components for equave {equave}: need {required}, have {available}")]
    InsufficientComponents {
        equave: Rational64,
        required: usize,
        available: usize,
    },
    #[error("Residual exceeds safe limit")]
    ResidualOverflow,
    #[error("Requested {requested} components but only {available} primes are tabulated")]
    TooManyComponents { requested: usize, available: usize },
    #[error("Cannot raise time units to an irrational power")]
    IrrationalTimePower,
    #[error("Arithmetic overflow during {operation}")]
    Overflow { operation: &'static str },
    #[error("Unrecognized nominal '{0}'")]
    UnrecognizedNominal(String),
    #[error("Unrecognized accidental '{0}'")]
    UnrecognizedAccidental(String),
    #[error("Unrecognized quality '{0}'")]
    UnrecognizedQuality(String),
    #[error("Unrecognized degree {0}")]
    UnrecognizedDegree(usize),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
