#![warn(clippy::all, rust_2018_idioms)]

//! Exact algebra of musical intervals.
//!
//! Values are fractional monzos over the first few primes, with a rational residual
//! for factors that don't fit and a cents offset for everything irrational.

pub mod config;
mod error;
mod fraction;
mod literal;
mod monzo;
pub mod primes;
pub mod pythagorean;
mod vector;

pub use config::Config;
pub use error::{Error, Result};
pub use literal::IntervalLiteral;
pub use monzo::{EqualTemperament, Operand, TimeMonzo};
pub use vector::PrimeVector;
