use crossbeam::atomic::AtomicCell;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::primes::PRIMES;

/// Primes 2, 3, 5, 7, 11 and 13
pub const DEFAULT_NUMBER_OF_COMPONENTS: usize = 6;

const NUMBER_OF_COMPONENTS_ENV: &str = "MONZO_NUMBER_OF_COMPONENTS";

static NUMBER_OF_COMPONENTS: AtomicCell<usize> =
    AtomicCell::new(DEFAULT_NUMBER_OF_COMPONENTS);

/// Default length of the vector part of time monzos constructed without an explicit length.
pub fn number_of_components() -> usize {
    NUMBER_OF_COMPONENTS.load()
}

/// Change the default length of the vector part.
///
/// This is process-wide. Threads constructing values while another thread changes it
/// see either the old or the new length, never anything in between.
pub fn set_number_of_components(n: usize) -> Result<()> {
    if n > PRIMES.len() {
        return Err(Error::TooManyComponents {
            requested: n,
            available: PRIMES.len(),
        });
    }
    let previous = NUMBER_OF_COMPONENTS.swap(n);
    if previous != n {
        info!("Default number of monzo components changed from {previous} to {n}");
    }
    Ok(())
}

pub(crate) fn resolve_components(requested: Option<usize>) -> Result<usize> {
    let n = requested.unwrap_or_else(number_of_components);
    if n > PRIMES.len() {
        return Err(Error::TooManyComponents {
            requested: n,
            available: PRIMES.len(),
        });
    }
    Ok(n)
}

/// Explicit engine context for callers that prefer to thread settings through
/// instead of touching the process default directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub number_of_components: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_components: DEFAULT_NUMBER_OF_COMPONENTS,
        }
    }
}

impl Config {
    /// Snapshot of the process-wide settings.
    pub fn current() -> Self {
        Self {
            number_of_components: number_of_components(),
        }
    }

    /// Defaults overridden by `MONZO_NUMBER_OF_COMPONENTS` when it holds a usable value.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(NUMBER_OF_COMPONENTS_ENV).ok())
    }

    fn from_env_value(value: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = value {
            match value.trim().parse::<usize>() {
                Ok(n) if n <= PRIMES.len() => config.number_of_components = n,
                Ok(n) => warn!(
                    "{NUMBER_OF_COMPONENTS_ENV}={n} exceeds the {} tabulated primes, ignoring",
                    PRIMES.len()
                ),
                Err(e) => warn!("Ignoring {NUMBER_OF_COMPONENTS_ENV}={value:?}: {e}"),
            }
        }
        config
    }

    /// Install as the process-wide default.
    pub fn apply(&self) -> Result<()> {
        set_number_of_components(self.number_of_components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimeMonzo;
    use num_rational::Rational64;

    #[test]
    fn test_config_serde_shape() {
        let config: Config = serde_json::from_str(r#"{"number_of_components": 3}"#).unwrap();
        assert_eq!(config.number_of_components, 3);

        // missing fields fall back to defaults
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());

        let json = serde_json::to_string(&Config::default()).unwrap();
        assert_eq!(json, r#"{"number_of_components":6}"#);
    }

    #[test]
    fn test_resolve_components() {
        assert_eq!(resolve_components(Some(3)), Ok(3));
        assert_eq!(resolve_components(Some(0)), Ok(0));
        assert_eq!(
            resolve_components(Some(PRIMES.len() + 1)),
            Err(Error::TooManyComponents {
                requested: PRIMES.len() + 1,
                available: PRIMES.len()
            })
        );
    }

    #[test]
    fn test_from_env_value() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert_eq!(Config::from_env_value(None), Config::default());
        assert_eq!(
            Config::from_env_value(Some("3".to_string())).number_of_components,
            3
        );
        assert_eq!(
            Config::from_env_value(Some(PRIMES.len().to_string())).number_of_components,
            PRIMES.len()
        );
        // unusable values keep the default
        let oversized = (PRIMES.len() + 1).to_string();
        assert_eq!(Config::from_env_value(Some(oversized)), Config::default());
        assert_eq!(
            Config::from_env_value(Some("many".to_string())),
            Config::default()
        );
        assert_eq!(Config::from_env_value(Some("-1".to_string())), Config::default());
    }

    // Only test that changes the process-wide default. It raises it and restores it,
    // since tests running in parallel construct values with `None`.
    #[test]
    fn test_process_default_shapes_new_values() {
        let before = number_of_components();
        let raised = before.max(DEFAULT_NUMBER_OF_COMPONENTS) + 2;

        Config {
            number_of_components: raised,
        }
        .apply()
        .unwrap();
        assert_eq!(Config::current().number_of_components, raised);
        let fifth = TimeMonzo::from_fraction(Rational64::new(3, 2), None).unwrap();
        assert_eq!(fifth.number_of_components(), raised);
        let cents = TimeMonzo::from_cents(10.0, None).unwrap();
        assert_eq!(cents.number_of_components(), raised);
        // explicit lengths ignore the default
        let explicit = TimeMonzo::from_fraction(Rational64::new(3, 2), Some(2)).unwrap();
        assert_eq!(explicit.number_of_components(), 2);

        assert_eq!(
            set_number_of_components(PRIMES.len() + 1),
            Err(Error::TooManyComponents {
                requested: PRIMES.len() + 1,
                available: PRIMES.len()
            })
        );
        assert_eq!(number_of_components(), raised);

        set_number_of_components(before).unwrap();
        assert_eq!(number_of_components(), before);
    }
}
