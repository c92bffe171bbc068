//! Configuration error types.
//!
//! The simulation itself has no recoverable failure modes: every update is a
//! total function of state and input.  Errors only arise while loading or
//! validating [`crate::config::FlightConfig`].

use std::fmt;

/// Top-level error enum for voidrunner.
#[derive(Debug)]
pub enum SimError {
    /// The gear threshold table has fewer entries than there are gears.
    GearTableTooShort {
        /// Number of thresholds provided.
        len: usize,
        /// Configured highest gear.
        max_gear: u32,
    },

    /// A gear threshold is lower than the one before it.
    GearTableNotMonotonic {
        /// Index of the first offending entry.
        index: usize,
    },

    /// Tuning constant is outside its safe operating range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// The configuration file could not be parsed.
    ConfigParse {
        /// Path of the offending file.
        path: String,
        /// Parser message.
        message: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::GearTableTooShort { len, max_gear } => write!(
                f,
                "gear threshold table has {} entries but max_gear is {}",
                len, max_gear
            ),
            SimError::GearTableNotMonotonic { index } => write!(
                f,
                "gear threshold {} is lower than the threshold before it",
                index
            ),
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            SimError::ConfigParse { path, message } => {
                write!(f, "failed to parse {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;
