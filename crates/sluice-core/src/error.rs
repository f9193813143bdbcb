//! Error types shared across the Sluice workspace.
//!
//! Recoverable conditions (unresolved endpoints, gates, exhausted
//! thresholds, denied operation cost) are not errors: the scheduler skips
//! and moves on. Only faults that indicate a broken external integration
//! surface here.

use std::error::Error;
use std::fmt;

/// Errors raised while running a transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferError {
    /// A handler agreed to an extraction when simulated and then produced
    /// nothing when executed with the same amount.
    ContractViolation {
        /// Diagnostic name of the offending handler.
        handler: String,
        /// The amount that was requested in both phases.
        requested: i64,
    },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContractViolation { handler, requested } => write!(
                f,
                "{handler} misbehaved: extract({requested}, execute) returned nothing \
                 although extract({requested}, simulate) did not"
            ),
        }
    }
}

impl Error for TransferError {}

/// Invalid [`EndpointSettings`](crate::EndpointSettings).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingsError {
    /// Rate must be at least 1.
    NonPositiveRate {
        /// The rejected rate.
        rate: i64,
    },
    /// Speed is a divisor and must be at least 1.
    ZeroSpeed,
    /// Threshold counts cannot be negative.
    NegativeThreshold {
        /// The rejected threshold.
        threshold: i64,
    },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveRate { rate } => write!(f, "rate must be positive, got {rate}"),
            Self::ZeroSpeed => write!(f, "speed must be at least 1"),
            Self::NegativeThreshold { threshold } => {
                write!(f, "threshold must be nonnegative, got {threshold}")
            }
        }
    }
}

impl Error for SettingsError {}
