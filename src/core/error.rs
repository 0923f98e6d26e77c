//! Error types for the engine.
//!
//! Inputs are trusted (the caller validates them); these errors cover the
//! cases where continuing would silently corrupt results.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::progression::stat_points::Skill;

/// Errors raised by engine operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A class tag has no entry in the modifier table.
    #[error("unknown character class: {0}")]
    UnknownClass(String),

    /// Allocation would spend more stat points than have been earned.
    #[error("cannot spend {requested} points on {skill}: only {available} unspent")]
    InsufficientStatPoints {
        skill: Skill,
        requested: u32,
        available: u32,
    },

    /// A ledger append would overlap or precede the existing high-water mark.
    #[error("ledger window {from} .. {to} overlaps high-water mark {high_water}")]
    LedgerOverlap {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        high_water: DateTime<Utc>,
    },

    /// A ledger window ends before it starts.
    #[error("ledger window {from} .. {to} is reversed")]
    ReversedWindow {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    /// A ledger entry was appended to another character's ledger.
    #[error("ledger entry for character {entry} appended to ledger of {ledger}")]
    LedgerOwnerMismatch { entry: u64, ledger: u64 },
}

/// Errors raised while loading or validating a balance configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Wrapper around IO errors when reading a config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around TOML parse errors.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside its permitted range.
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
