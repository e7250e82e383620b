//! Error types for the co-simulation core

use thiserror::Error;

use crate::identity::InstanceIdentity;

/// Errors that can occur when operating on registered instances
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No instance is registered under this identity
    #[error("VVC with {0} does not exist.")]
    NotFound(InstanceIdentity),

    /// A read length that cannot be satisfied by any channel
    #[error("invalid read length: {0}")]
    InvalidLength(i64),
}

/// Problems found while parsing a single entry of a config string
///
/// These never fail a registration; they are logged and parsing either skips
/// the entry or stops, see [`crate::parse_config_str`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigEntryError {
    /// Entry is not of the form `key=value`
    #[error("malformed config item \"{0}\"")]
    MalformedPair(String),

    /// Value is not an integer
    #[error("config value for \"{key}\" is not an integer: \"{value}\"")]
    InvalidInteger { key: String, value: String },
}
