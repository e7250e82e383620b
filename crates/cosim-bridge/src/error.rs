//! Error types for the co-simulation bridge

use std::path::PathBuf;

use cosim_core::{CoreError, InstanceIdentity};
use thiserror::Error;

/// Errors that can occur while configuring or running the bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Config file could not be read or written
    #[error("config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`crate::BridgeConfig`]
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    /// Environment override has an unusable value
    #[error("invalid value for {var}: \"{value}\"")]
    InvalidEnv { var: &'static str, value: String },

    /// The RPC listener could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The async runtime for the server could not be created
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Simulation start was signalled from inside an async runtime
    #[error("simulation start must be signalled outside an async runtime")]
    InsideRuntime,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported to remote clients inside the response envelope
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FacadeError {
    /// Unknown identity or invalid argument from the core
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Operation is part of the surface but has no implementation
    #[error("Not implemented")]
    NotImplemented,
}

/// Broken contract between the simulation and the bridge
///
/// These mean the simulation's view of a queue and the bridge's view have
/// diverged; there is no safe way to continue the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationViolation {
    /// Pop requested from a transmit queue that holds no data
    #[error("transmit byte requested from empty queue of VVC with {identity}")]
    EmptyTransmitQueue { identity: InstanceIdentity },

    /// Pop requested for a VVC that was never registered
    #[error("transmit byte requested from unregistered VVC with {identity}")]
    UnknownInstance { identity: InstanceIdentity },
}
