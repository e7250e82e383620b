//! Bridge configuration
//!
//! Settings are read from a JSON file named by `UVVM_COSIM_CONFIG`; any
//! missing field falls back to its default. `UVVM_COSIM_PORT` overrides the
//! listener port.

use std::path::Path;
use std::time::Duration;

use cosim_core::ChannelMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::BridgeError;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "UVVM_COSIM_CONFIG";

/// Environment variable overriding the listener port
pub const PORT_ENV: &str = "UVVM_COSIM_PORT";

/// Default JSON-RPC port
pub const DEFAULT_PORT: u16 = 8484;

/// Settings for the RPC server and the simulation-side gating
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    /// Address the listener binds to
    #[serde(default = "default_host")]
    pub host: String,
    /// Listener port (0 picks a free port)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Hold the simulation at start until a client calls `StartSim`
    #[serde(default)]
    pub wait_for_begin: bool,
    /// Give up waiting for `StartSim` after this long
    #[serde(default = "default_begin_timeout_ms")]
    pub begin_timeout_ms: u64,
    /// How long shutdown waits for in-flight requests
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
    /// Worker threads serving requests
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    /// Channel names used when a client addresses a VVC by type and ID
    #[serde(default)]
    pub channel_map: ChannelMap,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_begin_timeout_ms() -> u64 {
    10_000
}

fn default_shutdown_grace_ms() -> u64 {
    2_000
}

fn default_worker_threads() -> usize {
    2
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            wait_for_begin: false,
            begin_timeout_ms: default_begin_timeout_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
            worker_threads: default_worker_threads(),
            channel_map: ChannelMap::default(),
        }
    }
}

impl BridgeConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let contents = std::fs::read_to_string(path).map_err(|source| BridgeError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save config to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), BridgeError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|source| BridgeError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build config from the environment
    pub fn from_env() -> Result<Self, BridgeError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                info!("Loading bridge config from {:?}", path);
                Self::load(Path::new(&path))?
            }
            None => Self::default(),
        };

        if let Ok(port) = std::env::var(PORT_ENV) {
            config.port = port.trim().parse().map_err(|_| BridgeError::InvalidEnv {
                var: PORT_ENV,
                value: port.clone(),
            })?;
        }

        Ok(config)
    }

    /// `host:port` string for logging and binding
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Begin timeout as a duration
    pub fn begin_timeout(&self) -> Duration {
        Duration::from_millis(self.begin_timeout_ms)
    }

    /// Shutdown grace period as a duration
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}
