//! Registry of VVC instances and their byte channels

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::channel::ByteChannel;
use crate::error::CoreError;
use crate::identity::InstanceIdentity;
use crate::instance_config::{parse_config_str, InstanceConfig};

/// A registered VVC with its transmit and receive channels
///
/// Many VVCs only use one of the two channels.
#[derive(Debug)]
pub struct InstanceRecord {
    identity: InstanceIdentity,
    config: InstanceConfig,
    transmit: ByteChannel,
    receive: ByteChannel,
}

impl InstanceRecord {
    fn new(identity: InstanceIdentity, config: InstanceConfig) -> Self {
        Self {
            identity,
            config,
            transmit: ByteChannel::new(),
            receive: ByteChannel::new(),
        }
    }

    /// Identity of this instance
    pub fn identity(&self) -> &InstanceIdentity {
        &self.identity
    }

    /// Configuration reported at registration
    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    /// Remote client -> simulation channel
    pub fn transmit(&self) -> &ByteChannel {
        &self.transmit
    }

    /// Simulation -> remote client channel
    pub fn receive(&self) -> &ByteChannel {
        &self.receive
    }
}

/// Listing entry for a registered VVC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSummary {
    #[serde(flatten)]
    pub identity: InstanceIdentity,
    pub vvc_cfg: InstanceConfig,
}

/// Identity-keyed directory of instance records
///
/// Records are created once and live as long as the registry. Lookups hand
/// out an `Arc` so the registry lock is released before any channel is
/// touched.
#[derive(Debug, Default)]
pub struct Registry {
    instances: RwLock<HashMap<InstanceIdentity, Arc<InstanceRecord>>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a VVC with a fresh pair of empty channels
    ///
    /// Returns `false` and leaves the registry unchanged when the identity is
    /// already present.
    pub fn register(&self, identity: InstanceIdentity, cfg_str: &str) -> bool {
        let config = parse_config_str(cfg_str);

        match self.instances.write().entry(identity) {
            Entry::Occupied(existing) => {
                warn!("VVC with {} exists already.", existing.key());
                false
            }
            Entry::Vacant(slot) => {
                info!(
                    "Registered VVC {} with {} config item(s)",
                    slot.key(),
                    config.len()
                );
                let record = InstanceRecord::new(slot.key().clone(), config);
                slot.insert(Arc::new(record));
                true
            }
        }
    }

    /// Find the record for an identity
    pub fn lookup(&self, identity: &InstanceIdentity) -> Option<Arc<InstanceRecord>> {
        self.instances.read().get(identity).cloned()
    }

    /// Find the record for an identity, failing with [`CoreError::NotFound`]
    pub fn require(&self, identity: &InstanceIdentity) -> Result<Arc<InstanceRecord>, CoreError> {
        self.lookup(identity)
            .ok_or_else(|| CoreError::NotFound(identity.clone()))
    }

    /// Every registered VVC with its configuration, sorted by identity
    pub fn instances(&self) -> Vec<InstanceSummary> {
        let mut list: Vec<InstanceSummary> = self
            .instances
            .read()
            .values()
            .map(|record| InstanceSummary {
                identity: record.identity.clone(),
                vvc_cfg: record.config.clone(),
            })
            .collect();
        list.sort_by(|a, b| a.identity.cmp(&b.identity));
        list
    }

    /// Number of registered instances
    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    /// Whether no instance has been registered
    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }
}
