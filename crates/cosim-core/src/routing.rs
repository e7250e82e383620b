//! Channel inference for remote operations
//!
//! Remote clients address a VVC by type and instance ID only. The channel part
//! of the identity is looked up here, per type and per direction, from an
//! explicit table that is loaded with the bridge configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::InstanceIdentity;

/// Direction of traffic relative to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Remote client -> simulation
    Transmit,
    /// Simulation -> remote client
    Receive,
}

/// Channel names used for each direction of one VVC type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPair {
    /// Channel holding the transmit queue
    pub transmit: String,
    /// Channel holding the receive queue
    pub receive: String,
}

impl ChannelPair {
    /// Create a channel pair
    pub fn new(transmit: impl Into<String>, receive: impl Into<String>) -> Self {
        Self {
            transmit: transmit.into(),
            receive: receive.into(),
        }
    }

    /// Get the channel name for a direction
    pub fn for_direction(&self, direction: Direction) -> &str {
        match direction {
            Direction::Transmit => &self.transmit,
            Direction::Receive => &self.receive,
        }
    }
}

impl Default for ChannelPair {
    fn default() -> Self {
        Self::new("NA", "NA")
    }
}

/// Table mapping VVC types to their transmit/receive channel names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMap {
    /// Per-type entries
    #[serde(default)]
    pub types: BTreeMap<String, ChannelPair>,
    /// Channels used for types without an entry
    #[serde(default)]
    pub fallback: ChannelPair,
}

impl ChannelMap {
    /// Create an empty map where every type resolves to the fallback pair
    pub fn new(fallback: ChannelPair) -> Self {
        Self {
            types: BTreeMap::new(),
            fallback,
        }
    }

    /// Add or replace the entry for a VVC type
    pub fn with_type(mut self, vvc_type: impl Into<String>, pair: ChannelPair) -> Self {
        self.types.insert(vvc_type.into(), pair);
        self
    }

    /// Channel pair for a VVC type
    pub fn pair(&self, vvc_type: &str) -> &ChannelPair {
        self.types.get(vvc_type).unwrap_or(&self.fallback)
    }

    /// Channel name for a VVC type in the given direction
    pub fn channel(&self, vvc_type: &str, direction: Direction) -> &str {
        self.pair(vvc_type).for_direction(direction)
    }

    /// Build the full identity for a type/instance in the given direction
    pub fn resolve(&self, vvc_type: &str, instance_id: i32, direction: Direction) -> InstanceIdentity {
        InstanceIdentity::new(vvc_type, self.channel(vvc_type, direction), instance_id)
    }
}

impl Default for ChannelMap {
    /// UART VVCs use separate `TX`/`RX` channels; other VVC types are
    /// bidirectional on channel `NA`.
    fn default() -> Self {
        Self::new(ChannelPair::default()).with_type("UART_VVC", ChannelPair::new("TX", "RX"))
    }
}
