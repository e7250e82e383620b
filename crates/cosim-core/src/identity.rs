//! VVC instance identity

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identity of a verification component instance
///
/// Two instances are the same VVC when type, channel and instance ID all
/// match. Configuration is metadata held by the registry record, so it never
/// takes part in equality, hashing or ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceIdentity {
    /// VVC type name, e.g. `UART_VVC`
    pub vvc_type: String,
    /// Channel of the VVC, e.g. `TX`, `RX` or `NA`
    pub vvc_channel: String,
    /// Instance index within the testbench
    pub vvc_instance_id: i32,
}

impl InstanceIdentity {
    /// Create a new identity
    pub fn new(vvc_type: impl Into<String>, vvc_channel: impl Into<String>, id: i32) -> Self {
        Self {
            vvc_type: vvc_type.into(),
            vvc_channel: vvc_channel.into(),
            vvc_instance_id: id,
        }
    }
}

impl fmt::Display for InstanceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={} channel={} instance_id={}",
            self.vvc_type, self.vvc_channel, self.vvc_instance_id
        )
    }
}
