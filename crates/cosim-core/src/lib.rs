//! VVC Co-simulation Core
//!
//! This crate provides the shared data plane between a running HDL simulation
//! and remote clients: per-instance byte channels, the registry that owns them,
//! and the table used to infer channel names from a VVC type.
//!
//! # Architecture
//!
//! Every verification component instance (VVC) that the simulation reports is
//! stored in a [`Registry`] as an [`InstanceRecord`] with two [`ByteChannel`]s:
//!
//! - **Transmit**: filled by remote clients, drained by the simulation
//! - **Receive**: filled by the simulation, drained by remote clients
//!
//! The registry and each channel carry their own lock. Every operation takes
//! exactly one lock and releases it before returning, so traffic on unrelated
//! instances never serializes and no two locks are ever held together.
//!
//! # Example
//!
//! ```rust
//! use cosim_core::{InstanceIdentity, ReadMode, Registry};
//!
//! let registry = Registry::new();
//! let uart = InstanceIdentity::new("UART_VVC", "RX", 0);
//! registry.register(uart.clone(), "baud=115200");
//!
//! let record = registry.lookup(&uart).expect("registered above");
//! record.receive().push(&[0x01, 0x02, 0x03]);
//!
//! // Not enough data yet: Exact mode leaves the channel untouched
//! assert!(record.receive().pop_bulk(5, ReadMode::Exact).is_empty());
//! assert_eq!(record.receive().pop_bulk(5, ReadMode::BestEffort), vec![1, 2, 3]);
//! ```

pub mod channel;
pub mod error;
pub mod identity;
pub mod instance_config;
pub mod registry;
pub mod routing;

pub use channel::{ByteChannel, ByteFrame, ReadMode};
pub use error::CoreError;
pub use identity::InstanceIdentity;
pub use instance_config::{parse_config_str, InstanceConfig};
pub use registry::{InstanceRecord, InstanceSummary, Registry};
pub use routing::{ChannelMap, ChannelPair, Direction};
