//! Entry points called from the simulator
//!
//! The HDL testbench reaches the bridge through a foreign-function layer that
//! forwards to a single [`SimulationAdapter`]. All calls come from the
//! simulator thread; remote clients reach the same registry concurrently
//! through the RPC server.

use std::net::SocketAddr;
use std::sync::Arc;

use cosim_core::{ByteFrame, InstanceIdentity, Registry};
use tracing::{debug, error, warn};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, SimulationViolation};
use crate::facade::RemoteFacade;
use crate::gate::BeginGate;
use crate::lifecycle::{LifecycleController, LifecycleState};
use crate::logging;

/// Bridge state owned by one simulation run
pub struct SimulationAdapter {
    registry: Arc<Registry>,
    facade: Arc<RemoteFacade>,
    lifecycle: LifecycleController,
}

impl SimulationAdapter {
    /// Create an adapter with the given settings
    pub fn new(config: BridgeConfig) -> Self {
        let registry = Arc::new(Registry::new());
        let gate = Arc::new(BeginGate::new());
        let facade = Arc::new(RemoteFacade::new(
            Arc::clone(&registry),
            config.channel_map.clone(),
            Arc::clone(&gate),
        ));
        let lifecycle = LifecycleController::new(config, Arc::clone(&facade), gate);

        Self {
            registry,
            facade,
            lifecycle,
        }
    }

    /// Install logging and create an adapter configured from the environment
    pub fn from_env() -> Result<Self, BridgeError> {
        logging::init();
        Ok(Self::new(BridgeConfig::from_env()?))
    }

    /// Shared registry
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Façade served to remote clients
    pub fn facade(&self) -> &Arc<RemoteFacade> {
        &self.facade
    }

    /// Register a VVC instance with its `key=value,...` configuration
    ///
    /// Returns `false` when the identity was already registered.
    pub fn register_instance(
        &self,
        vvc_type: &str,
        vvc_channel: &str,
        vvc_instance_id: i32,
        vvc_cfg: &str,
    ) -> bool {
        self.registry.register(
            InstanceIdentity::new(vvc_type, vvc_channel, vvc_instance_id),
            vvc_cfg,
        )
    }

    /// Whether the transmit queue of a VVC holds no data
    ///
    /// An unregistered VVC reports empty so the testbench never pops from it.
    pub fn is_transmit_queue_empty(&self, vvc_type: &str, vvc_channel: &str, vvc_instance_id: i32) -> bool {
        let identity = InstanceIdentity::new(vvc_type, vvc_channel, vvc_instance_id);
        match self.registry.lookup(&identity) {
            Some(record) => record.transmit().is_empty(),
            None => {
                warn!("Transmit queue queried for unregistered VVC with {}", identity);
                true
            }
        }
    }

    /// Take the next byte queued for transmission, if any
    pub fn try_pop_transmit_frame(
        &self,
        vvc_type: &str,
        vvc_channel: &str,
        vvc_instance_id: i32,
    ) -> Result<ByteFrame, SimulationViolation> {
        let identity = InstanceIdentity::new(vvc_type, vvc_channel, vvc_instance_id);
        let Some(record) = self.registry.lookup(&identity) else {
            return Err(SimulationViolation::UnknownInstance { identity });
        };
        let frame = record
            .transmit()
            .pop_front()
            .ok_or(SimulationViolation::EmptyTransmitQueue { identity })?;

        debug!(
            "Popped byte 0x{:02X} for VVC {}",
            frame.byte,
            record.identity()
        );
        Ok(frame)
    }

    /// Take the next byte queued for transmission
    ///
    /// # Panics
    ///
    /// The testbench must check [`Self::is_transmit_queue_empty`] first.
    /// Popping from an empty or unregistered queue means simulation and
    /// bridge disagree about queue state, and the run is aborted.
    pub fn pop_transmit_byte(&self, vvc_type: &str, vvc_channel: &str, vvc_instance_id: i32) -> u8 {
        match self.try_pop_transmit_frame(vvc_type, vvc_channel, vvc_instance_id) {
            Ok(frame) => frame.byte,
            Err(violation) => {
                error!("{}", violation);
                panic!("{}", violation);
            }
        }
    }

    /// Store a byte received by a VVC for remote clients to read
    ///
    /// Returns `false` and drops the byte when the VVC is not registered.
    pub fn push_receive_byte(
        &self,
        vvc_type: &str,
        vvc_channel: &str,
        vvc_instance_id: i32,
        byte: u8,
        end_of_frame: bool,
    ) -> bool {
        let identity = InstanceIdentity::new(vvc_type, vvc_channel, vvc_instance_id);
        match self.registry.lookup(&identity) {
            Some(record) => {
                record
                    .receive()
                    .push_frame(ByteFrame::with_end_of_frame(byte, end_of_frame));
                debug!("Received byte 0x{:02X} on VVC {}", byte, identity);
                true
            }
            None => {
                warn!("Dropped byte 0x{:02X} for unregistered VVC with {}", byte, identity);
                false
            }
        }
    }

    /// Simulation start signal
    ///
    /// Must be called from a plain thread, not from inside a tokio runtime.
    pub fn signal_simulation_start(&self) -> Result<(), BridgeError> {
        self.lifecycle.on_simulation_start()
    }

    /// Simulation end signal
    pub fn signal_simulation_end(&self) {
        self.lifecycle.on_simulation_end();
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Address of the RPC server while it runs
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lifecycle.local_addr()
    }
}
