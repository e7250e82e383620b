//! Remote façade over the registry
//!
//! Each operation is synchronous and takes at most one short lock at a time:
//! first the registry (to find the record), then the one channel it touches.
//! The RPC server calls these from its worker threads while the simulation
//! thread uses the same registry through [`crate::SimulationAdapter`].

use std::sync::Arc;

use cosim_core::{ChannelMap, CoreError, Direction, InstanceSummary, ReadMode, Registry};
use tracing::{debug, info};

use crate::error::FacadeError;
use crate::gate::BeginGate;

/// Request/response operations exposed to remote clients
#[derive(Debug)]
pub struct RemoteFacade {
    registry: Arc<Registry>,
    channel_map: ChannelMap,
    gate: Arc<BeginGate>,
}

impl RemoteFacade {
    /// Create a façade over a shared registry
    pub fn new(registry: Arc<Registry>, channel_map: ChannelMap, gate: Arc<BeginGate>) -> Self {
        Self {
            registry,
            channel_map,
            gate,
        }
    }

    /// Every registered VVC with its configuration
    pub fn list_instances(&self) -> Vec<InstanceSummary> {
        self.registry.instances()
    }

    /// Queue bytes for the simulation to send out through a VVC
    pub fn transmit(&self, vvc_type: &str, vvc_id: i32, data: &[u8]) -> Result<(), FacadeError> {
        let identity = self
            .channel_map
            .resolve(vvc_type, vvc_id, Direction::Transmit);
        let record = self.registry.require(&identity)?;

        record.transmit().push(data);
        debug!("Queued {} byte(s) for VVC {}", data.len(), identity);
        Ok(())
    }

    /// Take bytes the simulation received through a VVC
    ///
    /// In [`ReadMode::Exact`] an empty result means fewer than `length` bytes
    /// are buffered yet; the client is expected to ask again.
    pub fn receive(
        &self,
        vvc_type: &str,
        vvc_id: i32,
        length: i64,
        mode: ReadMode,
    ) -> Result<Vec<u8>, FacadeError> {
        let length = usize::try_from(length).map_err(|_| CoreError::InvalidLength(length))?;
        let identity = self
            .channel_map
            .resolve(vvc_type, vvc_id, Direction::Receive);
        let record = self.registry.require(&identity)?;

        let data = record.receive().pop_bulk(length, mode);
        debug!(
            "ReceiveBytes length={} mode={}: returning {} byte(s) from VVC {}",
            length,
            mode.name(),
            data.len(),
            identity
        );
        Ok(data)
    }

    /// Framed transmit; framing is not supported
    pub fn transmit_packet(
        &self,
        _vvc_type: &str,
        _vvc_id: i32,
        _data: &[u8],
    ) -> Result<(), FacadeError> {
        Err(FacadeError::NotImplemented)
    }

    /// Framed receive; framing is not supported
    pub fn receive_packet(&self, _vvc_type: &str, _vvc_id: i32) -> Result<Vec<u8>, FacadeError> {
        Err(FacadeError::NotImplemented)
    }

    /// Release a simulation held at start
    pub fn begin_simulation(&self) {
        if self.gate.release() {
            info!("Simulation start requested by client");
        } else {
            debug!("Simulation start already requested");
        }
    }
}
