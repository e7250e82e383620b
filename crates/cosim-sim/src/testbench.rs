//! Virtual testbench
//!
//! Plays the part of an HDL testbench: registers VVC instances, signals
//! simulation start and end, and on every step moves bytes the way a UART
//! loopback wire would, from a VVC's transmit queue into another VVC's
//! receive queue.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cosim_bridge::{BridgeError, SimulationAdapter};
use cosim_core::InstanceIdentity;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A VVC instance the testbench registers at start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualInstanceConfig {
    pub vvc_type: String,
    pub vvc_channel: String,
    pub vvc_instance_id: i32,
    /// Configuration string in `key=value,...` form
    #[serde(default)]
    pub cfg: String,
}

impl VirtualInstanceConfig {
    pub fn new(
        vvc_type: impl Into<String>,
        vvc_channel: impl Into<String>,
        vvc_instance_id: i32,
        cfg: impl Into<String>,
    ) -> Self {
        Self {
            vvc_type: vvc_type.into(),
            vvc_channel: vvc_channel.into(),
            vvc_instance_id,
            cfg: cfg.into(),
        }
    }

    pub fn identity(&self) -> InstanceIdentity {
        InstanceIdentity::new(&self.vvc_type, &self.vvc_channel, self.vvc_instance_id)
    }
}

/// Wire from one VVC's transmit side to another VVC's receive side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopbackConfig {
    /// Instance whose transmit queue is drained
    pub from: InstanceIdentity,
    /// Instance whose receive queue is filled
    pub to: InstanceIdentity,
}

/// Configuration for a virtual testbench
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestbenchConfig {
    /// Instances registered at start
    #[serde(default)]
    pub instances: Vec<VirtualInstanceConfig>,
    /// Loopback wires evaluated on every step
    #[serde(default)]
    pub loopbacks: Vec<LoopbackConfig>,
    /// Bytes each wire moves per step
    #[serde(default = "default_bytes_per_step")]
    pub bytes_per_step: usize,
    /// Wall-clock time between cycles when running free
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
    /// Cycles to run before signalling the end; `None` runs forever
    #[serde(default)]
    pub run_cycles: Option<u64>,
}

fn default_bytes_per_step() -> usize {
    1
}

fn default_step_interval_ms() -> u64 {
    1
}

impl TestbenchConfig {
    /// A single UART VVC with its TX wired back to its RX
    pub fn uart_loopback(instance_id: i32, cfg: &str) -> Self {
        let tx = VirtualInstanceConfig::new("UART_VVC", "TX", instance_id, cfg);
        let rx = VirtualInstanceConfig::new("UART_VVC", "RX", instance_id, cfg);
        Self {
            loopbacks: vec![LoopbackConfig {
                from: tx.identity(),
                to: rx.identity(),
            }],
            instances: vec![tx, rx],
            bytes_per_step: default_bytes_per_step(),
            step_interval_ms: default_step_interval_ms(),
            run_cycles: None,
        }
    }

    /// Load a testbench description from a JSON file
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let contents = std::fs::read_to_string(path).map_err(|source| BridgeError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

impl Default for TestbenchConfig {
    fn default() -> Self {
        Self::uart_loopback(1, "")
    }
}

/// Simulated testbench driving a [`SimulationAdapter`]
pub struct VirtualTestbench {
    adapter: Arc<SimulationAdapter>,
    config: TestbenchConfig,
    /// Steps executed so far
    cycle: u64,
    /// Bytes moved across all wires
    bytes_moved: u64,
}

impl VirtualTestbench {
    pub fn new(adapter: Arc<SimulationAdapter>, config: TestbenchConfig) -> Self {
        Self {
            adapter,
            config,
            cycle: 0,
            bytes_moved: 0,
        }
    }

    /// Adapter this testbench drives
    pub fn adapter(&self) -> &Arc<SimulationAdapter> {
        &self.adapter
    }

    /// Configuration the testbench was built from
    pub fn config(&self) -> &TestbenchConfig {
        &self.config
    }

    /// Steps executed so far
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Total bytes moved across all wires
    pub fn bytes_moved(&self) -> u64 {
        self.bytes_moved
    }

    /// Register every configured instance
    ///
    /// Returns how many were newly registered.
    pub fn register_instances(&self) -> usize {
        self.config
            .instances
            .iter()
            .filter(|instance| {
                self.adapter.register_instance(
                    &instance.vvc_type,
                    &instance.vvc_channel,
                    instance.vvc_instance_id,
                    &instance.cfg,
                )
            })
            .count()
    }

    /// Register instances and signal simulation start
    ///
    /// Blocks while the bridge waits for a client's `StartSim`.
    pub fn start(&self) -> Result<(), BridgeError> {
        let registered = self.register_instances();
        info!("Virtual testbench registered {} VVC instance(s)", registered);
        self.adapter.signal_simulation_start()
    }

    /// Advance one cycle; returns the number of bytes moved
    pub fn step(&mut self) -> usize {
        let mut moved = 0;

        for wire in &self.config.loopbacks {
            for _ in 0..self.config.bytes_per_step {
                let from = &wire.from;
                if self.adapter.is_transmit_queue_empty(
                    &from.vvc_type,
                    &from.vvc_channel,
                    from.vvc_instance_id,
                ) {
                    break;
                }

                let byte = self.adapter.pop_transmit_byte(
                    &from.vvc_type,
                    &from.vvc_channel,
                    from.vvc_instance_id,
                );
                let end_of_frame = self.adapter.is_transmit_queue_empty(
                    &from.vvc_type,
                    &from.vvc_channel,
                    from.vvc_instance_id,
                );

                let to = &wire.to;
                if self.adapter.push_receive_byte(
                    &to.vvc_type,
                    &to.vvc_channel,
                    to.vvc_instance_id,
                    byte,
                    end_of_frame,
                ) {
                    moved += 1;
                } else {
                    warn!("Loopback {} -> {} lost byte 0x{:02X}", from, to, byte);
                }
            }
        }

        self.cycle += 1;
        self.bytes_moved += moved as u64;
        if moved > 0 {
            debug!("Cycle {}: moved {} byte(s)", self.cycle, moved);
        }
        moved
    }

    /// Step until a cycle moves nothing or `max_steps` is reached
    ///
    /// Returns the number of steps taken.
    pub fn run_until_idle(&mut self, max_steps: u64) -> u64 {
        let mut steps = 0;
        while steps < max_steps {
            steps += 1;
            if self.step() == 0 {
                break;
            }
        }
        steps
    }

    /// Step on a wall-clock interval until `run_cycles` is reached
    pub fn run(&mut self) {
        let interval = self.config.step_interval();
        while self.config.run_cycles.map_or(true, |limit| self.cycle < limit) {
            self.step();
            std::thread::sleep(interval);
        }
    }

    /// Signal simulation end
    pub fn finish(&self) {
        info!(
            "Virtual testbench finished after {} cycle(s), {} byte(s) moved",
            self.cycle, self.bytes_moved
        );
        self.adapter.signal_simulation_end();
    }
}
