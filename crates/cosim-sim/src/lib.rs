//! VVC Co-simulation Testbench Simulation
//!
//! This crate stands in for an HDL simulator when exercising the bridge. A
//! [`VirtualTestbench`] registers VVC instances, signals simulation start and
//! end, and moves bytes between VVCs over loopback wires, one cycle at a time.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use cosim_bridge::{BridgeConfig, SimulationAdapter};
//! use cosim_core::ReadMode;
//! use cosim_sim::{TestbenchConfig, VirtualTestbench};
//!
//! let adapter = Arc::new(SimulationAdapter::new(BridgeConfig::default()));
//! let mut tb = VirtualTestbench::new(Arc::clone(&adapter), TestbenchConfig::uart_loopback(0, ""));
//! tb.register_instances();
//!
//! // A remote client sends two bytes, the UART wire carries them back
//! adapter.facade().transmit("UART_VVC", 0, &[0x12, 0x34]).unwrap();
//! tb.run_until_idle(10);
//!
//! let echoed = adapter.facade().receive("UART_VVC", 0, 2, ReadMode::Exact).unwrap();
//! assert_eq!(echoed, vec![0x12, 0x34]);
//! ```

pub mod testbench;

pub use testbench::{LoopbackConfig, TestbenchConfig, VirtualInstanceConfig, VirtualTestbench};
