//! Standalone virtual testbench
//!
//! Runs the bridge against a [`VirtualTestbench`] so remote clients can be
//! developed without an HDL simulator:
//!
//! ```text
//! cosim-testbench [testbench.json]
//! ```
//!
//! Bridge settings come from `UVVM_COSIM_CONFIG` / `UVVM_COSIM_PORT`. Without
//! a testbench file a single UART loopback (instance 1) runs until killed.

use std::path::PathBuf;
use std::sync::Arc;

use cosim_bridge::{BridgeError, SimulationAdapter};
use cosim_sim::{TestbenchConfig, VirtualTestbench};

fn main() -> Result<(), BridgeError> {
    let adapter = Arc::new(SimulationAdapter::from_env()?);

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => TestbenchConfig::load(&path)?,
        None => TestbenchConfig::default(),
    };

    let mut testbench = VirtualTestbench::new(adapter, config);
    tracing::info!(
        "Starting virtual testbench with {} instance(s), {} loopback(s)",
        testbench.config().instances.len(),
        testbench.config().loopbacks.len()
    );

    testbench.start()?;
    testbench.run();
    testbench.finish();
    Ok(())
}
