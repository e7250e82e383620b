//! Server lifecycle tied to simulation start and end
//!
//! The simulator thread drives this controller. It owns a private tokio
//! runtime so the simulator never needs one of its own:
//!
//! ```text
//! NotStarted --start--> Listening --(StartSim | timeout | no wait)--> Running --end--> Stopped
//! ```
//!
//! Signals that arrive out of order are logged and ignored.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::facade::RemoteFacade;
use crate::gate::BeginGate;
use crate::server;

/// Where the bridge is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No server yet
    NotStarted,
    /// Server bound, simulation held at start
    Listening,
    /// Server accepting requests while simulation time advances
    Running,
    /// Server shut down
    Stopped,
}

impl LifecycleState {
    /// Lowercase name for log messages
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleState::NotStarted => "not started",
            LifecycleState::Listening => "listening",
            LifecycleState::Running => "running",
            LifecycleState::Stopped => "stopped",
        }
    }
}

struct RunningServer {
    runtime: Runtime,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

/// Starts and stops the RPC server on simulation signals
pub struct LifecycleController {
    config: BridgeConfig,
    facade: Arc<RemoteFacade>,
    gate: Arc<BeginGate>,
    state: Mutex<LifecycleState>,
    local_addr: Mutex<Option<SocketAddr>>,
    server: Mutex<Option<RunningServer>>,
}

impl LifecycleController {
    /// Create a controller that has not started the server yet
    pub fn new(config: BridgeConfig, facade: Arc<RemoteFacade>, gate: Arc<BeginGate>) -> Self {
        Self {
            config,
            facade,
            gate,
            state: Mutex::new(LifecycleState::NotStarted),
            local_addr: Mutex::new(None),
            server: Mutex::new(None),
        }
    }

    /// Current state
    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    /// Address the server is bound to while it runs
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    /// Simulation start: bring the server up, optionally wait for `StartSim`
    ///
    /// Blocks the calling thread while waiting for the client. A repeated
    /// start is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InsideRuntime`] when called from a thread that
    /// is already driving a tokio runtime, since the private runtime cannot
    /// block there. The state stays `NotStarted`.
    pub fn on_simulation_start(&self) -> Result<(), BridgeError> {
        if Handle::try_current().is_ok() {
            return Err(BridgeError::InsideRuntime);
        }

        // Held for the whole start so a concurrent signal sees a settled state
        let mut slot = self.server.lock();
        let state = self.state();
        if state != LifecycleState::NotStarted {
            warn!("Simulation start signal ignored, server is {}", state.name());
            return Ok(());
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads.max(1))
            .thread_name("cosim-rpc")
            .enable_all()
            .build()
            .map_err(BridgeError::Runtime)?;

        let addr = self.config.listen_addr();
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind(&addr))
            .map_err(|source| BridgeError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = runtime.spawn(server::serve(
            listener,
            Arc::clone(&self.facade),
            shutdown_rx,
        ));

        *self.state.lock() = LifecycleState::Listening;
        *self.local_addr.lock() = Some(local_addr);

        if self.config.wait_for_begin {
            info!(
                "Waiting up to {:?} for a client to start the simulation",
                self.config.begin_timeout()
            );
            if runtime.block_on(self.gate.wait(self.config.begin_timeout())) {
                info!("Simulation start released by client");
            } else {
                warn!("No StartSim received, continuing without client");
            }
        }

        *slot = Some(RunningServer {
            runtime,
            shutdown_tx,
            task,
        });
        *self.state.lock() = LifecycleState::Running;
        info!("Co-simulation bridge running on {}", local_addr);
        Ok(())
    }

    /// Simulation end: stop the server and wait for in-flight requests
    pub fn on_simulation_end(&self) {
        let Some(server) = self.server.lock().take() else {
            warn!(
                "Simulation end signal ignored, server is {}",
                self.state().name()
            );
            return;
        };

        stop(server, self.config.shutdown_grace());
        *self.local_addr.lock() = None;
        *self.state.lock() = LifecycleState::Stopped;
    }
}

/// Shut down, moving off the current thread if it is inside a runtime
fn stop(server: RunningServer, grace: Duration) {
    if Handle::try_current().is_err() {
        shutdown(server, grace);
        return;
    }
    if std::thread::spawn(move || shutdown(server, grace))
        .join()
        .is_err()
    {
        error!("JSON-RPC server shutdown thread panicked");
    }
}

fn shutdown(server: RunningServer, grace: Duration) {
    let RunningServer {
        runtime,
        shutdown_tx,
        task,
    } = server;

    let _ = shutdown_tx.send(());
    match runtime.block_on(async { tokio::time::timeout(grace, task).await }) {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => error!("JSON-RPC server failed: {}", e),
        Ok(Err(e)) => error!("JSON-RPC server task failed: {}", e),
        Err(_) => warn!("JSON-RPC server did not stop within {:?}", grace),
    }
    runtime.shutdown_timeout(grace);
    info!("Co-simulation bridge stopped");
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        if let Some(server) = self.server.get_mut().take() {
            stop(server, self.config.shutdown_grace());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosim_core::{ChannelMap, Registry};

    fn controller(config: BridgeConfig) -> (LifecycleController, Arc<BeginGate>) {
        let gate = Arc::new(BeginGate::new());
        let facade = Arc::new(RemoteFacade::new(
            Arc::new(Registry::new()),
            ChannelMap::default(),
            Arc::clone(&gate),
        ));
        (
            LifecycleController::new(config, facade, Arc::clone(&gate)),
            gate,
        )
    }

    fn ephemeral() -> BridgeConfig {
        BridgeConfig {
            port: 0,
            shutdown_grace_ms: 500,
            ..Default::default()
        }
    }

    #[test]
    fn test_start_and_end() {
        let (controller, _) = controller(ephemeral());
        assert_eq!(controller.state(), LifecycleState::NotStarted);

        controller.on_simulation_start().unwrap();
        assert_eq!(controller.state(), LifecycleState::Running);
        assert!(controller.local_addr().is_some());

        controller.on_simulation_end();
        assert_eq!(controller.state(), LifecycleState::Stopped);
        assert!(controller.local_addr().is_none());
    }

    #[test]
    fn test_out_of_order_signals_ignored() {
        let (controller, _) = controller(ephemeral());

        controller.on_simulation_end();
        assert_eq!(controller.state(), LifecycleState::NotStarted);

        controller.on_simulation_start().unwrap();
        let addr = controller.local_addr();
        controller.on_simulation_start().unwrap();
        assert_eq!(controller.local_addr(), addr);

        controller.on_simulation_end();
        controller.on_simulation_end();
        controller.on_simulation_start().unwrap();
        assert_eq!(controller.state(), LifecycleState::Stopped);
    }

    #[test]
    fn test_begin_timeout_proceeds() {
        let (controller, gate) = controller(BridgeConfig {
            wait_for_begin: true,
            begin_timeout_ms: 50,
            ..ephemeral()
        });

        controller.on_simulation_start().unwrap();

        assert_eq!(controller.state(), LifecycleState::Running);
        assert!(!gate.is_released());
    }

    #[test]
    fn test_early_release_skips_wait() {
        let (controller, gate) = controller(BridgeConfig {
            wait_for_begin: true,
            begin_timeout_ms: 60_000,
            ..ephemeral()
        });
        gate.release();

        controller.on_simulation_start().unwrap();
        assert_eq!(controller.state(), LifecycleState::Running);
    }

    #[test]
    fn test_bind_failure_keeps_not_started() {
        let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = blocker.local_addr().unwrap().port();
        let (controller, _) = controller(BridgeConfig {
            port,
            ..ephemeral()
        });

        let err = controller.on_simulation_start().unwrap_err();

        assert!(matches!(err, BridgeError::Bind { .. }));
        assert_eq!(controller.state(), LifecycleState::NotStarted);
    }

    #[tokio::test]
    async fn test_start_inside_runtime_rejected() {
        let (controller, _) = controller(ephemeral());

        let err = controller.on_simulation_start().unwrap_err();

        assert!(matches!(err, BridgeError::InsideRuntime));
        assert_eq!(controller.state(), LifecycleState::NotStarted);
        assert!(controller.local_addr().is_none());
    }

    #[test]
    fn test_end_and_drop_inside_runtime() {
        let (ended, _) = controller(ephemeral());
        ended.on_simulation_start().unwrap();
        let (dropped, _) = controller(ephemeral());
        dropped.on_simulation_start().unwrap();
        let addr = dropped.local_addr().unwrap();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            ended.on_simulation_end();
            drop(dropped);
        });

        assert_eq!(ended.state(), LifecycleState::Stopped);
        assert!(
            std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(200)).is_err()
        );
    }
}
