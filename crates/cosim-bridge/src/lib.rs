//! VVC Co-simulation Bridge
//!
//! Connects a running HDL simulation to remote test programs. The simulator
//! calls into a [`SimulationAdapter`]; remote programs call JSON-RPC methods
//! over HTTP. Both sides meet in the shared [`cosim_core::Registry`].
//!
//! # Remote procedures
//!
//! Served at `POST /jsonrpc` (port 8484 unless configured otherwise):
//!
//! | Method           | Parameters                                        | Result           |
//! |------------------|---------------------------------------------------|------------------|
//! | `GetVvcList`     | none                                              | list of VVCs     |
//! | `TransmitBytes`  | `vvc_type`, `vvc_id`, `data`                      | `{}`             |
//! | `ReceiveBytes`   | `vvc_type`, `vvc_id`, `length`, `all_or_nothing`  | `{"data": [..]}` |
//! | `TransmitPacket` | `vvc_type`, `vvc_id`, `data`                      | not implemented  |
//! | `ReceivePacket`  | `vvc_type`, `vvc_id`                              | not implemented  |
//! | `StartSim`       | none                                              | `{}`             |
//!
//! Each result is wrapped in a `{"success": .., "result": ..}` envelope.
//!
//! # Lifecycle
//!
//! The server starts on the simulation start signal and stops on the end
//! signal. With `wait_for_begin` set, simulation start blocks until a client
//! calls `StartSim` or the begin timeout elapses.

pub mod adapter;
pub mod config;
pub mod error;
pub mod facade;
pub mod gate;
pub mod lifecycle;
pub mod logging;
pub mod protocol;
pub mod server;

pub use adapter::SimulationAdapter;
pub use config::{BridgeConfig, CONFIG_ENV, DEFAULT_PORT, PORT_ENV};
pub use error::{BridgeError, FacadeError, SimulationViolation};
pub use facade::RemoteFacade;
pub use gate::BeginGate;
pub use lifecycle::{LifecycleController, LifecycleState};
pub use protocol::{Envelope, RpcError, RpcRequest};
pub use server::{router, serve, RPC_PATH};
