//! Tracing setup for the bridge

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "cosim_bridge=info,cosim_core=info,cosim_sim=info";

/// Install the global tracing subscriber
///
/// The simulator may load the bridge more than once per process; later calls
/// leave the first subscriber in place.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
