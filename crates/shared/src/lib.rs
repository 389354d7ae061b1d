pub mod config;
pub mod errors;
pub mod metrics;
pub mod telemetry;
pub mod tracing;

pub use self::tracing::init_tracing;
pub use config::*;
pub use errors::*;
pub use metrics::*;
