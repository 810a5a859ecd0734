pub mod config;
pub mod state;
pub mod telemetry;

pub use config::{ConfigError, GatewayConfig};
pub use state::AppState;
