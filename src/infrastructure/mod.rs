// Infrastructure layer: configuration, logging and the gRPC server

pub mod config;
pub mod logging;
pub mod server;

pub use config::{AppConfig, ConfigError};
pub use logging::init_logging;
pub use server::{build_service, start_server, ServerConfig};
