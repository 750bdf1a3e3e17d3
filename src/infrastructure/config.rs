// Infrastructure: runtime configuration from the process environment

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::DEFAULT_SOLVER;
use crate::solver::MiniZincConfig;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server binary needs to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub address: SocketAddr,
    pub default_solver: String,
    pub minizinc: MiniZincConfig,
}

impl AppConfig {
    /// Read the configuration from the environment (after `.env` was loaded)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`; unset and blank variables take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host: IpAddr = parse_or(get("BIND_ADDRESS"), "BIND_ADDRESS", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parse_or(get("PORT"), "PORT", 50051)?;
        let grace_ms: u64 = parse_or(get("MINIZINC_TIMEOUT_GRACE_MS"), "MINIZINC_TIMEOUT_GRACE_MS", 5000)?;

        let defaults = MiniZincConfig::default();
        let minizinc = MiniZincConfig {
            executable: get("MINIZINC_EXECUTABLE")
                .map(PathBuf::from)
                .unwrap_or(defaults.executable),
            install_dir: get("MINIZINC_HOME").map(PathBuf::from),
            timeout_grace: Duration::from_millis(grace_ms),
        };

        Ok(Self {
            address: SocketAddr::new(host, port),
            default_solver: get("MINIZINC_DEFAULT_SOLVER")
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| DEFAULT_SOLVER.to_string()),
            minizinc,
        })
    }
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
