use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

use managme_core::constants::managme_dir;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
}

/// Fallback signing secret for local development. Set
/// MANAGME_TOKEN_SECRET in production.
const DEV_TOKEN_SECRET: &str = "managme-dev-secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub auth_port: u16,
    pub data_dir: PathBuf,
    pub token_secret: String,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_port("MANAGME_PORT", 3001)?;
        let auth_port = parse_port("MANAGME_AUTH_PORT", 3000)?;

        let data_dir = env::var("MANAGME_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| managme_dir().join("server"));

        let token_secret =
            env::var("MANAGME_TOKEN_SECRET").unwrap_or_else(|_| DEV_TOKEN_SECRET.to_string());

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        Ok(Config {
            port,
            auth_port,
            data_dir,
            token_secret,
            cors_origin,
        })
    }

    pub fn using_dev_secret(&self) -> bool {
        self.token_secret == DEV_TOKEN_SECRET
    }
}

fn parse_port(var: &str, default: u16) -> Result<u16, ConfigError> {
    let port = env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u16>()?;
    if port == 0 {
        return Err(ConfigError::PortOutOfRange(port));
    }
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Mutex, MutexGuard};

    // The test harness runs in parallel and the environment is process
    // global, so every test touching it takes this lock first.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = env_lock();
        env::remove_var("MANAGME_PORT");
        env::remove_var("MANAGME_AUTH_PORT");
        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.auth_port, 3000);
        assert!(config.using_dev_secret());
    }

    #[test]
    fn env_overrides_are_read() {
        let _guard = env_lock();
        env::set_var("MANAGME_PORT", "4101");
        env::set_var("MANAGME_AUTH_PORT", "4100");
        let config = Config::from_env().unwrap();
        env::remove_var("MANAGME_PORT");
        env::remove_var("MANAGME_AUTH_PORT");

        assert_eq!(config.port, 4101);
        assert_eq!(config.auth_port, 4100);
    }

    #[test]
    fn port_zero_is_rejected() {
        let _guard = env_lock();
        assert!(matches!(
            parse_port("MANAGME_TEST_ZERO_PORT", 0),
            Err(ConfigError::PortOutOfRange(0))
        ));
    }

    #[test]
    fn garbage_ports_are_rejected() {
        let _guard = env_lock();
        env::set_var("MANAGME_TEST_BAD_PORT", "not-a-port");
        let result = parse_port("MANAGME_TEST_BAD_PORT", 3001);
        env::remove_var("MANAGME_TEST_BAD_PORT");
        assert!(matches!(result, Err(ConfigError::InvalidPort(_))));
    }
}
