use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{common::ConfigError, configs::*};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub playout: PlayoutConfig,
    pub logging: Option<LoggingConfig>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = if Path::new("config.toml").exists() {
            "config.toml"
        } else if Path::new("config.default.toml").exists() {
            "config.default.toml"
        } else {
            return Err(ConfigError::NotFound);
        };

        crate::log_println!("Loading configuration from: {}", config_path);
        Self::from_file(config_path)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        if config_str.trim().is_empty() {
            return Err(ConfigError::Empty(path.to_string()));
        }
        config_str.parse()
    }

    /// Rejects values that would stall or spin the playout loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.playout.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "playout.poll_interval_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if self.playout.write_queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "playout.write_queue_capacity",
                reason: "must be greater than zero".into(),
            });
        }
        if self.server.http_port == self.server.ws_port {
            return Err(ConfigError::Invalid {
                field: "server.ws_port",
                reason: format!("collides with http_port {}", self.server.http_port),
            });
        }
        Ok(())
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
