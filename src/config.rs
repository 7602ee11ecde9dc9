//! Server configuration.

use crate::crypto::credential::HashCost;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Directory name used under the platform data dir.
pub const DATA_NAMESPACE: &str = "vicat-keys";

/// Username of the admin created on first boot when none is configured.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Password of the admin created on first boot when none is configured.
/// Deployers must rotate this immediately.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// Configuration for the vicat-keys server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub bind: SocketAddr,

    /// Path of the JSON state document.
    pub data_path: PathBuf,

    /// Admin username used for first-boot bootstrap.
    pub admin_username: String,

    /// Admin password used for first-boot bootstrap.
    pub admin_password: String,

    /// Argon2 work factor for new password hashes.
    pub hash_cost: HashCost,

    /// How often expired sessions are swept.
    pub sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_path: default_data_path(),
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            hash_cost: HashCost::default(),
            sweep_interval: Duration::from_secs(60 * 60),
        }
    }
}

impl ServerConfig {
    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), crate::VicatError> {
        if self.admin_username.is_empty() {
            return Err(crate::VicatError::ConfigError(
                "admin_username cannot be empty".to_string(),
            ));
        }
        if self.admin_password.is_empty() {
            return Err(crate::VicatError::ConfigError(
                "admin_password cannot be empty".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(crate::VicatError::ConfigError(
                "sweep_interval must be non-zero".to_string(),
            ));
        }
        self.hash_cost.validate()?;
        Ok(())
    }
}

/// Default state document location: `dirs::data_dir()/vicat-keys/state.json`.
///
/// Falls back to the working directory when the platform has no data dir.
pub fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_NAMESPACE))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("state.json")
}
