use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,

    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/agendarr.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            cors_allowed_origins: vec![
                "http://localhost:3001".to_string(),
                "http://127.0.0.1:3001".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Registrations and logins are restricted to this email domain.
    pub allowed_email_domain: String,

    /// Fixed session lifetime; a token past this age is rejected.
    pub session_ttl_hours: i64,

    /// Length of one time step for second-factor codes, in seconds.
    pub totp_step_seconds: u64,

    /// Steps accepted on either side of the current one, absorbing client
    /// clock skew. 0 means exact-step only.
    pub totp_skew_steps: u32,

    /// Issuer label embedded in provisioning URIs.
    pub totp_issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_email_domain: "example.edu".to_string(),
            session_ttl_hours: 24,
            totp_step_seconds: 30,
            totp_skew_steps: 1,
            totp_issuer: "Agendarr".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    /// Lower values reduce memory usage but decrease GPU resistance.
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations) - higher = more CPU work
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Base URL of the LMS assignment feed.
    pub lms_base_url: String,

    /// Base URL of the external calendar provider.
    pub calendar_base_url: String,

    /// Per-call timeout against either source; a timed-out fetch counts as
    /// that container's failure, not a fatal sync error.
    pub request_timeout_seconds: u64,

    /// Upper bound on items pulled from the calendar feed per sync.
    pub calendar_max_results: u32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            lms_base_url: "https://lms.example.edu".to_string(),
            calendar_base_url: "https://calendar.example.com/v3".to_string(),
            request_timeout_seconds: 30,
            calendar_max_results: 50,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("agendarr").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".agendarr").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.allowed_email_domain.is_empty() {
            anyhow::bail!("Allowed email domain cannot be empty");
        }

        if self.auth.session_ttl_hours <= 0 {
            anyhow::bail!("Session TTL must be positive");
        }

        if self.auth.totp_step_seconds == 0 {
            anyhow::bail!("TOTP step must be > 0 seconds");
        }

        if self.sources.request_timeout_seconds == 0 {
            anyhow::bail!("Source request timeout must be > 0 seconds");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.auth.session_ttl_hours, 24);
        assert_eq!(config.auth.totp_step_seconds, 30);
        assert_eq!(config.auth.totp_skew_steps, 1);
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.sources.request_timeout_seconds, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[auth]"));
        assert!(toml_str.contains("[sources]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [auth]
            allowed_email_domain = "inst.edu"
            session_ttl_hours = 8
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.auth.allowed_email_domain, "inst.edu");
        assert_eq!(config.auth.session_ttl_hours, 8);

        // Untouched sections keep their defaults.
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.security.argon2_time_cost, 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.auth.session_ttl_hours = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.allowed_email_domain.clear();
        assert!(config.validate().is_err());
    }
}
