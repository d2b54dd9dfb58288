//! # quarry-config
//!
//! Layered configuration loading for Quarry using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`QUARRY_*` prefix, `__` as separator)
//! 2. Project-level `.quarry/config.toml`
//! 3. User-level `~/.config/quarry/config.toml`
//! 4. Built-in defaults
//!
//! `QUARRY_REASONING__MODEL` maps to `reasoning.model`,
//! `QUARRY_CACHE__ANSWER_TTL_SECS` to `cache.answer_ttl_secs`, and so on.
//!
//! ```no_run
//! use quarry_config::QuarryConfig;
//!
//! let config = QuarryConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! println!("model: {}", config.reasoning.model);
//! ```

mod access;
mod cache;
mod error;
mod lake;
mod reasoning;
mod routing;

pub use access::AccessConfig;
pub use cache::CacheConfig;
pub use error::ConfigError;
pub use lake::LakeConfig;
pub use reasoning::ReasoningConfig;
pub use routing::RoutingConfig;

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use quarry_core::role::canonicalize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuarryConfig {
    #[serde(default)]
    pub reasoning: ReasoningConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub lake: LakeConfig,
}

impl QuarryConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does NOT read `.env`; use [`Self::load_with_dotenv`] for that.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source fails to parse.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading the nearest `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source fails to parse.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".quarry/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("QUARRY_").split("__"))
    }

    /// Reject values the router cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("reasoning.classify_timeout_secs", self.reasoning.classify_timeout_secs),
            ("reasoning.generate_timeout_secs", self.reasoning.generate_timeout_secs),
            ("reasoning.answer_timeout_secs", self.reasoning.answer_timeout_secs),
            ("routing.execution_timeout_secs", self.routing.execution_timeout_secs),
            ("routing.search_timeout_secs", self.routing.search_timeout_secs),
            ("cache.classifier_capacity", self.cache.classifier_capacity),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(invalid(field, "must be greater than zero"));
        }

        let admin = canonicalize(&self.access.admin_role);
        let general = canonicalize(&self.access.general_role);
        if admin.is_empty() {
            return Err(invalid("access.admin_role", "must not be empty"));
        }
        if general.is_empty() {
            return Err(invalid("access.general_role", "must not be empty"));
        }
        if admin == general {
            return Err(invalid(
                "access.admin_role",
                "must differ from access.general_role",
            ));
        }
        if self.access.roles.iter().any(|r| canonicalize(r).is_empty()) {
            return Err(invalid("access.roles", "must not contain empty role names"));
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("quarry").join("config.toml"))
    }

    /// Walk up from `CARGO_MANIFEST_DIR` looking for `.env`, then fall back
    /// to the current directory. Missing files are ignored.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
