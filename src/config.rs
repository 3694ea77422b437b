// src/config.rs
//! Unified configuration management - everything arrives via environment
//! variables; demo/offline behavior is an explicit value here, never a
//! code path that disables auth.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub service: ServiceConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the AI insight collaborator. None disables remote
    /// insight generation; feeds fall back to heuristic text.
    pub insight_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Serve tagged sample feeds from an in-memory store instead of the
    /// live database. Auth still applies.
    pub offline_mode: bool,
    pub jwt_secret: String,
}

impl ConfigManager {
    /// Load all configurations
    pub fn load() -> Result<Self> {
        let environment = Self::load_environment()?;
        let service = Self::load_service();
        let runtime = Self::load_runtime()?;

        Ok(Self {
            environment,
            service,
            runtime,
        })
    }

    fn load_environment() -> Result<EnvironmentConfig> {
        let env = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());
        info!("Loading environment configuration for: {}", env);

        let base_dir = if env == "production" {
            PathBuf::from("/app")
        } else {
            std::env::current_dir().context("Failed to get current directory")?
        };

        Ok(EnvironmentConfig {
            database_path: base_dir.join("hirematch.db"),
        })
    }

    fn load_service() -> ServiceConfig {
        ServiceConfig {
            insight_url: std::env::var("INSIGHT_SERVICE_URL").ok(),
        }
    }

    fn load_runtime() -> Result<RuntimeConfig> {
        let offline_mode = std::env::var("HIREMATCH_OFFLINE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let jwt_secret = std::env::var("HIREMATCH_JWT_SECRET")
            .context("HIREMATCH_JWT_SECRET environment variable not set")?;

        Ok(RuntimeConfig {
            offline_mode,
            jwt_secret,
        })
    }
}
