use std::env;

use anyhow::Context;
use config::{Config, Environment, File};
use dotenvy::dotenv;
use hub_common::DatabaseSettings;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_port: String,
    pub database: DatabaseSettings,
    pub moderation: ModerationSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModerationSettings {
    /// Bearer token that grants the moderator role
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSettings {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: i64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_recent_limit() -> i64 {
    10
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        let run_mode = load_env("RUN_MODE", DEVELOPMENT_MODE);

        let s = Config::builder()
            .add_source(File::with_name("./config/default"))
            .add_source(File::with_name(&format!("./config/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("app").prefix_separator("_").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize().with_context(|| "failed to read config")?;
        settings.moderation.check_token(&run_mode)?;
        Ok(settings)
    }
}

/// Token shipped in `config/default.yaml`, only usable in development
const SHIPPED_TOKEN: &str = "change-me";
const DEVELOPMENT_MODE: &str = "development";

impl ModerationSettings {
    fn check_token(&self, run_mode: &str) -> anyhow::Result<()> {
        let token = self.token.trim();
        if token.is_empty() {
            anyhow::bail!("moderation.token must not be empty");
        }
        if token == SHIPPED_TOKEN {
            if run_mode != DEVELOPMENT_MODE {
                anyhow::bail!(
                    "moderation.token still has its default value, set APP_MODERATION__TOKEN"
                );
            }
            tracing::warn!("moderation.token has its default value");
        }
        Ok(())
    }
}

fn load_env(key: &str, default_value: &'static str) -> String {
    env::var(key).unwrap_or_else(|_| default_value.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moderation(token: &str) -> ModerationSettings {
        ModerationSettings {
            token: token.to_string(),
        }
    }

    #[test]
    fn blank_token_is_refused() {
        assert!(moderation("  ").check_token("development").is_err());
    }

    #[test]
    fn shipped_token_only_passes_in_development() {
        assert!(moderation("change-me").check_token("development").is_ok());
        assert!(moderation("change-me").check_token("production").is_err());
    }

    #[test]
    fn configured_token_passes_everywhere() {
        assert!(moderation("s3cr3t-moderator").check_token("production").is_ok());
    }
}
