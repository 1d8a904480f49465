//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, path::Path, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// The variables a run cannot start without.
pub const REQUIRED_VARIABLES: [&str; 4] = ["DISCORD_BOT_TOKEN", "DISCORD_CHANNEL_ID", "RUN_PROJECT_ID", "RUN_REGION"];

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = ".hidden/config.toml";

/// Default host of the GCE metadata server.
fn default_gce_metadata_host() -> String {
    "metadata.google.internal".to_string()
}

/// Default Discord REST API base.
fn default_discord_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

/// Configuration for the motivation-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Discord bot token (`DISCORD_BOT_TOKEN`).
    #[serde(default)]
    pub discord_bot_token: String,
    /// Discord channel that receives the message (`DISCORD_CHANNEL_ID`).
    #[serde(default)]
    pub discord_channel_id: String,
    /// Google Cloud project that hosts the Vertex AI call (`RUN_PROJECT_ID`).
    #[serde(default)]
    pub run_project_id: String,
    /// Google Cloud region, or `global` (`RUN_REGION`).
    #[serde(default)]
    pub run_region: String,
    /// Pre-minted OAuth access token; skips the metadata server (`GOOGLE_CLOUD_ACCESS_TOKEN`).
    #[serde(default)]
    pub google_cloud_access_token: Option<String>,
    /// Metadata server host used to mint access tokens (`GCE_METADATA_HOST`).
    #[serde(default = "default_gce_metadata_host")]
    pub gce_metadata_host: String,
    /// Override for the Vertex AI models endpoint (`VERTEX_API_BASE`).
    #[serde(default)]
    pub vertex_api_base: Option<String>,
    /// Discord REST API base (`DISCORD_API_BASE`).
    #[serde(default = "default_discord_api_base")]
    pub discord_api_base: String,
}

impl Config {
    /// Load the configuration from the process environment, layered over a file.
    ///
    /// The file is `explicit_path` when given, otherwise `.hidden/config.toml`
    /// if it exists in the working directory.
    pub fn load(explicit_path: Option<&Path>) -> Res<Self> {
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        let path = explicit_path.or_else(|| default_path.exists().then_some(default_path));

        Self::load_from(path, None)
    }

    /// Load the configuration from exactly the given sources: the file at `path`
    /// (if any), overridden by `env` (or the process environment when `None`).
    ///
    /// No default file is discovered here.
    pub fn load_from(path: Option<&Path>, env: Option<config::Map<String, String>>) -> Res<Self> {
        let mut cfg = config::Config::builder();

        if let Some(p) = path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        }

        cfg = cfg.add_source(config::Environment::default().source(env));

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Fail when any required value is empty, naming all of them.
    pub fn validate(&self) -> Res<()> {
        let required = [&self.discord_bot_token, &self.discord_channel_id, &self.run_project_id, &self.run_region];

        if required.iter().any(|v| v.is_empty()) {
            return Err(anyhow::anyhow!("missing environment variables {}", REQUIRED_VARIABLES.join(", ")));
        }

        Ok(())
    }

    /// The access token, if one was supplied and is non-empty.
    pub fn access_token(&self) -> Option<&str> {
        self.google_cloud_access_token.as_deref().filter(|t| !t.is_empty())
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn full_env() -> config::Map<String, String> {
        config::Map::from([
            ("DISCORD_BOT_TOKEN".to_string(), "bot-token".to_string()),
            ("DISCORD_CHANNEL_ID".to_string(), "1234567890".to_string()),
            ("RUN_PROJECT_ID".to_string(), "my-project".to_string()),
            ("RUN_REGION".to_string(), "us-central1".to_string()),
        ])
    }

    #[test]
    fn loads_all_required_variables() {
        let config = Config::load_from(None, Some(full_env())).unwrap();

        assert_eq!(config.discord_bot_token, "bot-token");
        assert_eq!(config.discord_channel_id, "1234567890");
        assert_eq!(config.run_project_id, "my-project");
        assert_eq!(config.run_region, "us-central1");
        assert_eq!(config.gce_metadata_host, "metadata.google.internal");
        assert_eq!(config.discord_api_base, "https://discord.com/api/v10");
        assert!(config.vertex_api_base.is_none());
        assert!(config.access_token().is_none());
    }

    #[test]
    fn any_unset_variable_fails_naming_all_four() {
        for missing in REQUIRED_VARIABLES {
            let mut env = full_env();
            env.remove(missing);

            let err = Config::load_from(None, Some(env)).unwrap_err().to_string();

            assert_eq!(err, "missing environment variables DISCORD_BOT_TOKEN, DISCORD_CHANNEL_ID, RUN_PROJECT_ID, RUN_REGION");
        }
    }

    #[test]
    fn any_empty_variable_fails() {
        for missing in REQUIRED_VARIABLES {
            let mut env = full_env();
            env.insert(missing.to_string(), String::new());

            let err = Config::load_from(None, Some(env)).unwrap_err().to_string();

            for name in REQUIRED_VARIABLES {
                assert!(err.contains(name), "`{err}` should name {name}");
            }
        }
    }

    #[test]
    fn optional_overrides_are_read() {
        let mut env = full_env();
        env.insert("GOOGLE_CLOUD_ACCESS_TOKEN".to_string(), "ya29.token".to_string());
        env.insert("VERTEX_API_BASE".to_string(), "http://localhost:9000/models".to_string());
        env.insert("DISCORD_API_BASE".to_string(), "http://localhost:9001".to_string());

        let config = Config::load_from(None, Some(env)).unwrap();

        assert_eq!(config.access_token(), Some("ya29.token"));
        assert_eq!(config.vertex_api_base.as_deref(), Some("http://localhost:9000/models"));
        assert_eq!(config.discord_api_base, "http://localhost:9001");
    }

    #[test]
    fn file_values_are_overridden_by_env() {
        let path = std::env::temp_dir().join(format!("motivation-bot-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "discord_bot_token = \"file-token\"\ndiscord_channel_id = \"111\"\nrun_project_id = \"file-project\"\nrun_region = \"global\"\ndiscord_api_base = \"http://localhost:9001\"\n",
        )
        .unwrap();

        let env = config::Map::from([("DISCORD_CHANNEL_ID".to_string(), "222".to_string())]);
        let result = Config::load_from(Some(&path), Some(env));
        std::fs::remove_file(&path).unwrap();
        let config = result.unwrap();

        assert_eq!(config.discord_bot_token, "file-token");
        assert_eq!(config.discord_channel_id, "222");
        assert_eq!(config.run_project_id, "file-project");
        assert_eq!(config.run_region, "global");
        assert_eq!(config.discord_api_base, "http://localhost:9001");
    }

    #[test]
    fn injected_env_without_path_reads_no_file() {
        // Only the injected map counts, whatever sits in the working directory.
        let env = config::Map::from([("DISCORD_BOT_TOKEN".to_string(), "bot-token".to_string())]);

        let err = Config::load_from(None, Some(env)).unwrap_err().to_string();

        assert!(err.starts_with("missing environment variables"));
    }

    #[test]
    fn empty_access_token_counts_as_unset() {
        let mut env = full_env();
        env.insert("GOOGLE_CLOUD_ACCESS_TOKEN".to_string(), String::new());

        let config = Config::load_from(None, Some(env)).unwrap();

        assert!(config.access_token().is_none());
    }
}
