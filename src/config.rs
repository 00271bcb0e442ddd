use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER: &str = "http://localhost:8000/rest_api/v1";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pdc")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    pub fn load_file() -> Config {
        Self::load_from(&Self::config_path())
    }

    /// Missing or unreadable files yield the default config.
    pub fn load_from(path: &Path) -> Config {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring malformed config file"
                );
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    pub fn save_file(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "server" => self.server = Some(value),
            "token" => self.token = Some(value),
            "format" => {
                crate::output::Format::parse(&value)?;
                self.format = Some(value);
            }
            _ => {
                return Err(CliError::InvalidInput(format!(
                    "Unknown config key: {key}. Valid keys: server, token, format"
                )));
            }
        }
        Ok(())
    }

    /// Resolve config with priority: CLI flags > env vars > config file
    pub fn resolve(
        flag_server: Option<&str>,
        flag_token: Option<&str>,
        flag_format: Option<&str>,
    ) -> ResolvedConfig {
        Self::load_file().resolve_over(flag_server, flag_token, flag_format)
    }

    fn resolve_over(
        self,
        flag_server: Option<&str>,
        flag_token: Option<&str>,
        flag_format: Option<&str>,
    ) -> ResolvedConfig {
        let server = flag_server
            .map(|s| s.to_string())
            .or_else(|| std::env::var("PDC_SERVER").ok())
            .or(self.server)
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());

        let token = flag_token
            .map(|s| s.to_string())
            .or_else(|| std::env::var("PDC_TOKEN").ok())
            .or(self.token)
            .filter(|t| !t.is_empty());

        let format = flag_format
            .map(|s| s.to_string())
            .or_else(|| std::env::var("PDC_FORMAT").ok())
            .or(self.format)
            .unwrap_or_else(|| "json".to_string());

        ResolvedConfig {
            server,
            token,
            format,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub server: String,
    pub token: Option<String>,
    pub format: String,
}

impl ResolvedConfig {
    pub fn masked_token(&self) -> Option<String> {
        self.token.as_ref().map(|t| {
            let chars = t.chars().count();
            if chars > 20 {
                let head: String = t.chars().take(10).collect();
                let tail: String = t.chars().skip(chars - 6).collect();
                format!("{head}...{tail}")
            } else {
                t.clone()
            }
        })
    }
}
