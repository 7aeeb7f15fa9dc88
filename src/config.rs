use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::error::{FolderError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Locale {
    #[default]
    En,
    Es,
}

/// Connection and display settings shared by both front ends.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Backend base URL
    #[arg(long, env = "RECFOLDERS_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Bearer token sent with every request
    #[arg(long, env = "RECFOLDERS_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "RECFOLDERS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Language for messages and prompts
    #[arg(long, env = "RECFOLDERS_LOCALE", value_enum, default_value_t = Locale::En, global = true)]
    pub locale: Locale,

    /// Directory for log files (terminal UI only)
    #[arg(long, env = "RECFOLDERS_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            locale: Locale::En,
            log_dir: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FolderError::Config(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(FolderError::Config("timeout must be at least one second".to_string()));
        }
        Ok(())
    }
}
