//! Configuration for a feed snapshot run.
//!
//! Every field has a fixed default, so a run with no config file fetches the
//! Zenn feed and writes `assets/data/zenn-feed.json`. A TOML file named with
//! `--config` can override any subset of keys. Unknown keys are accepted but
//! logged. A named file that does not exist is an error, never the defaults.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::feed::ParseOptions;
use crate::output::OutputVariant;

/// Feed fetched when no override is configured.
pub const DEFAULT_FEED_URL: &str = "http://zenn.dev/urakawa_jinsei/feed?all=1";

/// Proxy that mirrors an arbitrary URL through a different origin.
pub const PROXY_BASE: &str = "https://r.jina.ai";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Immutable settings handed to the pipeline.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Primary feed URL.
    pub feed_url: String,

    /// Fallback URL tried when the primary fails.
    /// `None` means `{PROXY_BASE}/{feed_url}`.
    pub proxy_url: Option<String>,

    /// Where the JSON snapshot is written. Relative paths resolve against the
    /// working directory.
    pub output_path: PathBuf,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    pub user_agent: String,

    pub accept: String,

    /// Record shape written to the snapshot.
    pub variant: OutputVariant,

    /// Origin stripped from article URLs to derive `path` (path variant only).
    pub site_origin: String,

    /// Category used when an entry carries no tags.
    pub default_category: String,

    /// Constant `emoji` field of the path variant.
    pub placeholder_emoji: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            proxy_url: None,
            output_path: PathBuf::from("assets").join("data").join("zenn-feed.json"),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (compatible; GitHubAction/1.0; +https://github.com/)"
                .to_string(),
            accept: "application/atom+xml, application/xml, text/xml; charset=utf-8".to_string(),
            variant: OutputVariant::Tagged,
            site_origin: "https://zenn.dev".to_string(),
            default_category: "その他".to_string(),
            placeholder_emoji: "📝".to_string(),
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 10] = [
        "feed_url",
        "proxy_url",
        "output_path",
        "timeout_secs",
        "user_agent",
        "accept",
        "variant",
        "site_origin",
        "default_category",
        "placeholder_emoji",
    ];

    /// Load configuration from a TOML file the user named explicitly.
    ///
    /// - Missing file → `Err(ConfigError::Io)` (NotFound)
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            feed_url = %config.feed_url,
            variant = ?config.variant,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// URLs to try, in order: the primary feed, then the proxy mirror.
    pub fn sources(&self) -> Vec<String> {
        let fallback = match &self.proxy_url {
            Some(url) => url.clone(),
            None => format!("{}/{}", PROXY_BASE, self.feed_url),
        };
        vec![self.feed_url.clone(), fallback]
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            default_category: self.default_category.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
