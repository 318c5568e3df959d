//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::entities::LazyConfig;

pub(super) const APP_NAME: &str = "lazyimg";
pub(super) const APP_QUALIFIER: &str = "com";
pub(super) const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Lazy loading defaults shared by every element.
    #[serde(default)]
    pub lazy: LazyConfig,

    /// URL transformation syntax.
    #[serde(default)]
    pub transform: TransformConfig,

    /// Image fetching.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Query parameter names and host filter for URL transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Parameter carrying the output format.
    #[serde(default = "default_format_param")]
    pub format_param: String,

    /// Parameter carrying the quality.
    #[serde(default = "default_quality_param")]
    pub quality_param: String,

    /// Parameter carrying the width.
    #[serde(default = "default_width_param")]
    pub width_param: String,

    /// Parameter carrying the height.
    #[serde(default = "default_height_param")]
    pub height_param: String,

    /// Hosts whose URLs are transformed. Empty transforms every URL.
    #[serde(default)]
    pub hosts: Vec<String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            format_param: default_format_param(),
            quality_param: default_quality_param(),
            width_param: default_width_param(),
            height_param: default_height_param(),
            hosts: Vec::new(),
        }
    }
}

/// Image fetch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base URL that relative sources are resolved against.
    /// Without one, relative sources are read from disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_format_param() -> String {
    "format".to_string()
}

fn default_quality_param() -> String {
    "quality".to_string()
}

fn default_width_param() -> String {
    "width".to_string()
}

fn default_height_param() -> String {
    "height".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("{APP_NAME}/{}", env!("CARGO_PKG_VERSION"))
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(placeholder) = &args.placeholder {
            self.lazy.placeholder = Some(placeholder.clone());
        }
        if let Some(fallback) = &args.fallback {
            self.lazy.fallback = Some(fallback.clone());
        }
        if let Some(use_format) = args.use_format {
            self.lazy.use_format = use_format;
        }
        if let Some(quality) = args.quality {
            self.lazy.quality = Some(quality);
        }
        if let Some(width) = args.width {
            self.lazy.width = Some(width);
        }
        if let Some(height) = args.height {
            self.lazy.height = Some(height);
        }
        if let Some(swap_delay_ms) = args.swap_delay_ms {
            self.lazy.swap_delay_ms = swap_delay_ms;
        }
        if let Some(base_url) = &args.base_url {
            self.fetch.base_url = Some(base_url.clone());
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.fetch.timeout_secs = timeout_secs;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("lazyimg.log"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OutputFormat;
    use clap::Parser;

    #[test]
    fn test_parse_config_sections() {
        let toml_content = r#"
            log_level = "debug"

            [lazy]
            placeholder = "img/loading.gif"
            use_format = true
            format = "webp"
            quality = 80
            width = 640
            height = 480
            fallback = "img/broken.png"
            swap_delay_ms = 150

            [transform]
            quality_param = "imquality"
            hosts = ["cdn.example.com"]

            [fetch]
            base_url = "https://cdn.example.com"
            timeout_secs = 5
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.lazy.placeholder(), Some("img/loading.gif"));
        assert!(config.lazy.use_format);
        assert_eq!(config.lazy.format, OutputFormat::WebP);
        assert_eq!(config.lazy.quality, Some(80));
        assert_eq!(config.lazy.width, Some(640));
        assert_eq!(config.lazy.height, Some(480));
        assert_eq!(config.lazy.fallback(), Some("img/broken.png"));
        assert_eq!(config.lazy.swap_delay_ms, 150);
        assert_eq!(config.transform.quality_param, "imquality");
        assert_eq!(config.transform.format_param, "format");
        assert_eq!(config.transform.hosts, vec!["cdn.example.com".to_string()]);
        assert_eq!(
            config.fetch.base_url.as_deref(),
            Some("https://cdn.example.com")
        );
        assert_eq!(config.fetch.timeout_secs, 5);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.lazy, LazyConfig::default());
        assert_eq!(config.transform.width_param, "width");
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(config.fetch.user_agent.starts_with("lazyimg/"));
    }

    #[test]
    fn test_merge_with_args_overrides_file_values() {
        let mut config: AppConfig = toml::from_str(
            r#"
            [lazy]
            quality = 80
            swap_delay_ms = 500
            "#,
        )
        .unwrap();

        let args = CliArgs::parse_from([
            "lazyimg",
            "page.toml",
            "--quality",
            "60",
            "--placeholder",
            "img/loading.gif",
            "--use-format",
            "true",
        ]);
        config.merge_with_args(&args);

        assert_eq!(config.lazy.quality, Some(60));
        assert_eq!(config.lazy.swap_delay_ms, 500);
        assert_eq!(config.lazy.placeholder(), Some("img/loading.gif"));
        assert!(config.lazy.use_format);
    }

    #[test]
    fn test_save_config_flag() {
        let args = CliArgs::parse_from(["lazyimg", "page.toml"]);
        assert!(!args.save_config);

        let args = CliArgs::parse_from(["lazyimg", "--save-config", "-c", "custom.toml", "page.toml"]);
        assert!(args.save_config);
        assert_eq!(args.config.as_deref(), Some(std::path::Path::new("custom.toml")));
    }
}
