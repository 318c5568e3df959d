use super::app_config::LogLevel;
use crate::presentation::ReportFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "lazyimg",
    version,
    about = "Lazily load the images of a page as its viewport scrolls",
    long_about = None
)]
pub struct CliArgs {
    /// Page manifest describing the image elements and scroll script.
    #[arg(value_name = "PAGE")]
    pub page: PathBuf,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the effective configuration to the config file before loading
    /// the page.
    #[arg(long)]
    pub save_config: bool,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Scroll offsets to visit, overriding the manifest script.
    #[arg(long, value_delimiter = ',', value_name = "OFFSETS")]
    pub scroll: Option<Vec<u32>>,

    /// Simulate a runtime without intersection support.
    #[arg(long)]
    pub no_intersection: bool,

    /// Report output format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub report: ReportFormat,

    /// Placeholder source shown until the image loads.
    #[arg(long)]
    pub placeholder: Option<String>,

    /// Fallback source shown when loading fails.
    #[arg(long)]
    pub fallback: Option<String>,

    /// Request the alternate output format when decodable.
    #[arg(long)]
    pub use_format: Option<bool>,

    /// Default quality (1-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Default width, applied together with height.
    #[arg(long)]
    pub width: Option<u32>,

    /// Default height, applied together with width.
    #[arg(long)]
    pub height: Option<u32>,

    /// Delay in milliseconds before swapping in a loaded image.
    #[arg(long)]
    pub swap_delay_ms: Option<u64>,

    /// Base URL for relative sources.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}
