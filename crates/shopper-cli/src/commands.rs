//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Weather Shopper: buy by the weather, check the cart, pay with a test card
#[derive(Parser, Debug)]
#[command(name = "shopper")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log file format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the purchase workflow
    Run(RunArgs),

    /// Show or check configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// YAML configuration file
    #[arg(short, long, env = "SHOPPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the site base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Browser engine
    #[arg(long)]
    pub browser: Option<BrowserArg>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Number of independent concurrent runs
    #[arg(short = 'n', long, default_value = "1", value_parser = clap::value_parser!(u16).range(1..))]
    pub runs: u16,

    /// Directory for failure screenshots and DOM dumps
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// Print reports as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Write the JSON reports to a file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Drive the built-in simulated store instead of a browser
    #[arg(long)]
    pub simulate: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show the effective configuration as YAML
    #[arg(long)]
    pub show: bool,

    /// Validate a configuration file
    #[arg(long)]
    pub check: Option<PathBuf>,

    /// Configuration file to show
    #[arg(short, long, env = "SHOPPER_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Browser engine argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserArg {
    /// Chromium over CDP
    Chromium,
    /// Firefox (not available)
    Firefox,
    /// WebKit (not available)
    Webkit,
}

impl BrowserArg {
    /// Engine name as written in configuration
    #[must_use]
    pub const fn engine(self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Webkit => "webkit",
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormatArg {
    /// Plain text lines
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}
