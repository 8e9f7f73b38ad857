//! Weather Shopper CLI library
//!
//! Argument parsing, logging setup and run summaries for the `shopper`
//! binary.

#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;

pub use commands::{BrowserArg, Cli, ColorArg, Commands, ConfigArgs, LogFormatArg, RunArgs};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{describe_session, Reporter};
