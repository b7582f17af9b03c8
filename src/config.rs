//! CLI configuration

use std::path::{Path, PathBuf};

use clap::{Args, Parser, ValueEnum};

/// Input document format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum InputFormat {
    /// JSON input
    Json,

    /// YAML input
    Yaml,
}

/// What to write to stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Compact JSON
    Json,

    /// Indented JSON
    Pretty,

    /// Human-readable allocation table
    Receipt,
}

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), overridden by `RUST_LOG`
    #[arg(short, long, env = "ALLOCATOR_LOG_LEVEL", default_value = "warn")]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,
}

/// Discount allocator configuration
#[derive(Debug, Parser)]
#[command(
    name = "discount-allocator",
    about = "Allocate cart discounts across lines under per-discount and cart-wide caps",
    long_about = None
)]
pub(crate) struct Config {
    /// Input document; read from stdin when omitted
    #[arg(short, long, env = "ALLOCATOR_INPUT", conflicts_with = "fixture")]
    pub(crate) input: Option<PathBuf>,

    /// Input format; inferred from the file extension when omitted
    #[arg(long, env = "ALLOCATOR_INPUT_FORMAT", value_enum)]
    pub(crate) input_format: Option<InputFormat>,

    /// Named fixture set to load from `./fixtures` instead of an input document
    #[arg(short, long, env = "ALLOCATOR_FIXTURE")]
    pub(crate) fixture: Option<String>,

    /// Output format
    #[arg(short, long, env = "ALLOCATOR_OUTPUT", value_enum, default_value_t = OutputFormat::Json)]
    pub(crate) output: OutputFormat,

    /// Logging output settings.
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,
}

impl Config {
    /// Format of the input document, from the flag or the file extension.
    pub(crate) fn resolved_input_format(&self) -> InputFormat {
        self.input_format.unwrap_or_else(|| {
            self.input
                .as_deref()
                .map_or(InputFormat::Json, format_from_extension)
        })
    }
}

fn format_from_extension(path: &Path) -> InputFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yml" | "yaml") => InputFormat::Yaml,
        _ => InputFormat::Json,
    }
}
