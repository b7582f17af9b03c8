//! Discount Allocator CLI
//!
//! Reads one input document (or a named fixture set), allocates its discounts
//! and writes the result to stdout.

use std::{
    fs,
    io::{self, Read, Write},
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use thiserror::Error;
use tracing::{error, info};

use discount_allocator::{
    allocation::{AllocationError, allocate},
    cart::Cart,
    discounts::Discount,
    fixtures::{Fixture, FixtureError},
    input::{FunctionInput, InputError},
    receipt::{AllocationReceipt, ReceiptError},
};

use crate::{
    config::{Config, InputFormat, OutputFormat},
    logging::{LoggingError, init_subscriber},
};

mod config;
mod logging;

/// Errors that end the CLI run.
#[derive(Debug, Error)]
enum CliError {
    /// Reading the input or writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input document is invalid.
    #[error(transparent)]
    Input(#[from] InputError),

    /// The fixture could not be loaded.
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// Allocation failed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// The receipt could not be rendered.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// The result could not be serialized.
    #[error("failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),

    /// Logging could not be initialised.
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Discount allocator entry point
fn main() -> ExitCode {
    let config = Config::parse();

    if let Err(err) = init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for logging errors"
        )]
        {
            eprintln!("{}", CliError::from(err));
        }

        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");

            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), CliError> {
    let (cart, discounts) = load(config)?;

    let start = Instant::now();
    let result = allocate(&cart, &discounts)?;

    info!(
        elapsed = %start.elapsed().human(Truncate::Nano),
        lines = result.line_discounts.len(),
        notices = result.displayable_errors.len(),
        "allocation complete"
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match config.output {
        OutputFormat::Json => serde_json::to_writer(&mut handle, &result)?,
        OutputFormat::Pretty => serde_json::to_writer_pretty(&mut handle, &result)?,
        OutputFormat::Receipt => AllocationReceipt::new(&cart, &result).write_to(&mut handle)?,
    }

    writeln!(handle)?;

    Ok(())
}

fn load(config: &Config) -> Result<(Cart, Vec<Discount>), CliError> {
    if let Some(name) = config.fixture.as_deref() {
        info!(fixture = name, "loading fixture set");

        return Ok(Fixture::from_set(name)?.into_parts());
    }

    let contents = match config.input.as_deref() {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let input = match config.resolved_input_format() {
        InputFormat::Json => FunctionInput::from_json(&contents)?,
        InputFormat::Yaml => FunctionInput::from_yaml(&contents)?,
    };

    Ok(input.into_parts()?)
}
