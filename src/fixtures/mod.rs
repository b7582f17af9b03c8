//! Fixtures
//!
//! Named input documents stored as YAML under `./fixtures`, used by the
//! conformance tests and the CLI.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    allocation::{AllocationError, allocate},
    cart::Cart,
    discounts::Discount,
    input::{FunctionInput, InputError},
    output::AllocationResult,
};

/// Fixture Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("failed to read fixture file {path}: {source}")]
    Io {
        /// Path that could not be read
        path: PathBuf,

        /// Underlying IO error
        source: std::io::Error,
    },

    /// Fixture contents are not valid input
    #[error(transparent)]
    Input(#[from] InputError),

    /// Allocation failed for the fixture
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// A cart and its discounts loaded from a fixture file.
#[derive(Debug, Clone)]
pub struct Fixture {
    cart: Cart,
    discounts: Vec<Discount>,
}

impl Fixture {
    /// Default directory fixture sets are loaded from.
    pub const BASE_PATH: &'static str = "./fixtures";

    /// Load the named fixture set from [`Fixture::BASE_PATH`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid input.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in(Self::BASE_PATH, name)
    }

    /// Load the named fixture set from `base_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid input.
    pub fn from_set_in(base_path: impl AsRef<Path>, name: &str) -> Result<Self, FixtureError> {
        Self::from_path(base_path.as_ref().join(format!("{name}.yml")))
    }

    /// Load a fixture from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid input.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let (cart, discounts) = FunctionInput::from_yaml(&contents)?.into_parts()?;

        Ok(Self { cart, discounts })
    }

    /// The fixture's cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The fixture's discounts, in processing order.
    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }

    /// Allocate the fixture's discounts across its cart.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Allocation`] if allocation fails.
    pub fn run(&self) -> Result<AllocationResult, FixtureError> {
        Ok(allocate(&self.cart, &self.discounts)?)
    }

    /// Split the fixture into its cart and discounts.
    pub fn into_parts(self) -> (Cart, Vec<Discount>) {
        (self.cart, self.discounts)
    }
}
