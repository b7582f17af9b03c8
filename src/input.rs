//! Function Input
//!
//! Wire format handed over by the host for one cart evaluation. Everything is
//! converted to core types here: cap metafields are parsed, percentages are
//! scaled, and decimal fields arriving as JSON numbers become [`Decimal`]s
//! once and only once.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::{
    caps::Cap,
    cart::{Cart, CartLine, currency_from_code},
    discounts::{Discount, DiscountProposal, DiscountValue},
    proposals::{ConfiguredKind, ProposalError, configured_discount},
    targets::Target,
};

/// Errors raised while reading function input.
#[derive(Debug, Error)]
pub enum InputError {
    /// JSON parsing error
    #[error("failed to parse JSON input: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("failed to parse YAML input: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A cart line has a negative unit price
    #[error("cart line {line_id:?} has a negative price per unit")]
    NegativePrice {
        /// Identifier of the offending line
        line_id: String,
    },

    /// A configured discount could not be built
    #[error(transparent)]
    Configuration(#[from] ProposalError),
}

/// Top-level input document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInput {
    /// Cart being evaluated
    pub cart: CartInput,

    /// Discounts to allocate, in processing order
    #[serde(default)]
    pub discounts: Vec<DiscountInput>,

    /// Discounts built from configuration metafields, processed after `discounts`
    #[serde(default)]
    pub configured_discounts: Vec<ConfiguredDiscountInput>,
}

/// Cart section of the input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartInput {
    /// ISO currency code, only used for presentation
    #[serde(default)]
    pub currency_code: Option<String>,

    /// Cart-wide cap metafield value
    #[serde(default)]
    pub cart_wide_cap: Option<String>,

    /// Cart lines
    #[serde(default)]
    pub lines: Vec<CartLineInput>,
}

/// A cart line as supplied by the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Line identifier
    pub id: String,

    /// Units on the line
    pub quantity: u32,

    /// Price of one unit
    pub price_per_unit: Decimal,
}

/// A discount as supplied by the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountInput {
    /// Discount identifier
    pub id: String,

    /// Discount cap metafield value
    #[serde(default)]
    pub cap: Option<String>,

    /// Proposals in processing order
    #[serde(default)]
    pub proposals: Vec<ProposalInput>,
}

/// A discount described by a configuration metafield.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguredDiscountInput {
    /// Discount identifier
    pub id: String,

    /// Handle of the proposal the configuration produces
    pub handle: String,

    /// Kind of configuration in the metafield
    pub kind: ConfiguredKind,

    /// Discount cap metafield value
    #[serde(default)]
    pub cap: Option<String>,

    /// Raw JSON configuration metafield
    #[serde(default)]
    pub metafield: Option<String>,
}

/// A discount proposal as supplied by the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalInput {
    /// Proposal handle
    pub handle: String,

    /// Targeted lines
    pub targets: Vec<TargetInput>,

    /// Proposal value
    pub value: ValueInput,
}

/// A proposal target as supplied by the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInput {
    /// Identifier of the targeted cart line
    pub line_ref: String,

    /// Quantity targeted
    pub quantity: u32,
}

/// Proposal value, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ValueInput {
    /// Fixed amount off
    #[serde(rename_all = "camelCase")]
    FixedAmount {
        /// Amount of money off
        amount: Decimal,

        /// Whether the amount applies to each targeted unit
        #[serde(default)]
        applies_to_each_item: bool,
    },

    /// Percentage off, 0-100
    Percentage {
        /// Percentage points
        value: Decimal,
    },
}

impl FunctionInput {
    /// Parse a JSON input document.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Json`] if the document is not valid input JSON.
    pub fn from_json(s: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse a YAML input document.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Yaml`] if the document is not valid input YAML.
    pub fn from_yaml(s: &str) -> Result<Self, InputError> {
        Ok(serde_norway::from_str(s)?)
    }

    /// Convert into the cart and discounts the allocation runs on.
    ///
    /// # Errors
    ///
    /// - [`InputError::UnknownCurrency`]: the cart currency code is not supported.
    /// - [`InputError::NegativePrice`]: a cart line has a negative unit price.
    /// - [`InputError::Configuration`]: a configured discount's metafield is invalid.
    pub fn into_parts(self) -> Result<(Cart, Vec<Discount>), InputError> {
        let cart: Cart = self.cart.try_into()?;
        let mut discounts: Vec<Discount> =
            self.discounts.into_iter().map(Discount::from).collect();

        for configured in self.configured_discounts {
            let discount = configured_discount(
                configured.kind,
                &configured.id,
                &configured.handle,
                parse_cap(configured.cap.as_deref()),
                configured.metafield.as_deref(),
                &cart,
            )?;

            discounts.extend(discount);
        }

        Ok((cart, discounts))
    }
}

impl TryFrom<CartInput> for Cart {
    type Error = InputError;

    fn try_from(input: CartInput) -> Result<Self, Self::Error> {
        let lines = input
            .lines
            .into_iter()
            .map(|line| {
                if line.price_per_unit < Decimal::ZERO {
                    return Err(InputError::NegativePrice { line_id: line.id });
                }

                Ok(CartLine::new(line.id, line.quantity, line.price_per_unit))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cart = Cart::with_lines(lines, parse_cap(input.cart_wide_cap.as_deref()));

        match input.currency_code {
            Some(code) => {
                let currency =
                    currency_from_code(&code).ok_or(InputError::UnknownCurrency(code))?;

                Ok(cart.with_currency(currency))
            }
            None => Ok(cart),
        }
    }
}

impl From<DiscountInput> for Discount {
    fn from(input: DiscountInput) -> Self {
        let cap = parse_cap(input.cap.as_deref());
        let proposals: Vec<DiscountProposal> =
            input.proposals.into_iter().map(DiscountProposal::from).collect();

        Discount::new(input.id, cap, proposals)
    }
}

impl From<ProposalInput> for DiscountProposal {
    fn from(input: ProposalInput) -> Self {
        let targets: Vec<Target> = input
            .targets
            .into_iter()
            .map(|target| Target::new(target.line_ref, target.quantity))
            .collect();

        DiscountProposal::new(input.handle, targets, input.value.into())
    }
}

impl From<ValueInput> for DiscountValue {
    fn from(input: ValueInput) -> Self {
        match input {
            ValueInput::FixedAmount {
                amount,
                applies_to_each_item,
            } => DiscountValue::FixedAmount {
                amount,
                applies_to_each_item,
            },
            ValueInput::Percentage { value } => DiscountValue::percentage(value),
        }
    }
}

/// Parse a cap metafield value.
///
/// Absent values mean uncapped, as do values that parse to a negative number.
/// Values that cannot be parsed at all are logged and treated as uncapped.
pub fn parse_cap(value: Option<&str>) -> Cap {
    let Some(raw) = value else {
        return Cap::Uncapped;
    };

    let trimmed = raw.trim();

    match trimmed
        .parse::<Decimal>()
        .or_else(|_err| Decimal::from_scientific(trimmed))
    {
        Ok(parsed) => Cap::from_decimal(parsed),
        Err(err) => {
            warn!(value = raw, %err, "ignoring unparsable cap metafield");

            Cap::Uncapped
        }
    }
}
