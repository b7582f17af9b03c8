//! Configured Discounts
//!
//! Builds a [`Discount`] from a merchant's JSON configuration metafield and
//! the cart, the way a discount function would propose it to the allocator:
//!
//! - [`ConfiguredKind::Volume`]: `{ "quantity": 3, "percentage": 10 }` takes
//!   a percentage off every line holding at least `quantity` units.
//! - [`ConfiguredKind::OrderSubtotal`]: `{ "minimumAmount": 100, "percentage": 5 }`
//!   takes a percentage off the whole order once its subtotal reaches
//!   `minimumAmount`.
//!
//! A missing metafield or a cart that does not qualify produces no discount.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    caps::Cap,
    cart::Cart,
    discounts::{Discount, DiscountProposal, DiscountValue},
    targets::Target,
};

/// Errors raised while reading a discount configuration.
#[derive(Debug, Error)]
pub enum ProposalError {
    /// The metafield is not valid configuration JSON
    #[error("invalid discount configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The configured percentage is not between 0 and 100
    #[error("discount percentage {0} is outside 0-100")]
    PercentageOutOfRange(Decimal),

    /// The cart subtotal did not fit in a decimal
    #[error("cart subtotal overflowed")]
    SubtotalOverflow,
}

/// Which configured discount a metafield describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ConfiguredKind {
    /// Percentage off lines bought in volume
    Volume,

    /// Percentage off the order above a minimum subtotal
    OrderSubtotal,
}

/// Volume discount settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeConfig {
    /// Minimum units on a line for it to qualify
    pub quantity: u32,

    /// Percentage off qualifying lines
    pub percentage: Decimal,
}

/// Order subtotal discount settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubtotalConfig {
    /// Subtotal the cart must reach
    pub minimum_amount: Decimal,

    /// Percentage off the order
    pub percentage: Decimal,
}

/// A parsed discount configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountConfig {
    /// Volume discount
    Volume(VolumeConfig),

    /// Order subtotal discount
    OrderSubtotal(OrderSubtotalConfig),
}

impl DiscountConfig {
    /// Parse the metafield value for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ProposalError::Config`] for malformed JSON and
    /// [`ProposalError::PercentageOutOfRange`] for a percentage outside 0-100.
    pub fn parse(kind: ConfiguredKind, metafield: &str) -> Result<Self, ProposalError> {
        let config = match kind {
            ConfiguredKind::Volume => DiscountConfig::Volume(serde_json::from_str(metafield)?),
            ConfiguredKind::OrderSubtotal => {
                DiscountConfig::OrderSubtotal(serde_json::from_str(metafield)?)
            }
        };

        let percentage = config.percentage();

        if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
            return Err(ProposalError::PercentageOutOfRange(percentage));
        }

        Ok(config)
    }

    /// Percentage points taken off.
    pub fn percentage(&self) -> Decimal {
        match self {
            DiscountConfig::Volume(config) => config.percentage,
            DiscountConfig::OrderSubtotal(config) => config.percentage,
        }
    }

    /// Build the discount this configuration proposes for `cart`.
    ///
    /// Every qualifying line is targeted at its full quantity by a single
    /// percentage proposal named `handle`. Returns `None` when no line qualifies.
    ///
    /// # Errors
    ///
    /// Returns [`ProposalError::SubtotalOverflow`] if the order subtotal overflows.
    pub fn build(
        &self,
        id: &str,
        handle: &str,
        cap: Cap,
        cart: &Cart,
    ) -> Result<Option<Discount>, ProposalError> {
        let targets: Vec<Target> = match self {
            DiscountConfig::Volume(config) => cart
                .lines()
                .iter()
                .filter(|line| line.quantity() >= config.quantity)
                .map(|line| Target::new(line.id(), line.quantity()))
                .collect(),
            DiscountConfig::OrderSubtotal(config) => {
                let subtotal = cart
                    .lines()
                    .iter()
                    .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.subtotal()?))
                    .ok_or(ProposalError::SubtotalOverflow)?;

                if subtotal < config.minimum_amount {
                    debug!(
                        discount_id = id,
                        %subtotal,
                        minimum = %config.minimum_amount,
                        "order subtotal below minimum"
                    );

                    return Ok(None);
                }

                cart.lines()
                    .iter()
                    .map(|line| Target::new(line.id(), line.quantity()))
                    .collect()
            }
        };

        if targets.is_empty() {
            debug!(discount_id = id, "no cart lines qualify");

            return Ok(None);
        }

        Ok(Some(Discount::new(
            id,
            cap,
            [DiscountProposal::new(
                handle,
                targets,
                DiscountValue::percentage(self.percentage()),
            )],
        )))
    }
}

/// Build a configured discount, treating a missing metafield as no discount.
///
/// # Errors
///
/// Returns a [`ProposalError`] if the metafield is invalid or the order
/// subtotal overflows.
pub fn configured_discount(
    kind: ConfiguredKind,
    id: &str,
    handle: &str,
    cap: Cap,
    metafield: Option<&str>,
    cart: &Cart,
) -> Result<Option<Discount>, ProposalError> {
    let Some(metafield) = metafield else {
        debug!(discount_id = id, "no configuration metafield");

        return Ok(None);
    };

    DiscountConfig::parse(kind, metafield)?.build(id, handle, cap, cart)
}
