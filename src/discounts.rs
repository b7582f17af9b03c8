//! Discounts

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::{
    caps::Cap,
    targets::{ResolvedTarget, Target},
};

/// How much a proposal takes off its targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiscountValue {
    /// A fixed amount of money.
    FixedAmount {
        /// Amount of money off
        amount: Decimal,

        /// Take `amount` off every targeted unit instead of splitting it across targets
        applies_to_each_item: bool,
    },

    /// A percentage of the targeted price.
    Percentage(Percentage),
}

impl DiscountValue {
    /// Fixed amount split across the proposal's targets by price.
    pub fn fixed_amount(amount: Decimal) -> Self {
        DiscountValue::FixedAmount {
            amount,
            applies_to_each_item: false,
        }
    }

    /// Fixed amount taken off every targeted unit.
    pub fn fixed_amount_each(amount: Decimal) -> Self {
        DiscountValue::FixedAmount {
            amount,
            applies_to_each_item: true,
        }
    }

    /// Percentage given on a 0-100 scale (e.g. `20` for 20% off).
    pub fn percentage(points: Decimal) -> Self {
        DiscountValue::Percentage(Percentage::from(points / Decimal::ONE_HUNDRED))
    }

    /// Calculate the uncapped discount for one target.
    ///
    /// `ratio` is the target's share of the proposal's total price. Returns
    /// `None` if the calculation overflows.
    pub fn raw_amount(&self, target: &ResolvedTarget<'_>, ratio: Decimal) -> Option<Decimal> {
        match *self {
            DiscountValue::FixedAmount {
                amount,
                applies_to_each_item: true,
            } => amount.checked_mul(Decimal::from(target.quantity())),
            DiscountValue::FixedAmount {
                amount,
                applies_to_each_item: false,
            } => amount.checked_mul(ratio),
            // (p / 100) * proposal total * ratio is the target's own price times p / 100.
            DiscountValue::Percentage(percent) => {
                (percent * Decimal::ONE).checked_mul(target.price())
            }
        }
    }
}

/// One discount rule: a value applied to a set of targets.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountProposal {
    handle: String,
    targets: Vec<Target>,
    value: DiscountValue,
}

impl DiscountProposal {
    /// Create a new proposal.
    pub fn new(
        handle: impl Into<String>,
        targets: impl Into<Vec<Target>>,
        value: DiscountValue,
    ) -> Self {
        Self {
            handle: handle.into(),
            targets: targets.into(),
            value,
        }
    }

    /// Handle used to key allocations made for this proposal.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Targets in input order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Value of the proposal.
    pub fn value(&self) -> DiscountValue {
        self.value
    }
}

/// A discount with its own cap and one or more proposals.
#[derive(Debug, Clone, PartialEq)]
pub struct Discount {
    id: String,
    cap: Cap,
    proposals: Vec<DiscountProposal>,
}

impl Discount {
    /// Create a new discount.
    pub fn new(
        id: impl Into<String>,
        cap: Cap,
        proposals: impl Into<Vec<DiscountProposal>>,
    ) -> Self {
        Self {
            id: id.into(),
            cap,
            proposals: proposals.into(),
        }
    }

    /// Discount identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Cap on the total this discount may allocate.
    pub fn cap(&self) -> Cap {
        self.cap
    }

    /// Proposals in input order.
    pub fn proposals(&self) -> &[DiscountProposal] {
        &self.proposals
    }
}
