//! Allocation Engine
//!
//! Walks discounts, then proposals, then targets, each in input order. Every
//! target gets its raw discount (by value type), which is clamped by the
//! [`CapTracker`] and recorded against the target's cart line. Earlier entries
//! are satisfied first, so later ones absorb any clamping.

use rust_decimal::Decimal;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, info_span, trace};

use crate::{
    caps::{CapError, CapTracker},
    cart::Cart,
    discounts::{Discount, DiscountProposal},
    notices::ErrorCollector,
    output::{Allocation, AllocationResult},
    targets::{ResolvedTarget, TargetError, TargetResolver},
};

/// Errors that abort an allocation run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// Wrapped target resolution error.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// Wrapped cap tracking error.
    #[error(transparent)]
    Cap(#[from] CapError),

    /// Decimal arithmetic overflowed.
    #[error("decimal arithmetic overflowed while calculating the {stage}")]
    ArithmeticOverflow {
        /// What was being calculated
        stage: &'static str,
    },
}

/// Allocates discounts across the lines of a single cart.
#[derive(Debug)]
pub struct AllocationEngine<'a> {
    cart: &'a Cart,
    resolver: TargetResolver<'a>,
}

/// Mutable state owned by one run.
#[derive(Debug)]
struct RunState {
    tracker: CapTracker,
    notices: ErrorCollector,
    allocations: Vec<Vec<Allocation>>,
}

impl<'a> AllocationEngine<'a> {
    /// Create an engine for `cart`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::Target`] if the cart has duplicate line identifiers.
    pub fn new(cart: &'a Cart) -> Result<Self, AllocationError> {
        Ok(Self {
            cart,
            resolver: TargetResolver::new(cart)?,
        })
    }

    /// Allocate `discounts` across the cart.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocationError`] if a target cannot be resolved or a
    /// calculation overflows. No partial result is produced.
    pub fn run(&self, discounts: &[Discount]) -> Result<AllocationResult, AllocationError> {
        let _span = info_span!(
            "allocate",
            lines = self.cart.len(),
            discounts = discounts.len()
        )
        .entered();

        let mut state = RunState {
            tracker: CapTracker::new(),
            notices: ErrorCollector::new(),
            allocations: vec![Vec::new(); self.cart.len()],
        };

        for discount in discounts {
            state.tracker.start_discount();

            for proposal in discount.proposals() {
                self.allocate_proposal(discount, proposal, &mut state)?;
            }
        }

        debug!(
            total = %state.tracker.cart_total(),
            notices = state.notices.len(),
            "allocation finished"
        );

        Ok(AllocationResult::assemble(
            self.cart,
            state.allocations,
            state.notices.into_errors(),
        ))
    }

    fn allocate_proposal(
        &self,
        discount: &Discount,
        proposal: &DiscountProposal,
        state: &mut RunState,
    ) -> Result<(), AllocationError> {
        let targets = proposal
            .targets()
            .iter()
            .map(|target| self.resolver.resolve(target))
            .collect::<Result<SmallVec<[ResolvedTarget<'a>; 8]>, _>>()?;

        let total_price = targets
            .iter()
            .try_fold(Decimal::ZERO, |acc, target| acc.checked_add(target.price()))
            .ok_or(AllocationError::ArithmeticOverflow {
                stage: "proposal total price",
            })?;

        if total_price.is_zero() {
            debug!(
                discount_id = discount.id(),
                proposal = proposal.handle(),
                "skipping proposal with zero total price"
            );

            return Ok(());
        }

        for target in &targets {
            let ratio = target
                .price()
                .checked_div(total_price)
                .ok_or(AllocationError::ArithmeticOverflow {
                    stage: "target ratio",
                })?;

            let raw = proposal.value().raw_amount(target, ratio).ok_or(
                AllocationError::ArithmeticOverflow {
                    stage: "raw discount amount",
                },
            )?;

            let outcome = state.tracker.apply(raw, discount.cap(), self.cart.cap())?;

            for reason in outcome.reasons {
                debug!(
                    discount_id = discount.id(),
                    proposal = proposal.handle(),
                    line_id = target.line().id(),
                    %raw,
                    clamped = ?outcome.amount,
                    ?reason,
                    "discount clamped by cap"
                );

                state.notices.record(discount.id(), reason);
            }

            let Some(amount) = outcome.amount else {
                continue;
            };

            trace!(
                proposal = proposal.handle(),
                line_id = target.line().id(),
                %amount,
                "allocated"
            );

            state
                .allocations
                .get_mut(target.line_idx())
                .ok_or_else(|| TargetError::UnresolvableTarget {
                    line_ref: target.line().id().to_string(),
                })?
                .push(Allocation::new(proposal.handle(), amount));
        }

        Ok(())
    }
}

/// Allocate `discounts` across `cart`.
///
/// # Errors
///
/// Returns an [`AllocationError`] if the cart or discounts violate the input
/// contract (duplicate lines, unknown target lines) or a calculation overflows.
pub fn allocate(cart: &Cart, discounts: &[Discount]) -> Result<AllocationResult, AllocationError> {
    AllocationEngine::new(cart)?.run(discounts)
}
