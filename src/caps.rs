//! Spending Caps
//!
//! A [`Cap`] bounds the money a single discount, or the cart as a whole, may
//! hand out. The [`CapTracker`] keeps the running totals for one invocation
//! and clamps each raw discount amount against both caps, discount cap first.

use rust_decimal::Decimal;
use smallvec::SmallVec;
use thiserror::Error;

use crate::notices::CapReason;

/// Errors raised while tracking running cap totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CapError {
    /// Adding an amount to a running total overflowed the decimal range.
    #[error("running discount total overflowed")]
    TotalOverflow,
}

/// Maximum amount of discount that may be allocated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cap {
    /// No limit.
    #[default]
    Uncapped,

    /// At most this much may be allocated.
    Limit(Decimal),
}

impl Cap {
    /// Build a cap from a decimal where any negative value means uncapped.
    pub fn from_decimal(value: Decimal) -> Self {
        if value < Decimal::ZERO {
            Cap::Uncapped
        } else {
            Cap::Limit(value)
        }
    }

    /// The limit, if there is one.
    pub fn limit(self) -> Option<Decimal> {
        match self {
            Cap::Uncapped => None,
            Cap::Limit(limit) => Some(limit),
        }
    }

    /// Amount still available under this cap given what has been allocated so far.
    ///
    /// Returns `None` for [`Cap::Uncapped`]. Never negative.
    pub fn headroom(self, allocated: Decimal) -> Option<Decimal> {
        self.limit()
            .map(|limit| limit.checked_sub(allocated).unwrap_or(Decimal::ZERO))
            .map(|remaining| remaining.max(Decimal::ZERO))
    }
}

/// Result of passing a raw amount through the caps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapOutcome {
    /// Amount to allocate, `None` when nothing is left after clamping.
    pub amount: Option<Decimal>,

    /// Caps that clamped the amount, in the order they were applied.
    pub reasons: SmallVec<[CapReason; 2]>,
}

/// Running totals for the cart-wide cap and the current discount's cap.
#[derive(Debug, Default)]
pub struct CapTracker {
    cart_total: Decimal,
    discount_total: Decimal,
}

impl CapTracker {
    /// Create a tracker with nothing allocated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the per-discount total before processing the next discount.
    pub fn start_discount(&mut self) {
        self.discount_total = Decimal::ZERO;
    }

    /// Total allocated across every discount so far.
    pub fn cart_total(&self) -> Decimal {
        self.cart_total
    }

    /// Total allocated by the current discount so far.
    pub fn discount_total(&self) -> Decimal {
        self.discount_total
    }

    /// Clamp `raw` against the discount cap, then the cart cap, and record what is left.
    ///
    /// A result that is zero or negative is reported as "no allocation" and
    /// leaves the running totals untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CapError::TotalOverflow`] if a running total leaves the decimal range.
    pub fn apply(
        &mut self,
        raw: Decimal,
        discount_cap: Cap,
        cart_cap: Cap,
    ) -> Result<CapOutcome, CapError> {
        let mut reasons = SmallVec::new();

        let mut amount = raw;

        if let Some(clamped) = clamp(amount, self.discount_total, discount_cap) {
            amount = clamped;
            reasons.push(CapReason::SingleDiscountCapReached);
        }

        if let Some(clamped) = clamp(amount, self.cart_total, cart_cap) {
            amount = clamped;
            reasons.push(CapReason::TotalDiscountsCapReached);
        }

        if amount <= Decimal::ZERO {
            return Ok(CapOutcome {
                amount: None,
                reasons,
            });
        }

        self.discount_total = self
            .discount_total
            .checked_add(amount)
            .ok_or(CapError::TotalOverflow)?;

        self.cart_total = self
            .cart_total
            .checked_add(amount)
            .ok_or(CapError::TotalOverflow)?;

        Ok(CapOutcome {
            amount: Some(amount),
            reasons,
        })
    }
}

/// Return the remaining headroom when `amount` does not fit under `cap`.
fn clamp(amount: Decimal, total: Decimal, cap: Cap) -> Option<Decimal> {
    let room = cap.headroom(total)?;

    (amount > room).then_some(room)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn negative_values_are_uncapped() {
        assert_eq!(Cap::from_decimal(Decimal::NEGATIVE_ONE), Cap::Uncapped);
        assert_eq!(Cap::from_decimal(dec(-20)), Cap::Uncapped);
        assert_eq!(Cap::from_decimal(Decimal::ZERO), Cap::Limit(Decimal::ZERO));
        assert_eq!(Cap::from_decimal(dec(15)), Cap::Limit(dec(15)));
    }

    #[test]
    fn headroom_is_never_negative() {
        assert_eq!(Cap::Limit(dec(10)).headroom(dec(4)), Some(dec(6)));
        assert_eq!(Cap::Limit(dec(10)).headroom(dec(12)), Some(Decimal::ZERO));
        assert_eq!(Cap::Uncapped.headroom(dec(12)), None);
    }

    #[test]
    fn uncapped_amount_passes_through() -> TestResult {
        let mut tracker = CapTracker::new();

        let outcome = tracker.apply(dec(6), Cap::Uncapped, Cap::Uncapped)?;

        assert_eq!(outcome.amount, Some(dec(6)));
        assert!(outcome.reasons.is_empty());
        assert_eq!(tracker.cart_total(), dec(6));
        assert_eq!(tracker.discount_total(), dec(6));

        Ok(())
    }

    #[test]
    fn discount_cap_clamps_to_remaining_headroom() -> TestResult {
        let mut tracker = CapTracker::new();
        let cap = Cap::Limit(dec(10));

        tracker.apply(dec(8), cap, Cap::Uncapped)?;
        let outcome = tracker.apply(dec(5), cap, Cap::Uncapped)?;

        assert_eq!(outcome.amount, Some(dec(2)));
        assert_eq!(
            outcome.reasons.as_slice(),
            [CapReason::SingleDiscountCapReached]
        );
        assert_eq!(tracker.discount_total(), dec(10));

        Ok(())
    }

    #[test]
    fn exact_fit_is_not_clamped() -> TestResult {
        let mut tracker = CapTracker::new();

        let outcome = tracker.apply(dec(10), Cap::Limit(dec(10)), Cap::Limit(dec(10)))?;

        assert_eq!(outcome.amount, Some(dec(10)));
        assert!(outcome.reasons.is_empty());

        Ok(())
    }

    #[test]
    fn cart_cap_applies_after_discount_cap() -> TestResult {
        let mut tracker = CapTracker::new();

        tracker.apply(dec(7), Cap::Uncapped, Cap::Limit(dec(9)))?;
        tracker.start_discount();

        let outcome = tracker.apply(dec(5), Cap::Limit(dec(4)), Cap::Limit(dec(9)))?;

        assert_eq!(outcome.amount, Some(dec(2)));
        assert_eq!(
            outcome.reasons.as_slice(),
            [
                CapReason::SingleDiscountCapReached,
                CapReason::TotalDiscountsCapReached
            ]
        );
        assert_eq!(tracker.cart_total(), dec(9));
        assert_eq!(tracker.discount_total(), dec(2));

        Ok(())
    }

    #[test]
    fn exhausted_cap_yields_no_allocation_but_reports_reason() -> TestResult {
        let mut tracker = CapTracker::new();
        let cap = Cap::Limit(dec(3));

        tracker.apply(dec(3), cap, Cap::Uncapped)?;
        let outcome = tracker.apply(dec(1), cap, Cap::Uncapped)?;

        assert_eq!(outcome.amount, None);
        assert_eq!(
            outcome.reasons.as_slice(),
            [CapReason::SingleDiscountCapReached]
        );
        assert_eq!(tracker.cart_total(), dec(3));

        Ok(())
    }

    #[test]
    fn zero_amount_is_skipped_without_reason() -> TestResult {
        let mut tracker = CapTracker::new();

        let outcome = tracker.apply(Decimal::ZERO, Cap::Limit(dec(1)), Cap::Limit(dec(1)))?;

        assert_eq!(outcome.amount, None);
        assert!(outcome.reasons.is_empty());

        Ok(())
    }

    #[test]
    fn negative_amount_is_floored_to_no_allocation() -> TestResult {
        let mut tracker = CapTracker::new();

        let outcome = tracker.apply(dec(-4), Cap::Uncapped, Cap::Uncapped)?;

        assert_eq!(outcome.amount, None);
        assert_eq!(tracker.cart_total(), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn start_discount_resets_only_discount_total() -> TestResult {
        let mut tracker = CapTracker::new();

        tracker.apply(dec(5), Cap::Limit(dec(5)), Cap::Uncapped)?;
        tracker.start_discount();

        let outcome = tracker.apply(dec(5), Cap::Limit(dec(5)), Cap::Uncapped)?;

        assert_eq!(outcome.amount, Some(dec(5)));
        assert_eq!(tracker.discount_total(), dec(5));
        assert_eq!(tracker.cart_total(), dec(10));

        Ok(())
    }

    #[test]
    fn amount_far_above_cap_clamps_instead_of_overflowing() -> TestResult {
        let mut tracker = CapTracker::new();
        let cap = Cap::Limit(dec(10));

        tracker.apply(dec(5), cap, Cap::Uncapped)?;
        let outcome = tracker.apply(Decimal::MAX, cap, Cap::Limit(dec(100)))?;

        assert_eq!(outcome.amount, Some(dec(5)));
        assert_eq!(
            outcome.reasons.as_slice(),
            [CapReason::SingleDiscountCapReached]
        );
        assert_eq!(tracker.cart_total(), dec(10));

        Ok(())
    }

    #[test]
    fn overflowing_total_returns_error() -> TestResult {
        let mut tracker = CapTracker::new();

        tracker.apply(Decimal::MAX, Cap::Uncapped, Cap::Uncapped)?;
        tracker.start_discount();

        let result = tracker.apply(Decimal::MAX, Cap::Uncapped, Cap::Uncapped);

        assert_eq!(result, Err(CapError::TotalOverflow));

        Ok(())
    }
}
