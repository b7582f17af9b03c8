//! Allocation Output

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{cart::Cart, notices::DisplayableError};

/// Money allocated to one line for one proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    /// Handle of the proposal the money comes from
    pub proposal_handle: String,

    /// Amount allocated, always positive
    ///
    /// Amounts are not rounded. Proportional splits keep the full decimal
    /// precision (ten split three ways is `3.333…`) and rounding to the
    /// currency's minor unit is left to the host applying the discount.
    pub amount: Decimal,
}

impl Allocation {
    /// Create a new allocation.
    pub fn new(proposal_handle: impl Into<String>, amount: Decimal) -> Self {
        Self {
            proposal_handle: proposal_handle.into(),
            amount,
        }
    }
}

/// Allocations made to a single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDiscount {
    /// Identifier of the cart line
    pub line_id: String,

    /// Quantity of the cart line
    pub quantity: u32,

    /// Allocations in the order they were made
    pub allocations: Vec<Allocation>,
}

impl LineDiscount {
    /// Sum of the allocations on this line, or `None` on overflow.
    pub fn total(&self) -> Option<Decimal> {
        self.allocations
            .iter()
            .try_fold(Decimal::ZERO, |acc, allocation| acc.checked_add(allocation.amount))
    }
}

/// Outcome of a single allocation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    /// One entry per cart line that received at least one allocation, in cart order
    pub line_discounts: Vec<LineDiscount>,

    /// Cap notices in the order they were raised
    pub displayable_errors: Vec<DisplayableError>,
}

impl AllocationResult {
    /// Build the result from per-line allocations, dropping lines with none.
    ///
    /// `allocations` is indexed like the cart's lines.
    pub fn assemble(
        cart: &Cart,
        allocations: Vec<Vec<Allocation>>,
        displayable_errors: Vec<DisplayableError>,
    ) -> Self {
        let line_discounts = cart
            .lines()
            .iter()
            .zip(allocations)
            .filter(|(_, allocations)| !allocations.is_empty())
            .map(|(line, allocations)| LineDiscount {
                line_id: line.id().to_string(),
                quantity: line.quantity(),
                allocations,
            })
            .collect();

        Self {
            line_discounts,
            displayable_errors,
        }
    }

    /// Check if nothing was allocated and nothing was clamped.
    pub fn is_empty(&self) -> bool {
        self.line_discounts.is_empty() && self.displayable_errors.is_empty()
    }

    /// Every allocation across the cart, in line order.
    pub fn allocations(&self) -> impl Iterator<Item = &Allocation> {
        self.line_discounts
            .iter()
            .flat_map(|line| line.allocations.iter())
    }

    /// Total allocated across the cart, or `None` on overflow.
    pub fn total_allocated(&self) -> Option<Decimal> {
        self.line_discounts
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.total()?))
    }

    /// Total allocated for a single proposal, or `None` on overflow.
    pub fn total_for_proposal(&self, handle: &str) -> Option<Decimal> {
        self.allocations()
            .filter(|allocation| allocation.proposal_handle == handle)
            .try_fold(Decimal::ZERO, |acc, allocation| acc.checked_add(allocation.amount))
    }

    /// Allocations made to the line with the given identifier.
    pub fn line(&self, line_id: &str) -> Option<&LineDiscount> {
        self.line_discounts.iter().find(|line| line.line_id == line_id)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{
        caps::Cap,
        cart::CartLine,
        notices::CapReason,
    };

    fn test_cart() -> Cart {
        Cart::with_lines(
            [
                CartLine::new("line-0", 3, Decimal::from(10)),
                CartLine::new("line-1", 1, Decimal::from(5)),
                CartLine::new("line-2", 2, Decimal::from(8)),
            ],
            Cap::Uncapped,
        )
    }

    #[test]
    fn assemble_drops_lines_without_allocations() {
        let allocations = vec![
            vec![Allocation::new("p1", Decimal::from(6))],
            vec![],
            vec![
                Allocation::new("p1", Decimal::from(2)),
                Allocation::new("p2", Decimal::ONE),
            ],
        ];

        let result = AllocationResult::assemble(&test_cart(), allocations, Vec::new());

        let ids: Vec<&str> = result
            .line_discounts
            .iter()
            .map(|line| line.line_id.as_str())
            .collect();

        assert_eq!(ids, ["line-0", "line-2"]);
        assert_eq!(result.line("line-2").map(|line| line.quantity), Some(2));
        assert_eq!(
            result.line("line-2").and_then(LineDiscount::total),
            Some(Decimal::from(3))
        );
        assert!(result.line("line-1").is_none());
    }

    #[test]
    fn totals_sum_allocations() {
        let allocations = vec![
            vec![Allocation::new("p1", Decimal::from(6))],
            vec![Allocation::new("p2", Decimal::new(150, 2))],
            vec![Allocation::new("p1", Decimal::from(2))],
        ];

        let result = AllocationResult::assemble(&test_cart(), allocations, Vec::new());

        assert_eq!(result.total_allocated(), Some(Decimal::new(950, 2)));
        assert_eq!(result.total_for_proposal("p1"), Some(Decimal::from(8)));
        assert_eq!(result.total_for_proposal("missing"), Some(Decimal::ZERO));
    }

    #[test]
    fn empty_result_has_no_lines_or_errors() {
        let result = AllocationResult::assemble(&test_cart(), vec![vec![], vec![], vec![]], vec![]);

        assert!(result.is_empty());
        assert_eq!(result, AllocationResult::default());
    }

    #[test]
    fn serializes_with_camel_case_keys_and_string_amounts() -> TestResult {
        let result = AllocationResult {
            line_discounts: vec![LineDiscount {
                line_id: "line-0".to_string(),
                quantity: 3,
                allocations: vec![Allocation::new("p1", Decimal::new(600, 2))],
            }],
            displayable_errors: vec![DisplayableError {
                discount_id: "d1".to_string(),
                reason: CapReason::TotalDiscountsCapReached,
            }],
        };

        let json = serde_json::to_string(&result)?;

        assert_eq!(
            json,
            concat!(
                r#"{"lineDiscounts":[{"lineId":"line-0","quantity":3,"#,
                r#""allocations":[{"proposalHandle":"p1","amount":"6.00"}]}],"#,
                r#""displayableErrors":[{"discountId":"d1","reason":"TotalDiscountsCapReached"}]}"#
            )
        );

        Ok(())
    }
}
