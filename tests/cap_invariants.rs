//! Cap invariants checked over a sweep of discount and cart caps

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use testresult::TestResult;

use discount_allocator::{
    allocation::allocate,
    caps::Cap,
    cart::{Cart, CartLine},
    discounts::{Discount, DiscountProposal, DiscountValue},
    targets::Target,
};

fn caps() -> Vec<Cap> {
    let mut caps = vec![Cap::Uncapped, Cap::Limit(Decimal::ZERO)];

    caps.extend(
        [1, 7, 13, 25, 40, 1000]
            .into_iter()
            .map(|value| Cap::Limit(Decimal::new(value * 100 + 33, 2))),
    );

    caps
}

fn discounts(cap: Cap) -> Vec<Discount> {
    vec![
        Discount::new(
            "percent",
            cap,
            [DiscountProposal::new(
                "thirty-percent",
                [Target::new("a", 2), Target::new("b", 1), Target::new("c", 3)],
                DiscountValue::percentage(Decimal::from(30)),
            )],
        ),
        Discount::new(
            "fixed",
            cap,
            [
                DiscountProposal::new(
                    "split-fifteen",
                    [Target::new("b", 1), Target::new("c", 3)],
                    DiscountValue::fixed_amount(Decimal::from(15)),
                ),
                DiscountProposal::new(
                    "two-each",
                    [Target::new("a", 2), Target::new("c", 3)],
                    DiscountValue::fixed_amount_each(Decimal::from(2)),
                ),
            ],
        ),
    ]
}

fn cart(cap: Cap) -> Cart {
    Cart::with_lines(
        [
            CartLine::new("a", 2, Decimal::new(1999, 2)),
            CartLine::new("b", 1, Decimal::new(4500, 2)),
            CartLine::new("c", 3, Decimal::new(325, 2)),
        ],
        cap,
    )
}

#[test]
fn allocations_never_exceed_caps() -> TestResult {
    for discount_cap in caps() {
        for cart_cap in caps() {
            let cart = cart(cart_cap);
            let discounts = discounts(discount_cap);

            let result = allocate(&cart, &discounts)?;

            let mut per_proposal: FxHashMap<&str, Decimal> = FxHashMap::default();

            for allocation in result.allocations() {
                assert!(
                    allocation.amount > Decimal::ZERO,
                    "non-positive allocation {allocation:?} for caps {discount_cap:?}/{cart_cap:?}"
                );

                *per_proposal
                    .entry(allocation.proposal_handle.as_str())
                    .or_default() += allocation.amount;
            }

            let percent_total = per_proposal
                .get("thirty-percent")
                .copied()
                .unwrap_or_default();

            let fixed_total = ["split-fifteen", "two-each"]
                .iter()
                .filter_map(|handle| per_proposal.get(handle))
                .copied()
                .sum::<Decimal>();

            if let Some(limit) = discount_cap.limit() {
                assert!(
                    percent_total <= limit,
                    "percentage discount total {percent_total} exceeds cap {limit}"
                );
                assert!(
                    fixed_total <= limit,
                    "fixed discount total {fixed_total} exceeds cap {limit}"
                );
            }

            let total = result.total_allocated().unwrap_or_default();

            assert_eq!(total, percent_total + fixed_total);

            if let Some(limit) = cart_cap.limit() {
                assert!(total <= limit, "cart total {total} exceeds cap {limit}");
            }
        }
    }

    Ok(())
}

#[test]
fn notices_are_only_raised_under_a_limit() -> TestResult {
    let result = allocate(&cart(Cap::Uncapped), &discounts(Cap::Uncapped))?;

    assert!(
        result.displayable_errors.is_empty(),
        "uncapped run raised notices: {:?}",
        result.displayable_errors
    );

    Ok(())
}

#[test]
fn every_line_keeps_its_cart_quantity() -> TestResult {
    let cart = cart(Cap::Limit(Decimal::from(30)));

    let result = allocate(&cart, &discounts(Cap::Limit(Decimal::from(20))))?;

    for line_discount in &result.line_discounts {
        let line = cart
            .lines()
            .iter()
            .find(|line| line.id() == line_discount.line_id);

        assert_eq!(line.map(CartLine::quantity), Some(line_discount.quantity));
        assert!(
            !line_discount.allocations.is_empty(),
            "line {} is listed without allocations",
            line_discount.line_id
        );
    }

    Ok(())
}
