//! Allocation Receipt
//!
//! Plain-text rendering of an [`AllocationResult`] for terminals.

use std::io;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::Money;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    output::AllocationResult,
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing to the output failed.
    #[error("failed to write receipt: {0}")]
    Io(#[from] io::Error),

    /// An allocation references a line missing from the cart.
    #[error("allocation references unknown cart line {0:?}")]
    UnknownLine(String),

    /// A total did not fit in a decimal.
    #[error("amount overflowed while totalling the receipt")]
    Overflow,
}

/// Receipt for one allocation run.
#[derive(Debug)]
pub struct AllocationReceipt<'a> {
    cart: &'a Cart,
    result: &'a AllocationResult,
}

impl<'a> AllocationReceipt<'a> {
    /// Create a receipt for `result`, which must have been produced from `cart`.
    pub fn new(cart: &'a Cart, result: &'a AllocationResult) -> Self {
        Self { cart, result }
    }

    /// Write the allocation table, the total and any cap notices.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if writing fails, an allocation references
    /// a line not in the cart, or a total overflows.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let lines: FxHashMap<&str, &CartLine> = self
            .cart
            .lines()
            .iter()
            .map(|line| (line.id(), line))
            .collect();

        let mut builder = Builder::default();

        builder.push_record(["Line", "Qty", "Line Total", "Proposal", "Discount"]);

        for line_discount in &self.result.line_discounts {
            let line = lines
                .get(line_discount.line_id.as_str())
                .ok_or_else(|| ReceiptError::UnknownLine(line_discount.line_id.clone()))?;

            let subtotal = self.format_amount(line.subtotal().ok_or(ReceiptError::Overflow)?);

            for allocation in &line_discount.allocations {
                builder.push_record([
                    line.id().to_string(),
                    line_discount.quantity.to_string(),
                    subtotal.clone(),
                    allocation.proposal_handle.clone(),
                    self.format_amount(allocation.amount),
                ]);
            }
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..3), Alignment::right());
        table.modify(Columns::new(4..5), Alignment::right());

        writeln!(out, "{table}")?;

        let total = self
            .result
            .total_allocated()
            .ok_or(ReceiptError::Overflow)?;

        writeln!(out, "Total discount: {}", self.format_amount(total))?;

        for error in &self.result.displayable_errors {
            writeln!(out, "! {}: {}", error.discount_id, error.reason)?;
        }

        Ok(())
    }

    fn format_amount(&self, amount: Decimal) -> String {
        match self.cart.currency() {
            Some(currency) => Money::from_decimal(amount, currency).to_string(),
            None => format!("{amount:.2}"),
        }
    }
}
