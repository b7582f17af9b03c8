//! Discount Targets
//!
//! A [`Target`] names a cart line by identifier and the quantity of that line
//! a proposal applies to. The [`TargetResolver`] builds an identifier index
//! over the cart once and resolves targets against it.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::cart::{Cart, CartLine};

/// Errors raised while resolving targets against the cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    /// A target refers to a line that is not in the cart.
    #[error("target references unknown cart line {line_ref:?}")]
    UnresolvableTarget {
        /// Line reference carried by the target
        line_ref: String,
    },

    /// Two cart lines share the same identifier.
    #[error("cart contains more than one line with id {line_id:?}")]
    DuplicateLine {
        /// Identifier that appears more than once
        line_id: String,
    },

    /// The target's price does not fit in a decimal.
    #[error("price of target on cart line {line_ref:?} overflowed")]
    PriceOverflow {
        /// Line reference carried by the target
        line_ref: String,
    },
}

/// A reference to a cart line and the quantity a proposal applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    line_ref: String,
    quantity: u32,
}

impl Target {
    /// Create a new target.
    pub fn new(line_ref: impl Into<String>, quantity: u32) -> Self {
        Self {
            line_ref: line_ref.into(),
            quantity,
        }
    }

    /// Identifier of the referenced cart line.
    pub fn line_ref(&self) -> &str {
        &self.line_ref
    }

    /// Quantity of the line targeted.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// A target bound to its cart line, with its monetary contribution.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTarget<'a> {
    line_idx: usize,
    line: &'a CartLine,
    quantity: u32,
    price: Decimal,
}

impl<'a> ResolvedTarget<'a> {
    /// Position of the line in the cart.
    pub fn line_idx(&self) -> usize {
        self.line_idx
    }

    /// The referenced cart line.
    pub fn line(&self) -> &'a CartLine {
        self.line
    }

    /// Quantity targeted.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price multiplied by the targeted quantity.
    pub fn price(&self) -> Decimal {
        self.price
    }
}

/// Resolves targets to cart lines through an identifier index.
#[derive(Debug)]
pub struct TargetResolver<'a> {
    lines: &'a [CartLine],
    index: FxHashMap<&'a str, usize>,
}

impl<'a> TargetResolver<'a> {
    /// Index the lines of `cart` by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::DuplicateLine`] if two lines share an identifier.
    pub fn new(cart: &'a Cart) -> Result<Self, TargetError> {
        let lines = cart.lines();

        let mut index = FxHashMap::default();
        index.reserve(lines.len());

        for (idx, line) in lines.iter().enumerate() {
            if index.insert(line.id(), idx).is_some() {
                return Err(TargetError::DuplicateLine {
                    line_id: line.id().to_string(),
                });
            }
        }

        Ok(Self { lines, index })
    }

    /// Resolve a target to its line and price.
    ///
    /// # Errors
    ///
    /// - [`TargetError::UnresolvableTarget`]: the referenced line is not in the cart.
    /// - [`TargetError::PriceOverflow`]: unit price times quantity left the decimal range.
    pub fn resolve(&self, target: &Target) -> Result<ResolvedTarget<'a>, TargetError> {
        let unresolvable = || TargetError::UnresolvableTarget {
            line_ref: target.line_ref().to_string(),
        };

        let line_idx = *self.index.get(target.line_ref()).ok_or_else(unresolvable)?;
        let line = self.lines.get(line_idx).ok_or_else(unresolvable)?;

        let price = line
            .price_for(target.quantity())
            .ok_or_else(|| TargetError::PriceOverflow {
                line_ref: target.line_ref().to_string(),
            })?;

        Ok(ResolvedTarget {
            line_idx,
            line,
            quantity: target.quantity(),
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::caps::Cap;

    fn test_cart() -> Cart {
        Cart::with_lines(
            [
                CartLine::new("gid://shopify/CartLine/0", 3, Decimal::from(10)),
                CartLine::new("gid://shopify/CartLine/1", 1, Decimal::new(499, 2)),
            ],
            Cap::Uncapped,
        )
    }

    #[test]
    fn resolve_returns_line_and_price() -> TestResult {
        let cart = test_cart();
        let resolver = TargetResolver::new(&cart)?;

        let resolved = resolver.resolve(&Target::new("gid://shopify/CartLine/1", 1))?;

        assert_eq!(resolved.line_idx(), 1);
        assert_eq!(resolved.line().id(), "gid://shopify/CartLine/1");
        assert_eq!(resolved.quantity(), 1);
        assert_eq!(resolved.price(), Decimal::new(499, 2));

        Ok(())
    }

    #[test]
    fn price_uses_target_quantity_not_line_quantity() -> TestResult {
        let cart = test_cart();
        let resolver = TargetResolver::new(&cart)?;

        let resolved = resolver.resolve(&Target::new("gid://shopify/CartLine/0", 2))?;

        assert_eq!(resolved.price(), Decimal::from(20));

        Ok(())
    }

    #[test]
    fn identifiers_are_matched_whole_not_by_suffix() -> TestResult {
        let cart = Cart::with_lines(
            [
                CartLine::new("line-10", 1, Decimal::from(4)),
                CartLine::new("line-0", 1, Decimal::from(6)),
            ],
            Cap::Uncapped,
        );
        let resolver = TargetResolver::new(&cart)?;

        let resolved = resolver.resolve(&Target::new("line-0", 1))?;

        assert_eq!(resolved.line_idx(), 1);
        assert_eq!(resolved.price(), Decimal::from(6));

        Ok(())
    }

    #[test]
    fn unknown_line_is_unresolvable() -> TestResult {
        let cart = test_cart();
        let resolver = TargetResolver::new(&cart)?;

        let result = resolver.resolve(&Target::new("gid://shopify/CartLine/7", 1));

        assert!(matches!(
            result,
            Err(TargetError::UnresolvableTarget { line_ref }) if line_ref == "gid://shopify/CartLine/7"
        ));

        Ok(())
    }

    #[test]
    fn duplicate_line_ids_are_rejected() {
        let cart = Cart::with_lines(
            [
                CartLine::new("line-0", 1, Decimal::ONE),
                CartLine::new("line-0", 2, Decimal::ONE),
            ],
            Cap::Uncapped,
        );

        let result = TargetResolver::new(&cart);

        assert!(matches!(
            result,
            Err(TargetError::DuplicateLine { line_id }) if line_id == "line-0"
        ));
    }

    #[test]
    fn overflowing_price_is_reported() -> TestResult {
        let cart = Cart::with_lines([CartLine::new("line-0", 1, Decimal::MAX)], Cap::Uncapped);
        let resolver = TargetResolver::new(&cart)?;

        let result = resolver.resolve(&Target::new("line-0", 3));

        assert!(matches!(result, Err(TargetError::PriceOverflow { .. })));

        Ok(())
    }
}
