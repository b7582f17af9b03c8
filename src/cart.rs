//! Cart

use rust_decimal::Decimal;
use rusty_money::iso::{self, Currency};

use crate::caps::Cap;

/// A single line in the cart being evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    id: String,
    quantity: u32,
    price_per_unit: Decimal,
}

impl CartLine {
    /// Create a new cart line.
    pub fn new(id: impl Into<String>, quantity: u32, price_per_unit: Decimal) -> Self {
        Self {
            id: id.into(),
            quantity,
            price_per_unit,
        }
    }

    /// Line identifier, unique within the cart.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of units on the line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price of a single unit.
    pub fn price_per_unit(&self) -> Decimal {
        self.price_per_unit
    }

    /// Price of `quantity` units of this line, or `None` on overflow.
    pub fn price_for(&self, quantity: u32) -> Option<Decimal> {
        self.price_per_unit.checked_mul(Decimal::from(quantity))
    }

    /// Price of the whole line, or `None` on overflow.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price_for(self.quantity)
    }
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    cap: Cap,
    currency: Option<&'static Currency>,
}

impl Cart {
    /// Create an empty cart with the given cart-wide cap.
    pub fn new(cap: Cap) -> Self {
        Self {
            lines: Vec::new(),
            cap,
            currency: None,
        }
    }

    /// Create a cart with the given lines and cart-wide cap.
    pub fn with_lines(lines: impl Into<Vec<CartLine>>, cap: Cap) -> Self {
        Self {
            lines: lines.into(),
            cap,
            currency: None,
        }
    }

    /// Set the currency the cart is priced in.
    #[must_use]
    pub fn with_currency(mut self, currency: &'static Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Lines in cart order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Cart-wide cap across every discount.
    pub fn cap(&self) -> Cap {
        self.cap
    }

    /// Currency of the cart, if known.
    pub fn currency(&self) -> Option<&'static Currency> {
        self.currency
    }

    /// Number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Look up a supported ISO currency by its alphabetic code.
pub fn currency_from_code(code: &str) -> Option<&'static Currency> {
    match code.trim().to_ascii_uppercase().as_str() {
        "GBP" => Some(iso::GBP),
        "USD" => Some(iso::USD),
        "EUR" => Some(iso::EUR),
        "CAD" => Some(iso::CAD),
        "AUD" => Some(iso::AUD),
        _ => None,
    }
}
