//! Displayable Notices

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a cap limited the discount that was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapReason {
    /// The discount's own cap was reached.
    SingleDiscountCapReached,

    /// The cart-wide cap across all discounts was reached.
    TotalDiscountsCapReached,
}

impl CapReason {
    /// Message shown to shoppers and merchants.
    pub const fn message(self) -> &'static str {
        match self {
            CapReason::SingleDiscountCapReached => {
                "Maximum discount limit reached for this discount"
            }
            CapReason::TotalDiscountsCapReached => "Maximum discount limit reached for this cart",
        }
    }
}

impl fmt::Display for CapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A non-fatal notice that a cap limited a discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayableError {
    /// Discount that was clamped
    pub discount_id: String,

    /// Which cap clamped it
    pub reason: CapReason,
}

/// Ordered log of clamping events. Duplicates are kept.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<DisplayableError>,
}

impl ErrorCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notice for `discount_id`.
    pub fn record(&mut self, discount_id: &str, reason: CapReason) {
        self.errors.push(DisplayableError {
            discount_id: discount_id.to_string(),
            reason,
        });
    }

    /// Number of notices recorded.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume the collector, returning the notices in event order.
    pub fn into_errors(self) -> Vec<DisplayableError> {
        self.errors
    }
}
