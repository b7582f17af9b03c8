//! Discount Allocator
//!
//! Splits proposed cart discounts across cart lines, honouring a cap per
//! discount and a cap across the whole cart, and reports every cap that was hit.

pub mod allocation;
pub mod caps;
pub mod cart;
pub mod discounts;
pub mod fixtures;
pub mod input;
pub mod notices;
pub mod output;
pub mod prelude;
pub mod proposals;
pub mod receipt;
pub mod targets;
