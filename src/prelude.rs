//! Discount Allocator prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocation::{AllocationEngine, AllocationError, allocate},
    caps::{Cap, CapError, CapOutcome, CapTracker},
    cart::{Cart, CartLine},
    discounts::{Discount, DiscountProposal, DiscountValue},
    fixtures::{Fixture, FixtureError},
    input::{FunctionInput, InputError, parse_cap},
    notices::{CapReason, DisplayableError, ErrorCollector},
    output::{Allocation, AllocationResult, LineDiscount},
    proposals::{ConfiguredKind, DiscountConfig, ProposalError, configured_discount},
    receipt::{AllocationReceipt, ReceiptError},
    targets::{ResolvedTarget, Target, TargetError, TargetResolver},
};
