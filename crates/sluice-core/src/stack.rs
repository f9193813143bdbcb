//! The [`ResourceStack`] value type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::ResourceType;

/// A typed, quantized amount of a resource.
///
/// Immutable value: derive new stacks with [`with_amount`](Self::with_amount).
/// A stack whose `amount` is zero (or below) is empty, whatever its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceStack {
    /// What the stack holds.
    pub resource: ResourceType,
    /// How much of it.
    pub amount: i64,
}

impl ResourceStack {
    /// Construct a stack.
    pub const fn new(resource: ResourceType, amount: i64) -> Self {
        Self { resource, amount }
    }

    /// An empty stack of `resource`.
    pub const fn empty(resource: ResourceType) -> Self {
        Self {
            resource,
            amount: 0,
        }
    }

    /// `true` when the stack carries nothing.
    pub fn is_empty(&self) -> bool {
        self.amount <= 0
    }

    /// The same resource with a different amount.
    pub fn with_amount(&self, amount: i64) -> Self {
        Self {
            resource: self.resource,
            amount,
        }
    }

    /// Type-only comparison; amounts are ignored.
    ///
    /// This is the matching rule used by endpoint filters.
    pub fn is_same_type(&self, other: &ResourceStack) -> bool {
        self.resource == other.resource
    }
}

impl fmt::Display for ResourceStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.amount, self.resource)
    }
}
