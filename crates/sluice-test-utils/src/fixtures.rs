//! Reusable handler fixtures.
//!
//! [`MockHandler`] is an in-memory tank: a list of typed stacks sharing one
//! total capacity. Extraction drains the first nonempty stack. Facing is
//! ignored.

use std::cell::{Cell, RefCell};

use sluice_core::{Action, ResourceHandler, ResourceSet, ResourceStack, ResourceType, Side};

/// In-memory [`ResourceHandler`].
///
/// Uses `RefCell`/`Cell` so that execute-mode calls can mutate through
/// `&self`, as the trait requires.
pub struct MockHandler {
    name: String,
    stacks: RefCell<Vec<ResourceStack>>,
    capacity: i64,
    refuse_execute: bool,
    executed_extracts: Cell<usize>,
    executed_inserts: Cell<usize>,
}

impl MockHandler {
    /// Empty tank with unlimited capacity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stacks: RefCell::new(Vec::new()),
            capacity: i64::MAX,
            refuse_execute: false,
            executed_extracts: Cell::new(0),
            executed_inserts: Cell::new(0),
        }
    }

    /// Add `amount` of `resource`.
    pub fn holding(self, resource: ResourceType, amount: i64) -> Self {
        self.add(resource, amount);
        self
    }

    /// Limit the total held across all types.
    pub fn capacity(mut self, capacity: i64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Behave normally when simulated but move nothing when executed.
    pub fn refusing_execute(mut self) -> Self {
        self.refuse_execute = true;
        self
    }

    /// Amount held of one type.
    pub fn amount_of(&self, resource: ResourceType) -> i64 {
        self.stacks
            .borrow()
            .iter()
            .filter(|s| s.resource == resource)
            .map(|s| s.amount)
            .sum()
    }

    /// Amount held across all types.
    pub fn total(&self) -> i64 {
        self.stacks.borrow().iter().map(|s| s.amount).sum()
    }

    /// Overwrite the held amount of one type.
    pub fn set_amount(&self, resource: ResourceType, amount: i64) {
        let mut stacks = self.stacks.borrow_mut();
        stacks.retain(|s| s.resource != resource);
        if amount > 0 {
            stacks.push(ResourceStack::new(resource, amount));
        }
    }

    /// Number of execute-mode extractions that moved something.
    pub fn executed_extracts(&self) -> usize {
        self.executed_extracts.get()
    }

    /// Number of execute-mode inserts that absorbed something.
    pub fn executed_inserts(&self) -> usize {
        self.executed_inserts.get()
    }

    fn add(&self, resource: ResourceType, amount: i64) {
        let mut stacks = self.stacks.borrow_mut();
        match stacks.iter_mut().find(|s| s.resource == resource) {
            Some(stack) => stack.amount += amount,
            None => stacks.push(ResourceStack::new(resource, amount)),
        }
    }
}

impl ResourceHandler for MockHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn quantity(&self, _facing: Option<Side>, filter: Option<&ResourceStack>) -> i64 {
        self.stacks
            .borrow()
            .iter()
            .filter(|s| filter.is_none_or(|f| f.is_same_type(s)))
            .map(|s| s.amount)
            .sum()
    }

    fn extract(&self, amount: i64, _facing: Option<Side>, action: Action) -> ResourceStack {
        let mut stacks = self.stacks.borrow_mut();
        let Some(stack) = stacks.iter_mut().find(|s| !s.is_empty()) else {
            return ResourceStack::empty(ResourceType(0));
        };
        if amount <= 0 {
            return ResourceStack::empty(stack.resource);
        }
        let taken = amount.min(stack.amount);
        if action.execute() {
            if self.refuse_execute {
                return ResourceStack::empty(stack.resource);
            }
            stack.amount -= taken;
            self.executed_extracts.set(self.executed_extracts.get() + 1);
        }
        ResourceStack::new(stack.resource, taken)
    }

    fn insert(&self, stack: &ResourceStack, _facing: Option<Side>, action: Action) -> ResourceStack {
        let room = (self.capacity - self.total()).max(0);
        let taken = stack.amount.min(room).max(0);
        if action.execute() && self.refuse_execute {
            return *stack;
        }
        if action.execute() && taken > 0 {
            self.add(stack.resource, taken);
            self.executed_inserts.set(self.executed_inserts.get() + 1);
        }
        stack.with_amount(stack.amount - taken)
    }

    fn contents(&self, _facing: Option<Side>) -> ResourceSet {
        let mut types = ResourceSet::new();
        for s in self.stacks.borrow().iter().filter(|s| !s.is_empty()) {
            if !types.contains(&s.resource) {
                types.push(s.resource);
            }
        }
        types
    }
}
