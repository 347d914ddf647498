use overlay_query::{Fragment, Select};

use crate::restriction::Restriction;

/// Ordered restrictions applied to every fragment of a query.
#[derive(Default)]
pub struct RestrictionChain {
    restrictions: Vec<Box<dyn Restriction>>,
}

impl RestrictionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a restriction. Rules sharing a name all stay in the chain, so
    /// a row must pass every one of them.
    pub fn push(&mut self, restriction: Box<dyn Restriction>) {
        self.restrictions.push(restriction);
    }

    /// Builder-style [`Self::push`].
    pub fn with(mut self, restriction: Box<dyn Restriction>) -> Self {
        self.push(restriction);
        self
    }

    /// Narrow `select` with every restriction, in order.
    pub fn apply(&self, select: &mut Select, fragment: Fragment) {
        for restriction in &self.restrictions {
            restriction.apply(select, fragment);
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.restrictions.iter().map(|r| r.name()).collect()
    }

    /// Names of the restrictions that actually limit the principal.
    pub fn active_names(&self) -> Vec<&str> {
        self.restrictions
            .iter()
            .filter(|r| r.is_active())
            .map(|r| r.name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.restrictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restrictions.is_empty()
    }
}

impl std::fmt::Debug for RestrictionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestrictionChain")
            .field("restrictions", &self.names())
            .finish()
    }
}
