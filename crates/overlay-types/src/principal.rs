use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The authenticated caller a query is built for.
///
/// Restrictions are named lists of values granted to the principal, e.g.
/// `director/filter/hostgroups = ["linux", "web*"]`. A single entry may hold
/// a comma-separated list, matching how roles are usually configured.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub name: String,
    #[serde(default)]
    pub restrictions: BTreeMap<String, Vec<String>>,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            restrictions: BTreeMap::new(),
        }
    }

    /// Builder-style restriction grant.
    pub fn with_restriction(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.restrictions
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// All values granted for a restriction, comma lists flattened.
    pub fn restriction_values(&self, name: &str) -> Vec<&str> {
        self.restrictions
            .get(name)
            .into_iter()
            .flatten()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Returns `true` if the principal carries the named restriction at all.
    pub fn is_restricted_by(&self, name: &str) -> bool {
        !self.restriction_values(name).is_empty()
    }
}
