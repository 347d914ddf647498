//! TOML fixtures: tables and principals loaded into an in-memory store.
//!
//! ```toml
//! [[tables]]
//! name = "icinga_host"
//! columns = ["id", "object_name", "object_type", "disabled"]
//! rows = [{ id = 1, object_name = "web1", object_type = "object", disabled = "n" }]
//!
//! [[principals]]
//! name = "alice"
//! restrictions = { "director/filter/hostgroups" = ["webservers"] }
//! ```
//!
//! `branch_uuid` cells may be written as hex or hyphenated UUID strings.

use std::path::Path;

use anyhow::Context;
use overlay_query::SqlDialect;
use overlay_store::{InMemoryStore, Table};
use overlay_types::{BranchId, Principal, Value};
use serde::Deserialize;

const BRANCH_COLUMN: &str = "branch_uuid";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub principals: Vec<Principal>,
}

impl Fixture {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut fixture: Self = toml::from_str(s)?;
        for table in &mut fixture.tables {
            for row in &mut table.rows {
                if let Some(text) = row.get_str(BRANCH_COLUMN) {
                    let branch: BranchId = text
                        .parse()
                        .with_context(|| format!("bad {BRANCH_COLUMN} in table {}", table.name))?;
                    row.insert(BRANCH_COLUMN, Value::from(branch));
                }
            }
        }
        Ok(fixture)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing fixture {}", path.display()))
    }

    pub fn store(&self, dialect: SqlDialect) -> anyhow::Result<InMemoryStore> {
        let store = InMemoryStore::new(dialect);
        for table in &self.tables {
            store.add_table(table.clone())?;
        }
        Ok(store)
    }

    pub fn principal(&self, name: &str) -> Option<&Principal> {
        self.principals.iter().find(|p| p.name == name)
    }
}
