use overlay_types::Row;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// A named table: a fixed column list and its rows.
///
/// Rows may omit columns; omitted columns read as NULL.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Check that every column of `row` is defined on this table.
    pub fn check_row(&self, row: &Row) -> StoreResult<()> {
        match row.columns().find(|c| !self.has_column(c)) {
            Some(column) => Err(StoreError::InvalidRow {
                table: self.name.clone(),
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn insert(&mut self, row: Row) -> StoreResult<()> {
        self.check_row(&row)?;
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_accepts_known_columns() {
        let mut t = Table::new("icinga_host", ["id", "object_name"]);
        t.insert(Row::new().with("id", 1).with("object_name", "web1"))
            .unwrap();
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn insert_rejects_unknown_columns() {
        let mut t = Table::new("icinga_host", ["id"]);
        let err = t.insert(Row::new().with("address", "10.0.0.1")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRow { ref column, .. } if column == "address"));
        assert!(t.is_empty());
    }

    #[test]
    fn deserializes_from_json() {
        let t: Table = serde_json::from_str(
            r#"{"name":"icinga_zone","columns":["id","object_name"],"rows":[{"id":1,"object_name":"master"}]}"#,
        )
        .unwrap();
        assert_eq!(t.rows[0].get_str("object_name"), Some("master"));
    }
}
