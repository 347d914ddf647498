//! Dynamically typed column values and result rows.
//!
//! Category tables have open-ended schemas, so rows travel as ordered
//! name → [`Value`] maps rather than typed structs.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::branch::BranchId;
use crate::object::{Flag, ObjectId, ObjectType};

/// A single column value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Total order used for sorting result rows.
    ///
    /// NULL sorts first; values of different kinds order by kind
    /// (int, text, bytes) so that sorting never fails.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Bytes(a), Self::Bytes(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Int(_) => 1,
            Self::Text(_) => 2,
            Self::Bytes(_) => 3,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Self::Int(v.get())
    }
}

impl From<BranchId> for Value {
    fn from(v: BranchId) -> Self {
        Self::Bytes(v.as_bytes().to_vec())
    }
}

impl From<Flag> for Value {
    fn from(v: Flag) -> Self {
        Self::Text(v.as_str().to_string())
    }
}

impl From<ObjectType> for Value {
    fn from(v: ObjectType) -> Self {
        Self::Text(v.as_str().to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// A result or table row: column name → value.
///
/// Missing columns read as [`Value::Null`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    /// Value of a column, NULL when absent.
    pub fn get(&self, column: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.0.get(column).unwrap_or(&NULL)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).as_str()
    }

    pub fn get_int(&self, column: &str) -> Option<i64> {
        self.get(column).as_int()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_reads_as_null() {
        let row = Row::new().with("object_name", "host1");
        assert_eq!(row.get_str("object_name"), Some("host1"));
        assert!(row.get("address").is_null());
        assert!(!row.contains("address"));
    }

    #[test]
    fn null_sorts_before_everything() {
        assert_eq!(Value::Null.sort_cmp(&Value::from(0)), Ordering::Less);
        assert_eq!(Value::Null.sort_cmp(&Value::from("")), Ordering::Less);
        assert_eq!(Value::Null.sort_cmp(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn text_sorts_lexicographically() {
        let a = Value::from("alpha");
        let b = Value::from("beta");
        assert_eq!(a.sort_cmp(&b), Ordering::Less);
        assert_eq!(b.sort_cmp(&a), Ordering::Greater);
    }

    #[test]
    fn branch_id_becomes_raw_bytes() {
        let branch = BranchId::from_bytes([9; 16]);
        assert_eq!(Value::from(branch).as_bytes(), Some(&[9u8; 16][..]));
    }

    #[test]
    fn option_none_is_null() {
        let v: Value = Option::<&str>::None.into();
        assert!(v.is_null());
        let v: Value = Some(Flag::Yes).into();
        assert_eq!(v.as_str(), Some("y"));
    }

    #[test]
    fn display_renders_null_as_empty() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(12).to_string(), "12");
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_string(), "0xdead");
    }

    #[test]
    fn row_serializes_as_plain_map() {
        let row = Row::new().with("id", 1).with("object_name", "web");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":1,"object_name":"web"}"#);
    }
}
