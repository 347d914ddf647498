use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Stable primary key of a base record.
///
/// Ids are assigned by the canonical store and never reused. Objects that
/// only exist inside a branch have no `ObjectId` yet.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(i64);

impl ObjectId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ObjectId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Discriminator stored in the `object_type` column of every category table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    /// A concrete, deployable object.
    #[default]
    Object,
    /// A template other objects inherit from.
    Template,
    /// An apply rule generating objects at deploy time.
    Apply,
    /// An object managed outside of this store.
    ExternalObject,
}

impl ObjectType {
    /// The value stored in the `object_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Template => "template",
            Self::Apply => "apply",
            Self::ExternalObject => "external_object",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "object" => Ok(Self::Object),
            "template" => Ok(Self::Template),
            "apply" => Ok(Self::Apply),
            "external_object" => Ok(Self::ExternalObject),
            other => Err(TypeError::UnknownObjectType(other.to_string())),
        }
    }
}

/// The `y`/`n` boolean convention used by `disabled` and `deleted` columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    #[serde(rename = "y")]
    Yes,
    #[serde(rename = "n")]
    No,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "y",
            Self::No => "n",
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "y" => Ok(Self::Yes),
            "n" => Ok(Self::No),
            other => Err(TypeError::InvalidFlag(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_type_roundtrips_through_str() {
        for ty in [
            ObjectType::Object,
            ObjectType::Template,
            ObjectType::Apply,
            ObjectType::ExternalObject,
        ] {
            assert_eq!(ty.as_str().parse::<ObjectType>().unwrap(), ty);
        }
    }

    #[test]
    fn unknown_object_type_is_rejected() {
        let err = "blueprint".parse::<ObjectType>().unwrap_err();
        assert_eq!(err, TypeError::UnknownObjectType("blueprint".into()));
    }

    #[test]
    fn object_type_serializes_as_column_value() {
        let json = serde_json::to_string(&ObjectType::ExternalObject).unwrap();
        assert_eq!(json, "\"external_object\"");
    }

    #[test]
    fn flag_parses_only_y_and_n() {
        assert_eq!("y".parse::<Flag>().unwrap(), Flag::Yes);
        assert_eq!("n".parse::<Flag>().unwrap(), Flag::No);
        assert!("Y".parse::<Flag>().is_err());
        assert!("".parse::<Flag>().is_err());
    }

    #[test]
    fn flag_from_bool() {
        assert!(Flag::from(true).is_set());
        assert!(!Flag::from(false).is_set());
    }

    #[test]
    fn object_id_ordering_follows_integer() {
        assert!(ObjectId::new(1) < ObjectId::new(2));
        assert_eq!(format!("{}", ObjectId::new(42)), "42");
    }
}
