use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Opaque identifier of a branch.
///
/// Branch tokens are compared as raw bytes by the store (`branch_uuid` is a
/// binary column), never as text. The hex and hyphenated forms exist only
/// for humans and configuration files.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(Uuid);

impl BranchId {
    /// Create a fresh time-ordered branch id.
    pub fn ephemeral() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// The raw 16 bytes, as stored in `branch_uuid`.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Full lowercase hex encoding without separators.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("br:{}", hex::encode(&self.as_bytes()[..4]))
    }

    /// Parse a plain hex string (32 characters) or a hyphenated UUID.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("br:").unwrap_or(s);
        if s.contains('-') {
            return Uuid::parse_str(s)
                .map(Self)
                .map_err(|e| TypeError::InvalidHex(e.to_string()));
        }
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 16 {
            return Err(TypeError::InvalidLength {
                expected: 16,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(&bytes);
        Ok(Self::from_bytes(arr))
    }
}

impl From<Uuid> for BranchId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for BranchId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BranchId({})", self.short_id())
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ephemeral_ids_are_unique() {
        assert_ne!(BranchId::ephemeral(), BranchId::ephemeral());
    }

    #[test]
    fn parses_plain_hex() {
        let id = BranchId::from_bytes([0xab; 16]);
        let parsed = BranchId::parse(&id.to_hex()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parses_hyphenated_uuid() {
        let id = BranchId::from_bytes([7; 16]);
        let parsed: BranchId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parses_short_prefix_form_of_full_hex() {
        let id = BranchId::from_bytes([1; 16]);
        let parsed = BranchId::parse(&format!("br:{}", id.to_hex())).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = BranchId::parse("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 16,
                actual: 2
            }
        );
    }

    #[test]
    fn rejects_non_hex() {
        assert!(matches!(
            BranchId::parse("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn short_id_format() {
        let id = BranchId::from_bytes([0; 16]);
        assert_eq!(id.short_id(), "br:00000000");
    }
}
