use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Access level granted to a principal on a space.
///
/// Ordered by privilege (`Read < Write`) so callers can compare levels;
/// no implicit hierarchy is enforced by the client itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AclType {
    Read,
    Write,
}

impl AclType {
    /// Wire form of the access level.
    pub fn as_str(&self) -> &'static str {
        match self {
            AclType::Read => "READ",
            AclType::Write => "WRITE",
        }
    }
}

impl fmt::Display for AclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown access level: {0}")]
pub struct ParseAclError(pub String);

impl FromStr for AclType {
    type Err = ParseAclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READ" => Ok(AclType::Read),
            "WRITE" => Ok(AclType::Write),
            other => Err(ParseAclError(other.to_string())),
        }
    }
}

/// ACL mapping from principal id to access level.
pub type AclMap = BTreeMap<String, AclType>;
