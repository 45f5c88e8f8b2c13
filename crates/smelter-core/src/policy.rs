//! Conflict policies for bulk upserts.
//!
//! The policy decides what the generated `ON CONFLICT` clause does when an
//! incoming row collides with an existing primary key. It is a closed enum:
//! dialect engines branch on it with a plain `match`, never by reflecting
//! over strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// How conflicting rows are handled by the generated statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConflictPolicy {
    /// Conflicting rows are skipped; existing rows keep their values.
    #[default]
    Nothing,
    /// Conflicting rows overwrite every non-key column with the incoming
    /// value.
    Update,
}

impl ConflictPolicy {
    /// Canonical lowercase name, as parsed by [`FromStr`] and emitted by
    /// serde.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nothing => "nothing",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a conflict policy name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized conflict policy '{input}', expected 'nothing' or 'update'")]
pub struct InvalidPolicy {
    /// The input that failed to parse.
    pub input: String,
}

impl FromStr for ConflictPolicy {
    type Err = InvalidPolicy;

    /// Parses a policy name case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("nothing") {
            Ok(Self::Nothing)
        } else if s.eq_ignore_ascii_case("update") {
            Ok(Self::Update)
        } else {
            Err(InvalidPolicy {
                input: String::from(s),
            })
        }
    }
}

impl Serialize for ConflictPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConflictPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
