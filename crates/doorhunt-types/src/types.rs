//! Identity types and the operation outcome tag.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Newtype over `u64` so a player id can never be confused with any other
/// number flowing through the engine. Serializes as the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifier of an arena.
///
/// Arena ids are case-insensitive: [`ArenaId::new`] lowercases the input,
/// so `"Mansion"` and `"mansion"` address the same arena. Deserialization
/// normalizes the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct ArenaId(String);

impl ArenaId {
    /// Creates a normalized (lowercase, trimmed) arena id.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ArenaId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&str> for ArenaId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// An opaque reference to a world position.
///
/// The engine stores and forwards these but never inspects them. What the
/// string means (a serialized coordinate, a named waypoint) is up to the
/// roster collaborator that performs the relocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationRef(pub String);

impl LocationRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }
}

impl fmt::Display for LocationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The side a participant plays on once roles are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Pursues and eliminates evaders.
    Hunter,
    /// Tries to survive until the pursuit timer runs out.
    Evader,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hunter => f.write_str("hunter"),
            Self::Evader => f.write_str("evader"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The success side of every mutating operation.
///
/// Rejections travel in each layer's error enum. `Ignored` is not a
/// failure: it marks a request that raced with a state change (an
/// elimination arriving after the round ended, a force-end on an idle
/// arena) and was deliberately dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The request changed session state.
    Applied,
    /// The request was valid to send but had nothing to act on.
    Ignored,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}
