use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a simulated entity.
///
/// Ids are chosen by the caller; uniqueness is enforced by the world at spawn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unique identifier for a static field source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttractorId(pub String);

impl AttractorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id given to the attractor an entity crystallizes into.
    pub fn frozen(entity: &EntityId) -> Self {
        Self(format!("frozen_{}", entity.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttractorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttractorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AttractorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
