use resonance_common::{AttractorId, EntityId, StateError};

/// Errors from kernel operations.
///
/// Every failing operation leaves the world exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),
    #[error("attractor {0} not found")]
    AttractorNotFound(AttractorId),
    #[error("duplicate entity id: {0}")]
    DuplicateEntity(EntityId),
    #[error("duplicate attractor id: {0}")]
    DuplicateAttractor(AttractorId),
    #[error("entity {0} has not reached the crystal phase")]
    NotCrystalline(EntityId),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    State(#[from] StateError),
}

pub type Result<T> = std::result::Result<T, KernelError>;
