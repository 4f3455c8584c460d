//! Errors produced while stitching, numbering, and remapping meshes.

use thiserror::Error;

/// Result type alias for mesh construction.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while building a [`Mesh`](crate::topology::Mesh) or one of its templates.
///
/// All of these are terminal for the construction in progress; a partially built mesh should be discarded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// A local point reference names an element or slot that does not exist
    #[error(
        "Local point ({elem_id}, {slot}) does not exist (mesh has {num_elements} elements, element has {num_slots} points); Cannot reference it!"
    )]
    InvalidReference {
        elem_id: usize,
        slot: usize,
        num_elements: usize,
        num_slots: usize,
    },

    /// A remap table is not a bijection over the global parameters
    #[error("Remap table is not a bijection: {0}")]
    IncompleteRemap(#[from] RemapError),

    /// A builder argument is out of its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// `finalize` was called on a mesh that already has global parameters
    #[error("Mesh '{0}' has already been finalized; Cannot change its topology or renumber it from scratch!")]
    AlreadyFinalized(String),

    /// An operation requiring global parameters was called before `finalize`
    #[error("Mesh '{0}' has not been finalized; Global parameters do not exist yet!")]
    NotFinalized(String),

    /// A second remap was requested
    #[error("Mesh '{0}' has already been remapped; Remaps can only be applied once!")]
    AlreadyRemapped(String),

    /// A mesh was embedded into a parent before its numbering was frozen
    #[error("Sub-mesh '{0}' must be finalized before it is added to another mesh!")]
    UnfinalizedSubMesh(String),
}

impl MeshError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(details: impl Into<String>) -> Self {
        Self::InvalidParameter(details.into())
    }
}

/// Reasons a remap table fails bijectivity validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RemapError {
    #[error("table has {found} entries but the mesh has {expected} global parameters")]
    WrongSize { expected: usize, found: usize },
    #[error("source id {id} is outside 0..{len}")]
    SourceOutOfRange { id: usize, len: usize },
    #[error("target id {id} is outside 0..{len}")]
    TargetOutOfRange { id: usize, len: usize },
    #[error("source id {0} appears more than once")]
    DuplicateSource(usize),
    #[error("target id {0} is assigned to more than one source")]
    DuplicateTarget(usize),
    #[error("source id {0} has no target")]
    MissingSource(usize),
    #[error("source id {source_id} was derived as both {first} and {second}")]
    Conflict {
        source_id: usize,
        first: usize,
        second: usize,
    },
}
