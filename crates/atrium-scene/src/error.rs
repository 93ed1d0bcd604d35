//! Error types for atrium-scene.
//!
//! Failures fall into four groups:
//!
//! - source failures ([`Error::Source`]) are surfaced verbatim, never retried;
//! - alignment precondition failures abort the pass before any mutation;
//! - per-anchor defects are [`ReconcileWarning`]s, the anchor is skipped;
//! - structural impossibilities ([`StructuralError`]) fail one room's
//!   operation and leave that room as it was.

use atrium_geometry::GeometryError;
use thiserror::Error;
use uuid::Uuid;

use crate::label::AnchorLabel;
use crate::snapshot::AnchorDefect;
use crate::source::FetchStatus;

/// Result type for atrium-scene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a whole operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The snapshot source reported a failure status.
    #[error("snapshot source failed: {0}")]
    Source(FetchStatus),

    /// The alignment reference anchor is not in the snapshot.
    #[error("alignment reference anchor {0} not found in snapshot")]
    AlignmentReferenceMissing(Uuid),

    /// The alignment reference anchor was reported without a usable pose.
    #[error("alignment reference anchor {0} has no resolved pose")]
    AlignmentReferenceUnresolved(Uuid),

    /// The alignment reference anchor does not carry the expected label.
    #[error("alignment reference anchor {anchor} is labeled {found}, expected {expected}")]
    AlignmentReferenceMislabeled {
        anchor: Uuid,
        expected: AnchorLabel,
        found: AnchorLabel,
    },

    /// The receiver's pose for the reference anchor, or the transform derived
    /// from it, is not finite.
    #[error("alignment for reference anchor {0} is not finite")]
    AlignmentNonFinite(Uuid),

    /// Another reconciliation pass holds the graph.
    #[error("a reconciliation pass is already in progress")]
    PassInProgress,
}

impl Error {
    /// Whether this is an alignment precondition failure.
    pub fn is_alignment_failure(&self) -> bool {
        matches!(
            self,
            Self::AlignmentReferenceMissing(_)
                | Self::AlignmentReferenceUnresolved(_)
                | Self::AlignmentReferenceMislabeled { .. }
                | Self::AlignmentNonFinite(_)
        )
    }
}

/// Why the room builder rejected its input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("a wall loop needs at least 3 walls, got {found}")]
    TooFewWalls { found: usize },

    #[error("wall {0} has no planar bounds")]
    WallWithoutPlane(Uuid),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// A room-level operation that could not be carried out.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("room {room} layout references anchor {anchor} which the room does not report")]
    LayoutAnchorMissing { room: Uuid, anchor: Uuid },

    #[error("room {room} has a non-finite room anchor pose")]
    NonFiniteRoomPose { room: Uuid },

    #[error("room {room} could not be built: {source}")]
    Build {
        room: Uuid,
        #[source]
        source: BuildError,
    },
}

impl StructuralError {
    pub fn room(&self) -> Uuid {
        match self {
            Self::LayoutAnchorMissing { room, .. }
            | Self::NonFiniteRoomPose { room }
            | Self::Build { room, .. } => *room,
        }
    }
}

/// A recoverable problem recorded during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileWarning {
    /// A reported anchor was skipped.
    AnchorSkipped {
        room: Uuid,
        anchor: Uuid,
        defect: AnchorDefect,
    },
    /// A snapshot room repeated an id already taken in the graph.
    DuplicateRoom { room: Uuid },
}

impl std::fmt::Display for ReconcileWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AnchorSkipped {
                room,
                anchor,
                defect,
            } => write!(f, "anchor {anchor} in room {room} skipped: {defect}"),
            Self::DuplicateRoom { room } => write!(f, "duplicate room {room} ignored"),
        }
    }
}
