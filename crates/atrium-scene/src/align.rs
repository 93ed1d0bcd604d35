//! Co-location: bring a snapshot captured in another party's frame into ours.

use atrium_geometry::{Pose, RigidTransform};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::label::AnchorLabel;
use crate::snapshot::Snapshot;

/// "Anchor `reference_anchor` is at `target_pose` in my world."
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignmentRequest {
    pub reference_anchor: Uuid,
    pub target_pose: Pose,
}

impl AlignmentRequest {
    pub fn new(reference_anchor: Uuid, target_pose: Pose) -> Self {
        Self {
            reference_anchor,
            target_pose,
        }
    }
}

/// Compute the transform that maps `snapshot` into the receiver's frame.
///
/// The reference anchor must be present, have a resolved pose and carry
/// `required` (any of its bits), and the target pose must be finite.
/// Nothing is mutated on failure.
pub fn resolve_alignment(
    snapshot: &Snapshot,
    request: &AlignmentRequest,
    required: AnchorLabel,
) -> Result<RigidTransform> {
    let id = request.reference_anchor;
    let anchor = snapshot
        .find_anchor(id)
        .ok_or(Error::AlignmentReferenceMissing(id))?;

    if !anchor.label.intersects(required) {
        return Err(Error::AlignmentReferenceMislabeled {
            anchor: id,
            expected: required,
            found: anchor.label,
        });
    }

    let local = anchor
        .pose
        .filter(Pose::is_finite)
        .ok_or(Error::AlignmentReferenceUnresolved(id))?;

    let transform = RigidTransform::align(&local, &request.target_pose);
    if !request.target_pose.is_finite() || !transform.is_finite() {
        return Err(Error::AlignmentNonFinite(id));
    }
    debug!(anchor = %id, ?transform, "resolved alignment");
    Ok(transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{SnapshotAnchor, SnapshotRoom};
    use glam::{Quat, Vec3};

    fn snapshot_with(anchor: SnapshotAnchor) -> Snapshot {
        let mut room = SnapshotRoom::new(Uuid::new_v4(), Pose::IDENTITY, false);
        room.anchors.push(anchor);
        Snapshot::new(vec![room])
    }

    fn floor_at(pose: Option<Pose>) -> SnapshotAnchor {
        SnapshotAnchor {
            id: Uuid::new_v4(),
            label: AnchorLabel::FLOOR,
            pose,
            plane: None,
            volume: None,
        }
    }

    #[test]
    fn aligned_reference_lands_on_target() {
        let local = Pose::new(Vec3::new(1.0, 0.0, 2.0), Quat::from_rotation_y(0.3));
        let anchor = floor_at(Some(local));
        let target = Pose::new(Vec3::new(-4.0, 0.0, 0.5), Quat::from_rotation_y(1.2));
        let request = AlignmentRequest::new(anchor.id, target);

        let t = resolve_alignment(&snapshot_with(anchor), &request, AnchorLabel::FLOOR).unwrap();
        assert!(t.apply_pose(&local).abs_diff_eq(&target, 1e-5));
    }

    #[test]
    fn missing_reference_fails() {
        let request = AlignmentRequest::new(Uuid::new_v4(), Pose::IDENTITY);
        let err = resolve_alignment(&snapshot_with(floor_at(Some(Pose::IDENTITY))), &request, AnchorLabel::FLOOR)
            .unwrap_err();
        assert!(matches!(err, Error::AlignmentReferenceMissing(_)));
        assert!(err.is_alignment_failure());
    }

    #[test]
    fn mislabeled_reference_fails() {
        let anchor = SnapshotAnchor {
            label: AnchorLabel::TABLE,
            ..floor_at(Some(Pose::IDENTITY))
        };
        let request = AlignmentRequest::new(anchor.id, Pose::IDENTITY);
        let err = resolve_alignment(&snapshot_with(anchor), &request, AnchorLabel::FLOOR).unwrap_err();
        assert!(matches!(
            err,
            Error::AlignmentReferenceMislabeled { found, .. } if found == AnchorLabel::TABLE
        ));
    }

    #[test]
    fn unresolved_reference_fails() {
        let anchor = floor_at(None);
        let request = AlignmentRequest::new(anchor.id, Pose::IDENTITY);
        let err = resolve_alignment(&snapshot_with(anchor), &request, AnchorLabel::FLOOR).unwrap_err();
        assert!(matches!(err, Error::AlignmentReferenceUnresolved(_)));
    }

    #[test]
    fn non_finite_target_fails() {
        let anchor = floor_at(Some(Pose::IDENTITY));
        let target = Pose::from_position(Vec3::new(f32::NAN, 0.0, 0.0));
        let request = AlignmentRequest::new(anchor.id, target);
        let err = resolve_alignment(&snapshot_with(anchor), &request, AnchorLabel::FLOOR).unwrap_err();
        assert!(matches!(err, Error::AlignmentNonFinite(_)));
        assert!(err.is_alignment_failure());
    }

    #[test]
    fn degenerate_target_rotation_fails() {
        let anchor = floor_at(Some(Pose::IDENTITY));
        let target = Pose::new(Vec3::ZERO, Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        let request = AlignmentRequest::new(anchor.id, target);
        let err = resolve_alignment(&snapshot_with(anchor), &request, AnchorLabel::FLOOR).unwrap_err();
        assert!(matches!(err, Error::AlignmentNonFinite(_)));
    }
}
