//! Snapshot reconciliation: diff a snapshot against the live graph and apply
//! the minimal set of room and anchor operations.
//!
//! A pass runs in four phases:
//!
//! 1. **Align** (optional): resolve the co-location transform. Any failure
//!    here returns before the graph is touched.
//! 2. **Normalize**: turn every snapshot room into a candidate [`Room`].
//!    Defective anchors are skipped with a warning; rooms without a layout go
//!    through the [`RoomGeometryBuilder`]; rooms that cannot be built are
//!    recorded as structural failures and left out of the pass. An anchor id
//!    still held by a live room that the pass keeps as is (unreported with
//!    removal off, or failed) is skipped, so every anchor has one owner.
//!    Normalize and match repeat until that set of held ids is stable.
//! 3. **Match**: each live room takes the first unconsumed candidate with its
//!    id (or, optionally, a matching floor footprint).
//! 4. **Apply**: updates, then removals, then creations.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::align::{resolve_alignment, AlignmentRequest};
use crate::builder::{BuilderConfig, BuilderInput, RoomGeometryBuilder};
use crate::error::{ReconcileWarning, Result, StructuralError};
use crate::events::{SceneEvent, SceneEventKind};
use crate::graph::SceneGraph;
use crate::label::AnchorLabel;
use crate::room::Room;
use crate::snapshot::{AnchorDefect, Snapshot, SnapshotRoom};

/// How live rooms are paired with snapshot rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomMatching {
    /// Same room id only.
    #[default]
    Uuid,
    /// Same room id, or else a floor outline matching within
    /// [`ReconcileConfig::footprint_tolerance`]. Catches re-scans that were
    /// assigned a fresh id.
    UuidOrFootprint,
}

/// Reconciliation settings.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Remove live rooms the snapshot no longer reports.
    pub remove_missing_rooms: bool,

    pub room_matching: RoomMatching,

    /// Max vertex distance for footprint matching (meters).
    pub footprint_tolerance: f32,

    /// Builder used for snapshot rooms without a layout.
    pub builder: BuilderConfig,

    /// Label the alignment reference anchor must carry.
    pub alignment_label: AnchorLabel,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            remove_missing_rooms: true,
            room_matching: RoomMatching::Uuid,
            footprint_tolerance: 0.05,
            builder: BuilderConfig::default(),
            alignment_label: AnchorLabel::FLOOR,
        }
    }
}

impl ReconcileConfig {
    #[must_use]
    pub fn with_remove_missing_rooms(mut self, remove: bool) -> Self {
        self.remove_missing_rooms = remove;
        self
    }

    #[must_use]
    pub fn with_room_matching(mut self, matching: RoomMatching) -> Self {
        self.room_matching = matching;
        self
    }

    #[must_use]
    pub fn with_footprint_tolerance(mut self, tolerance: f32) -> Self {
        self.footprint_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_builder(mut self, builder: BuilderConfig) -> Self {
        self.builder = builder;
        self
    }

    #[must_use]
    pub fn with_alignment_label(mut self, label: AnchorLabel) -> Self {
        self.alignment_label = label;
        self
    }
}

/// Everything a completed pass produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    /// Lifecycle events in emission order.
    pub events: Vec<SceneEvent>,
    /// Skipped anchors and ignored duplicate rooms.
    pub warnings: Vec<ReconcileWarning>,
    /// Rooms whose operation could not be carried out; left as they were.
    pub failures: Vec<StructuralError>,
}

impl ReconcileOutcome {
    /// No event was emitted.
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count(&self, kind: SceneEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }
}

/// Planned room operations, as indices into live rooms and candidates.
#[derive(Debug, Default)]
struct Plan {
    updates: Vec<(usize, usize)>,
    /// Live rooms paired with a candidate, changed or not.
    matched: HashSet<usize>,
    removals: HashSet<Uuid>,
    consumed: Vec<bool>,
}

/// Diffs snapshots against a [`SceneGraph`].
#[derive(Debug, Clone, Default)]
pub struct SceneGraphReconciler {
    config: ReconcileConfig,
    builder: RoomGeometryBuilder,
}

impl SceneGraphReconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        let builder = RoomGeometryBuilder::new(config.builder.clone());
        Self { config, builder }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Run one pass. Returns `Err` only for alignment failures, in which case
    /// `graph` is untouched.
    pub fn reconcile(
        &self,
        graph: &mut SceneGraph,
        snapshot: &Snapshot,
        alignment: Option<&AlignmentRequest>,
    ) -> Result<ReconcileOutcome> {
        let aligned;
        let snapshot = match alignment {
            Some(request) => {
                let transform = resolve_alignment(snapshot, request, self.config.alignment_label)?;
                aligned = snapshot.transformed(&transform);
                &aligned
            }
            None => snapshot,
        };

        // Anchor id -> live room that keeps it through this pass. Only grows,
        // and is bounded by the live anchors, so the loop ends.
        let mut held = HashMap::new();
        let (candidates, plan, mut outcome) = loop {
            let mut pass = ReconcileOutcome::default();
            let candidates = self.normalize(snapshot, &held, &mut pass);
            let failed: HashSet<Uuid> = pass.failures.iter().map(StructuralError::room).collect();
            let plan = self.plan(graph, &candidates, &failed);

            let before = held.len();
            held.extend(kept_anchors(graph, &plan));
            if held.len() == before {
                break (candidates, plan, pass);
            }
        };
        for warning in &outcome.warnings {
            warn!(%warning, "anchor skipped");
        }
        for failure in &outcome.failures {
            warn!(room = %failure.room(), error = %failure, "room left out of pass");
        }

        debug!(
            candidates = candidates.len(),
            updates = plan.updates.len(),
            removals = plan.removals.len(),
            "reconciliation plan"
        );

        for &(live, candidate) in &plan.updates {
            let room = &mut graph.rooms_mut()[live];
            apply_update(room, &candidates[candidate], &mut outcome.events);
        }

        if !plan.removals.is_empty() {
            let (removed, kept): (Vec<Room>, Vec<Room>) = std::mem::take(graph.rooms_mut())
                .into_iter()
                .partition(|room| plan.removals.contains(&room.id()));
            *graph.rooms_mut() = kept;
            for room in removed {
                debug!(room = %room.id(), "room removed");
                outcome.events.push(SceneEvent::RoomRemoved { room });
            }
        }

        for (candidate, _) in candidates
            .into_iter()
            .zip(plan.consumed)
            .filter(|(_, consumed)| !consumed)
        {
            if graph.contains_room(candidate.id()) {
                warn!(room = %candidate.id(), "duplicate room in snapshot ignored");
                outcome
                    .warnings
                    .push(ReconcileWarning::DuplicateRoom { room: candidate.id() });
                continue;
            }
            debug!(room = %candidate.id(), anchors = candidate.anchors().len(), "room created");
            graph.rooms_mut().push(candidate.clone());
            outcome.events.push(SceneEvent::RoomCreated { room: candidate });
        }

        info!(
            created = outcome.count(SceneEventKind::RoomCreated),
            updated = outcome.count(SceneEventKind::RoomUpdated),
            removed = outcome.count(SceneEventKind::RoomRemoved),
            warnings = outcome.warnings.len(),
            failures = outcome.failures.len(),
            "reconciliation pass complete"
        );

        Ok(outcome)
    }

    /// Turn snapshot rooms into candidate rooms. Anchor ids in `held` are
    /// skipped.
    fn normalize(
        &self,
        snapshot: &Snapshot,
        held: &HashMap<Uuid, Uuid>,
        outcome: &mut ReconcileOutcome,
    ) -> Vec<Room> {
        let mut seen = HashSet::new();
        let mut rooms = Vec::with_capacity(snapshot.rooms.len());
        for reported in &snapshot.rooms {
            match self.normalize_room(reported, held, &mut seen, &mut outcome.warnings) {
                Ok(room) => rooms.push(room),
                Err(failure) => outcome.failures.push(failure),
            }
        }
        rooms
    }

    fn normalize_room(
        &self,
        reported: &SnapshotRoom,
        held: &HashMap<Uuid, Uuid>,
        seen: &mut HashSet<Uuid>,
        warnings: &mut Vec<ReconcileWarning>,
    ) -> std::result::Result<Room, StructuralError> {
        if !reported.pose.is_finite() {
            return Err(StructuralError::NonFiniteRoomPose { room: reported.id });
        }

        let mut anchors = Vec::with_capacity(reported.anchors.len());
        let mut skipped = HashSet::new();

        for anchor in &reported.anchors {
            let resolved = if held.contains_key(&anchor.id) {
                Err(AnchorDefect::HeldByOtherRoom)
            } else if seen.insert(anchor.id) {
                anchor.resolve()
            } else {
                Err(AnchorDefect::DuplicateId)
            };
            match resolved {
                Ok(anchor) => anchors.push(anchor),
                Err(defect) => {
                    skipped.insert(anchor.id);
                    warnings.push(ReconcileWarning::AnchorSkipped {
                        room: reported.id,
                        anchor: anchor.id,
                        defect,
                    });
                }
            }
        }

        match &reported.layout {
            Some(layout) => {
                let missing = layout
                    .references()
                    .find(|id| !skipped.contains(id) && !anchors.iter().any(|a| a.id == *id));
                if let Some(anchor) = missing {
                    return Err(StructuralError::LayoutAnchorMissing {
                        room: reported.id,
                        anchor,
                    });
                }
                Ok(Room::from_parts(
                    reported.id,
                    reported.pose,
                    reported.is_local,
                    anchors,
                    layout.clone(),
                ))
            }
            None => self
                .builder
                .build(
                    reported.id,
                    reported.pose,
                    reported.is_local,
                    BuilderInput::classify(anchors),
                )
                .map_err(|source| StructuralError::Build {
                    room: reported.id,
                    source,
                }),
        }
    }

    fn plan(&self, graph: &SceneGraph, candidates: &[Room], failed: &HashSet<Uuid>) -> Plan {
        let mut plan = Plan {
            consumed: vec![false; candidates.len()],
            ..Default::default()
        };
        let live_ids: HashSet<Uuid> = graph.rooms().iter().map(Room::id).collect();

        for (index, live) in graph.rooms().iter().enumerate() {
            match self.find_match(live, candidates, &plan.consumed, &live_ids) {
                Some(candidate) => {
                    plan.consumed[candidate] = true;
                    plan.matched.insert(index);
                    if !live.same_contents(&candidates[candidate]) {
                        plan.updates.push((index, candidate));
                    }
                }
                None if failed.contains(&live.id()) => {
                    debug!(room = %live.id(), "room kept after failed operation");
                }
                None if self.config.remove_missing_rooms => {
                    plan.removals.insert(live.id());
                }
                None => {}
            }
        }
        plan
    }

    /// First unconsumed candidate in snapshot order.
    fn find_match(
        &self,
        live: &Room,
        candidates: &[Room],
        consumed: &[bool],
        live_ids: &HashSet<Uuid>,
    ) -> Option<usize> {
        let open = move || {
            candidates
                .iter()
                .enumerate()
                .filter(move |(i, _)| !consumed[*i])
        };

        if let Some((i, _)) = open().find(|(_, c)| c.id() == live.id()) {
            return Some(i);
        }
        if self.config.room_matching != RoomMatching::UuidOrFootprint {
            return None;
        }

        let outline = live.floor_outline();
        if outline.is_empty() {
            return None;
        }
        // A candidate with its own live room is never taken by footprint
        open()
            .find(|(_, c)| {
                !live_ids.contains(&c.id())
                    && atrium_geometry::outlines_match(
                        &outline,
                        &c.floor_outline(),
                        self.config.footprint_tolerance,
                    )
            })
            .map(|(i, candidate)| {
                debug!(live = %live.id(), candidate = %candidate.id(), "matched room by footprint");
                i
            })
    }
}

/// Anchors of live rooms the plan neither pairs nor removes, with their owner.
fn kept_anchors<'a>(graph: &'a SceneGraph, plan: &'a Plan) -> impl Iterator<Item = (Uuid, Uuid)> + 'a {
    graph
        .rooms()
        .iter()
        .enumerate()
        .filter(move |(index, room)| {
            !plan.matched.contains(index) && !plan.removals.contains(&room.id())
        })
        .flat_map(|(_, room)| room.anchors().iter().map(move |a| (a.id, room.id())))
}

/// Merge `candidate` into `room`: anchors created, then removed, then
/// updated, then the room itself.
fn apply_update(room: &mut Room, candidate: &Room, events: &mut Vec<SceneEvent>) {
    let room_id = room.id();

    let mut created = Vec::new();
    let mut updated = Vec::new();
    for anchor in candidate.anchors() {
        match room.anchor(anchor.id) {
            None => created.push(anchor.clone()),
            Some(existing) if existing != anchor => updated.push(anchor.clone()),
            Some(_) => {}
        }
    }
    let removed: Vec<Uuid> = room
        .anchors()
        .iter()
        .filter(|a| !candidate.contains_anchor(a.id))
        .map(|a| a.id)
        .collect();

    for anchor in created {
        room.insert_anchor(anchor.clone());
        events.push(SceneEvent::AnchorCreated {
            room: room_id,
            anchor,
        });
    }
    for id in removed {
        if let Some(anchor) = room.remove_anchor(id) {
            events.push(SceneEvent::AnchorRemoved {
                room: room_id,
                anchor,
            });
        }
    }
    for anchor in updated {
        room.replace_anchor(anchor.clone());
        events.push(SceneEvent::AnchorUpdated {
            room: room_id,
            anchor,
        });
    }

    room.set_pose(*candidate.pose());
    room.set_layout(candidate.layout().clone());
    debug!(room = %room_id, anchors = room.anchors().len(), "room updated");
    events.push(SceneEvent::RoomUpdated { room: room.clone() });
}
