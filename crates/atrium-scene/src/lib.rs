//! Atrium Scene
//!
//! In-memory graph of rooms for mixed-reality sessions, kept in sync with
//! snapshots from an external spatial-data source.
//!
//! # Overview
//!
//! ## Reconciliation
//!
//! The [`SceneGraphReconciler`] diffs a [`Snapshot`] against the live
//! [`SceneGraph`] and applies the minimal set of operations:
//!
//! - **Identity preservation**: an anchor that moves is updated, never
//!   removed and recreated
//! - **Idempotence**: reconciling the same snapshot twice emits nothing the
//!   second time
//! - **Fixed event order**: room updates (each after its anchor events), then
//!   removals, then creations
//! - **Atomic alignment**: a failed co-location precondition leaves the graph
//!   untouched
//!
//! ## Room Geometry
//!
//! The [`RoomGeometryBuilder`] turns an unordered, imprecise set of walls into
//! a closed clockwise wall loop with derived floor and ceiling.
//!
//! ## Hosting
//!
//! A [`SceneContext`] owns one graph, admits one pass at a time and broadcasts
//! lifecycle events to subscribers.
//!
//! # Example
//!
//! ```rust,ignore
//! use atrium_scene::{LoadOutcome, ReconcileConfig, SceneContext};
//!
//! let ctx = SceneContext::new(ReconcileConfig::default().with_remove_missing_rooms(false));
//! let mut events = ctx.subscribe();
//!
//! match ctx.load_from_source(&device_source).await? {
//!     LoadOutcome::NoRoomsFound => println!("scan a room first"),
//!     LoadOutcome::Reconciled(outcome) => println!("{} events", outcome.events.len()),
//! }
//!
//! let graph = ctx.read().await;
//! let here = graph.current_room(viewer_position);
//! ```

mod align;
mod anchor;
mod authored;
mod builder;
mod context;
mod error;
mod events;
mod graph;
mod label;
mod reconcile;
mod room;
mod snapshot;
mod source;
mod world_lock;

pub use align::{resolve_alignment, AlignmentRequest};
pub use anchor::{Anchor, PlaneBounds};
pub use authored::{authored_snapshot, build_authored_room, SceneNode, VisitedNode};
pub use builder::{BuilderConfig, BuilderInput, RoomGeometryBuilder, VolumeConvention};
pub use context::{LoadOutcome, SceneContext, DEFAULT_EVENT_CAPACITY};
pub use error::{BuildError, Error, ReconcileWarning, Result, StructuralError};
pub use events::{SceneEvent, SceneEventKind};
pub use graph::SceneGraph;
pub use label::AnchorLabel;
pub use reconcile::{ReconcileConfig, ReconcileOutcome, RoomMatching, SceneGraphReconciler};
pub use room::{Room, RoomLayout};
pub use snapshot::{AnchorDefect, Snapshot, SnapshotAnchor, SnapshotRoom};
pub use source::{
    FetchRequest, FetchResponse, FetchStatus, SharedRoomsRequest, SnapshotSource, StaticSource,
};
pub use world_lock::WorldLock;

/// Re-exported so downstream crates name one geometry version.
pub use atrium_geometry as geometry;
