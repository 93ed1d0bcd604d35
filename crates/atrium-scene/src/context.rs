//! The host context that owns a live graph.
//!
//! One context, one graph. Consumers read it through [`SceneContext::read`]
//! and follow changes through [`SceneContext::subscribe`]. Only one pass may
//! be in flight at a time, from the start of its fetch to the end of its
//! apply; a second pass is rejected with [`Error::PassInProgress`] rather
//! than queued.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{broadcast, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use crate::align::AlignmentRequest;
use crate::error::{Error, Result};
use crate::events::SceneEvent;
use crate::graph::SceneGraph;
use crate::reconcile::{ReconcileConfig, ReconcileOutcome, SceneGraphReconciler};
use crate::snapshot::Snapshot;
use crate::source::{FetchRequest, SharedRoomsRequest, SnapshotSource};

/// Events a subscriber may fall behind by before it starts losing them.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Result of loading from a source.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The source succeeded but reported no rooms. The graph is unchanged.
    NoRoomsFound,
    Reconciled(ReconcileOutcome),
}

/// Clears the in-progress flag when a pass ends, however it ends.
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owner of one live room graph.
pub struct SceneContext {
    graph: RwLock<SceneGraph>,
    reconciler: SceneGraphReconciler,
    events_tx: broadcast::Sender<SceneEvent>,
    pass_active: AtomicBool,
}

impl SceneContext {
    pub fn new(config: ReconcileConfig) -> Self {
        Self::with_event_capacity(config, DEFAULT_EVENT_CAPACITY)
    }

    /// A context whose event channel buffers `capacity` events per
    /// subscriber.
    pub fn with_event_capacity(config: ReconcileConfig, capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            graph: RwLock::new(SceneGraph::new()),
            reconciler: SceneGraphReconciler::new(config),
            events_tx,
            pass_active: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ReconcileConfig {
        self.reconciler.config()
    }

    /// Receive every lifecycle event in emission order.
    pub fn subscribe(&self) -> broadcast::Receiver<SceneEvent> {
        self.events_tx.subscribe()
    }

    /// Read access to the graph. Waits for an apply phase to finish.
    pub async fn read(&self) -> RwLockReadGuard<'_, SceneGraph> {
        self.graph.read().await
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.graph.read().await.to_snapshot()
    }

    pub fn is_pass_active(&self) -> bool {
        self.pass_active.load(Ordering::Acquire)
    }

    /// Fetch the device's own rooms and reconcile them.
    pub async fn load_from_source<S: SnapshotSource>(&self, source: &S) -> Result<LoadOutcome> {
        let _guard = self.begin_pass()?;
        let snapshot = fetch(source, &FetchRequest::Local).await?;
        self.reconcile_fetched(snapshot, None).await
    }

    /// Fetch rooms shared in a co-located group, drop what was over-returned,
    /// align if requested and reconcile.
    pub async fn load_shared<S: SnapshotSource>(
        &self,
        source: &S,
        request: &SharedRoomsRequest,
    ) -> Result<LoadOutcome> {
        let _guard = self.begin_pass()?;
        let snapshot = fetch(source, &request.fetch_request()).await?;
        let snapshot = request.filter(snapshot);
        self.reconcile_fetched(snapshot, request.alignment.as_ref())
            .await
    }

    /// Reconcile a snapshot that is already in hand.
    pub async fn apply_snapshot(
        &self,
        snapshot: &Snapshot,
        alignment: Option<&AlignmentRequest>,
    ) -> Result<ReconcileOutcome> {
        let _guard = self.begin_pass()?;
        self.apply(snapshot, alignment).await
    }

    /// Remove every room.
    pub async fn clear(&self) -> Result<Vec<SceneEvent>> {
        let _guard = self.begin_pass()?;
        let events = self.graph.write().await.clear();
        info!(removed = events.len(), "cleared all rooms");
        self.publish(&events);
        Ok(events)
    }

    fn begin_pass(&self) -> Result<PassGuard<'_>> {
        self.pass_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                warn!("rejected reconciliation pass: another pass is in progress");
                Error::PassInProgress
            })?;
        Ok(PassGuard(&self.pass_active))
    }

    async fn reconcile_fetched(
        &self,
        snapshot: Snapshot,
        alignment: Option<&AlignmentRequest>,
    ) -> Result<LoadOutcome> {
        if snapshot.is_empty() {
            info!("source reported no rooms");
            return Ok(LoadOutcome::NoRoomsFound);
        }
        self.apply(&snapshot, alignment)
            .await
            .map(LoadOutcome::Reconciled)
    }

    async fn apply(
        &self,
        snapshot: &Snapshot,
        alignment: Option<&AlignmentRequest>,
    ) -> Result<ReconcileOutcome> {
        let outcome = {
            let mut graph = self.graph.write().await;
            self.reconciler.reconcile(&mut graph, snapshot, alignment)?
        };
        self.publish(&outcome.events);
        Ok(outcome)
    }

    fn publish(&self, events: &[SceneEvent]) {
        for event in events {
            // No subscribers is fine
            let _ = self.events_tx.send(event.clone());
        }
        debug!(count = events.len(), "published scene events");
    }
}

impl Default for SceneContext {
    fn default() -> Self {
        Self::new(ReconcileConfig::default())
    }
}

async fn fetch<S: SnapshotSource>(source: &S, request: &FetchRequest) -> Result<Snapshot> {
    let response = source.fetch(request).await;
    if !response.status.is_success() {
        warn!(status = %response.status, "snapshot fetch failed");
        return Err(Error::Source(response.status));
    }
    debug!(rooms = response.snapshot.rooms.len(), "snapshot fetched");
    Ok(response.snapshot)
}
