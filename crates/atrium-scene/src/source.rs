//! The boundary with whatever produces snapshots: an on-device scan, an
//! imported file, a remote party in a shared session.

use std::collections::HashSet;
use std::future::Future;

use tracing::debug;
use uuid::Uuid;

use crate::align::AlignmentRequest;
use crate::snapshot::Snapshot;

/// Result status reported by a snapshot source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FetchStatus {
    Success,
    NoPermission,
    InsufficientResources,
    InsufficientView,
    PermissionInsufficient,
    RateLimited,
    TooDark,
    TooBright,
    DataInvalid,
}

impl FetchStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Success => "success",
            Self::NoPermission => "no permission",
            Self::InsufficientResources => "insufficient resources",
            Self::InsufficientView => "insufficient view",
            Self::PermissionInsufficient => "permission insufficient",
            Self::RateLimited => "rate limited",
            Self::TooDark => "too dark",
            Self::TooBright => "too bright",
            Self::DataInvalid => "data invalid",
        };
        f.write_str(text)
    }
}

/// What to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    /// Rooms captured on this device.
    Local,
    /// Rooms shared within a co-located group.
    Shared { group: Uuid, rooms: Vec<Uuid> },
}

/// A source's answer. `snapshot` is only meaningful on success.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: FetchStatus,
    pub snapshot: Snapshot,
}

impl FetchResponse {
    pub fn success(snapshot: Snapshot) -> Self {
        Self {
            status: FetchStatus::Success,
            snapshot,
        }
    }

    pub fn failure(status: FetchStatus) -> Self {
        Self {
            status,
            snapshot: Snapshot::default(),
        }
    }
}

/// Asynchronous producer of snapshots. Cancellation and retry are the
/// source's business.
pub trait SnapshotSource {
    fn fetch(&self, request: &FetchRequest) -> impl Future<Output = FetchResponse> + Send;
}

/// A source that always answers with the same response.
#[derive(Debug, Clone)]
pub struct StaticSource {
    response: FetchResponse,
}

impl StaticSource {
    pub fn new(response: FetchResponse) -> Self {
        Self { response }
    }

    pub fn snapshot(snapshot: Snapshot) -> Self {
        Self::new(FetchResponse::success(snapshot))
    }
}

impl SnapshotSource for StaticSource {
    async fn fetch(&self, _request: &FetchRequest) -> FetchResponse {
        self.response.clone()
    }
}

/// Request for rooms shared in a co-located session.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedRoomsRequest {
    pub group: Uuid,
    pub rooms: Vec<Uuid>,
    /// Anchor to align on, if the rooms were captured in another frame.
    pub alignment: Option<AlignmentRequest>,
}

impl SharedRoomsRequest {
    pub fn new(group: Uuid, rooms: Vec<Uuid>) -> Self {
        Self {
            group,
            rooms,
            alignment: None,
        }
    }

    #[must_use]
    pub fn with_alignment(mut self, alignment: AlignmentRequest) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest::Shared {
            group: self.group,
            rooms: self.rooms.clone(),
        }
    }

    /// Drop what the source over-returned: rooms that were not asked for and
    /// rooms without a layout component.
    pub fn filter(&self, snapshot: Snapshot) -> Snapshot {
        let wanted: HashSet<Uuid> = self.rooms.iter().copied().collect();
        let before = snapshot.rooms.len();
        let rooms: Vec<_> = snapshot
            .rooms
            .into_iter()
            .filter(|room| wanted.contains(&room.id) && room.layout.is_some())
            .collect();
        if rooms.len() != before {
            debug!(
                group = %self.group,
                dropped = before - rooms.len(),
                "dropped over-returned shared rooms"
            );
        }
        Snapshot::new(rooms)
    }
}
