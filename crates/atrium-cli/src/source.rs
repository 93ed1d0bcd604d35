//! Snapshot source backed by JSON documents on disk.

use std::path::{Path, PathBuf};

use atrium_scene::{FetchRequest, FetchResponse, FetchStatus, Snapshot, SnapshotSource};
use tracing::{debug, warn};

use crate::codec;

/// Reads one or more snapshot documents and reports their rooms as one
/// snapshot, in file order.
#[derive(Debug, Clone)]
pub struct FileSource {
    paths: Vec<PathBuf>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![path.into()],
        }
    }

    pub fn from_paths(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

async fn read_document(path: &Path) -> crate::Result<Snapshot> {
    let text = tokio::fs::read_to_string(path).await?;
    codec::deserialize(&text)
}

impl SnapshotSource for FileSource {
    async fn fetch(&self, request: &FetchRequest) -> FetchResponse {
        let mut rooms = Vec::new();
        for path in &self.paths {
            match read_document(path).await {
                Ok(snapshot) => {
                    debug!(path = %path.display(), rooms = snapshot.rooms.len(), "read snapshot document");
                    rooms.extend(snapshot.rooms);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable snapshot document");
                    return FetchResponse::failure(FetchStatus::DataInvalid);
                }
            }
        }
        // Shared requests are filtered by the caller; files hold no group info
        if let FetchRequest::Shared { group, .. } = request {
            debug!(%group, "serving shared request from files");
        }
        FetchResponse::success(Snapshot::new(rooms))
    }
}
