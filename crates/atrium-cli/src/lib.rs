//! Atrium CLI
//!
//! File-backed tooling around the room scene graph: a JSON codec for
//! snapshot and scene documents, a [`FileSource`] and environment
//! configuration for the `atrium` binary.

pub mod codec;
pub mod config;
pub mod error;
pub mod source;

pub use codec::{CoordinateSystem, SceneDocument, SnapshotDocument};
pub use config::CliConfig;
pub use error::{Error, Result};
pub use source::FileSource;
