//! # External Collaborator Contracts
//!
//! Narrow trait contracts for everything the offline-first core consumes but
//! does not own: the remote relational catalog (source of truth for metadata)
//! and the per-item media storage primitives (download/delete/status).
//!
//! Payloads crossing these boundaries are explicit DTOs that validate their
//! shape on arrival instead of trusting the call site.

pub mod dto;
pub mod error;
pub mod media;
pub mod remote;

pub use dto::{
    RemoteLikedSong, RemotePlaylist, RemotePlaylistEntry, RemoteSong, RemoteSpotlight, SectionKind,
};
pub use error::{BridgeError, Result};
pub use media::{DownloadOutcome, DownloadRequest, MediaStatus, MediaStore};
pub use remote::RemoteCatalog;
