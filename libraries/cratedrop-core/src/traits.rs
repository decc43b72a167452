/// Collaborator traits consumed by the streaming server
use crate::error::Result;
use crate::types::{Track, TrackId};
use async_trait::async_trait;

/// Read-only view of the track catalog
///
/// The streaming path only needs to resolve a track record and answer
/// whether the track is reachable through a public playlist. Everything
/// else about tracks and playlists lives behind other services.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Look up a track by id, `None` when no record exists
    async fn get_track(&self, id: &TrackId) -> Result<Option<Track>>;

    /// Whether the track belongs to at least one playlist marked public
    async fn is_in_public_playlist(&self, id: &TrackId) -> Result<bool>;
}
