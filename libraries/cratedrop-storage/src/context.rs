/// `TrackCatalog` backed by the CrateDrop `SQLite` database
use async_trait::async_trait;
use cratedrop_core::{Result, Track, TrackCatalog, TrackId};
use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TrackCatalog for SqliteCatalog {
    async fn get_track(&self, id: &TrackId) -> Result<Option<Track>> {
        Ok(crate::tracks::get_by_id(&self.pool, id).await?)
    }

    async fn is_in_public_playlist(&self, id: &TrackId) -> Result<bool> {
        Ok(crate::playlists::contains_in_public(&self.pool, id).await?)
    }
}
