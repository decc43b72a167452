//! Playlist membership queries used for access decisions

use crate::error::Result;
use cratedrop_core::types::TrackId;
use sqlx::SqlitePool;

/// Whether the track sits in at least one playlist marked public
pub async fn contains_in_public(pool: &SqlitePool, track_id: &TrackId) -> Result<bool> {
    let found: i64 = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM playlist_tracks pt
            JOIN playlists p ON p.id = pt.playlist_id
            WHERE pt.track_id = ? AND p.is_public = 1
        )
        "#,
    )
    .bind(track_id.as_str())
    .fetch_one(pool)
    .await?;

    Ok(found != 0)
}
