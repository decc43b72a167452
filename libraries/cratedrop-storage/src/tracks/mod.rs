//! Track record queries

use crate::error::{Result, StorageError};
use chrono::{DateTime, NaiveDateTime, Utc};
use cratedrop_core::types::{Track, TrackId, UserId};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

/// Fetch a single track by id
///
/// Returns `None` when no record exists.
pub async fn get_by_id(pool: &SqlitePool, id: &TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(
        r#"
        SELECT
            id, owner_user_id, original_filename, content_type, size_bytes,
            duration_seconds, title, artist, album, file_path,
            created_at, updated_at
        FROM tracks
        WHERE id = ?
        "#,
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(track_from_row).transpose()
}

fn track_from_row(row: &SqliteRow) -> Result<Track> {
    let size_bytes: i64 = row.try_get("size_bytes")?;
    let size_bytes = u64::try_from(size_bytes)
        .map_err(|_| StorageError::corrupt("tracks", format!("negative size_bytes {size_bytes}")))?;

    Ok(Track {
        id: TrackId::new(row.try_get::<String, _>("id")?),
        owner_user_id: UserId::new(row.try_get::<String, _>("owner_user_id")?),
        original_filename: row.try_get("original_filename")?,
        content_type: row.try_get("content_type")?,
        size_bytes,
        file_path: row.try_get("file_path")?,
        title: row.try_get("title")?,
        artist: row.try_get("artist")?,
        album: row.try_get("album")?,
        duration_seconds: row.try_get("duration_seconds")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

/// Read a timestamp column stored either as unix seconds or as text
///
/// Rows written by the Go backend carry `time.Time` values as TEXT
/// (`2006-01-02 15:04:05.999999999-07:00`); rows from the migrations here
/// default to INTEGER seconds.
fn timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    if let Ok(secs) = row.try_get::<i64, _>(column) {
        return DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| StorageError::corrupt("tracks", format!("invalid {column} {secs}")));
    }

    let text: String = row.try_get(column)?;
    parse_timestamp(&text)
        .ok_or_else(|| StorageError::corrupt("tracks", format!("unparseable {column} {text:?}")))
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    // Go's time.Time.String() appends the zone name after the offset
    let text = text.strip_suffix(" UTC").unwrap_or(text);

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f %z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    None
}
