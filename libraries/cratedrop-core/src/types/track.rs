/// Track record types
use super::{TrackId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded audio file plus its metadata record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub owner_user_id: UserId,
    pub original_filename: String,
    pub content_type: String,
    /// Size recorded at upload time. May be stale if the blob was rewritten.
    pub size_bytes: u64,
    /// Path of the blob relative to the storage root
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Track {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_user_id == user_id
    }

    /// What the streaming path needs to know about this track
    pub fn stream_target(&self) -> StreamTarget {
        StreamTarget {
            file_path: self.file_path.clone(),
            content_type: self.content_type.clone(),
            size_bytes: self.size_bytes,
        }
    }
}

/// Blob location and framing info resolved from a track record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTarget {
    pub file_path: String,
    pub content_type: String,
    pub size_bytes: u64,
}

impl StreamTarget {
    /// Whether the recorded size agrees with the live size of the blob
    pub fn size_matches(&self, live_size: u64) -> bool {
        self.size_bytes == live_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Track {
        let now = Utc::now();
        Track {
            id: TrackId::new("t-1"),
            owner_user_id: UserId::new("u-1"),
            original_filename: "song.mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            size_bytes: 1234,
            file_path: "library/user_u-1/track_t-1/t-1.mp3".to_string(),
            title: Some("Song".to_string()),
            artist: None,
            album: None,
            duration_seconds: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_stream_target_copies_framing_fields() {
        let track = sample();
        let target = track.stream_target();
        assert_eq!(target.file_path, track.file_path);
        assert_eq!(target.content_type, "audio/mpeg");
        assert!(target.size_matches(1234));
        assert!(!target.size_matches(1000));
    }

    #[test]
    fn test_ownership() {
        let track = sample();
        assert!(track.is_owned_by(&UserId::new("u-1")));
        assert!(!track.is_owned_by(&UserId::new("u-2")));
    }
}
