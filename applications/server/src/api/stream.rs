/// Audio streaming and download API
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    services::access,
    state::AppState,
    streaming::{responder, ByteRange, RangeError, RangeSpec},
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::Response,
};
use cratedrop_core::{StreamTarget, Track, TrackId};

/// GET /api/tracks/:id/stream
/// Serve one bounded chunk of a track's audio, always as 206
pub async fn stream_track(
    Path(track_id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    headers: HeaderMap,
) -> Result<Response> {
    let track = authorized_track(&app_state, &auth, TrackId::new(track_id)).await?;

    // Syntax is checked before storage is touched
    let spec = match headers.get(header::RANGE) {
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| ServerError::range(RangeError::Malformed, None))?;
            Some(RangeSpec::parse(raw).map_err(|e| ServerError::range(e, None))?)
        }
        None => None,
    };

    let target = track.stream_target();
    let blob = open_blob(&app_state, &track, &target).await?;
    let size = blob.size;

    let policy = &app_state.stream_policy;
    let range = match spec {
        Some(spec) => spec.resolve(size, &policy.chunks),
        None => ByteRange::initial(size, &policy.chunks),
    }
    .map_err(|e| ServerError::range(e, Some(size)))?;

    tracing::debug!(
        track_id = %track.id,
        start = range.start,
        end = range.end,
        size,
        explicit = spec.is_some(),
        "Serving audio range"
    );

    responder::partial_content(blob, range, &target.content_type, policy).await
}

/// GET /api/tracks/:id/download
/// Whole file as an attachment
pub async fn download_track(
    Path(track_id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Response> {
    let track = authorized_track(&app_state, &auth, TrackId::new(track_id)).await?;
    let target = track.stream_target();
    let blob = open_blob(&app_state, &track, &target).await?;

    tracing::info!(track_id = %track.id, size = blob.size, "Serving download");

    responder::attachment(blob, &target.content_type, &track.original_filename)
}

/// Lookup plus access gate. Runs before any blob is opened.
async fn authorized_track(
    app_state: &AppState,
    auth: &AuthenticatedUser,
    track_id: TrackId,
) -> Result<Track> {
    let track = app_state
        .catalog
        .get_track(&track_id)
        .await?
        .ok_or_else(|| ServerError::TrackNotFound(track_id.to_string()))?;

    if !access::can_stream(auth.principal(), &track, app_state.catalog.as_ref()).await? {
        tracing::info!(
            track_id = %track.id,
            user_id = %auth.principal().user_id,
            "Denied track access"
        );
        return Err(ServerError::Forbidden("Access denied".to_string()));
    }

    Ok(track)
}

async fn open_blob(
    app_state: &AppState,
    track: &Track,
    target: &StreamTarget,
) -> Result<crate::services::OpenedBlob> {
    let blob = app_state.storage.open(&target.file_path).await.map_err(|e| {
        // The record exists but its blob does not: catalog and disk disagree
        tracing::error!(track_id = %track.id, "Track blob unavailable: {}", e);
        ServerError::from(e)
    })?;

    // Live size drives all range arithmetic; the record is only checked
    if !target.size_matches(blob.size) {
        tracing::warn!(
            track_id = %track.id,
            recorded = target.size_bytes,
            actual = blob.size,
            "Recorded track size differs from blob size"
        );
    }

    Ok(blob)
}
