/// Who may read a track's audio
use crate::services::auth::Principal;
use cratedrop_core::{Result, Track, TrackCatalog};

/// Owner, admin, or anyone when the track sits in a public playlist
///
/// Must run before the blob is opened so a denied caller learns nothing
/// about the file.
pub async fn can_stream(
    principal: &Principal,
    track: &Track,
    catalog: &dyn TrackCatalog,
) -> Result<bool> {
    if principal.is_admin() || track.is_owned_by(&principal.user_id) {
        return Ok(true);
    }

    catalog.is_in_public_playlist(&track.id).await
}
