//! Domain types for CrateDrop

mod ids;
mod track;
mod user;

pub use ids::{TrackId, UserId};
pub use track::{StreamTarget, Track};
pub use user::Role;
