//! CrateDrop Core
//!
//! Domain types, collaborator traits, and error handling shared by the
//! CrateDrop storage layer and server.
//!
//! # Architecture
//!
//! - **Domain Types**: `Track`, `StreamTarget`, `Role`, typed ids
//! - **Collaborator Traits**: `TrackCatalog` (track lookup + public playlist membership)
//! - **Error Handling**: Unified `CrateError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cratedrop_core::types::{Role, TrackId, UserId};
//!
//! let owner = UserId::new("user-1");
//! let track = TrackId::generate();
//! assert!(Role::Admin.is_admin());
//! assert!(!track.as_str().is_empty());
//! # let _ = owner;
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CrateError, Result};
pub use traits::TrackCatalog;
pub use types::{Role, StreamTarget, Track, TrackId, UserId};
