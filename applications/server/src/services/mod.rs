/// Server services
pub mod access;
pub mod auth;
pub mod storage;

pub use auth::{AuthService, Principal};
pub use storage::{BlobStorage, LocalStorage, OpenedBlob, SavedBlob, SourceError};
