//! CrateDrop Server Library
//!
//! Range-aware audio streaming service for CrateDrop: bearer-token gate,
//! track lookup, local blob storage, and HTTP 206 chunked delivery.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod router;
pub mod services;
pub mod state;
pub mod streaming;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use router::create_router;
pub use services::{AuthService, BlobStorage, LocalStorage, Principal};
pub use state::AppState;
pub use streaming::{ByteRange, ChunkPolicy, RangeError, StreamPolicy};
