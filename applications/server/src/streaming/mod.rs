//! Range-aware audio delivery
//!
//! Every audio response is a bounded `206 Partial Content` chunk. The
//! first chunk is kept small so playback starts quickly; later chunks
//! are larger to cut request overhead. Clients walk the file with
//! successive `Range` requests.

pub mod range;
pub mod responder;

pub use range::{ByteRange, ChunkPolicy, RangeError, RangeSpec, INITIAL_CHUNK_BYTES, MAX_CHUNK_BYTES};
pub use responder::StreamPolicy;
