/// HTTP `Range` header parsing and chunk-ceiling policy
use std::fmt;
use thiserror::Error;

/// Ceiling for the opening chunk of playback
pub const INITIAL_CHUNK_BYTES: u64 = 256 * 1024;

/// Ceiling for every other response
pub const MAX_CHUNK_BYTES: u64 = 512 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Not of the form `bytes=<start>-[<end>]`
    #[error("malformed range header")]
    Malformed,

    /// Well formed, but outside the resource
    #[error("range outside resource bounds")]
    Unsatisfiable,

    #[error("multiple ranges are not supported")]
    MultiRangeUnsupported,
}

/// Maximum bytes returned in one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    /// Used when the request starts at byte 0 with no explicit end
    pub initial: u64,
    /// Used for everything else, explicit ranges included
    pub steady: u64,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            initial: INITIAL_CHUNK_BYTES,
            steady: MAX_CHUNK_BYTES,
        }
    }
}

/// Syntactic form of a single-range header, before the resource size is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: u64,
    pub end: Option<u64>,
}

impl RangeSpec {
    /// Parse `bytes=<start>-` or `bytes=<start>-<end>`
    ///
    /// Suffix ranges (`bytes=-500`) and multi-range sets are rejected.
    pub fn parse(header: &str) -> Result<Self, RangeError> {
        let spec = header
            .trim()
            .strip_prefix("bytes=")
            .ok_or(RangeError::Malformed)?;

        if spec.contains(',') {
            return Err(RangeError::MultiRangeUnsupported);
        }

        let (start, end) = spec.split_once('-').ok_or(RangeError::Malformed)?;
        let start = parse_offset(start)?;
        let end = match end.trim() {
            "" => None,
            end => Some(parse_offset(end)?),
        };

        Ok(Self { start, end })
    }

    /// Clamp to the chunk ceiling and validate against the resource size
    pub fn resolve(self, file_size: u64, policy: &ChunkPolicy) -> Result<ByteRange, RangeError> {
        if file_size == 0 {
            return Err(RangeError::Unsatisfiable);
        }
        let last = file_size - 1;
        let start = self.start;

        let end = match self.end {
            None => {
                let ceiling = if start == 0 {
                    policy.initial
                } else {
                    policy.steady
                };
                start
                    .saturating_add(ceiling.saturating_sub(1))
                    .min(last)
            }
            // Explicit bounds are capped too, so no client can pull the whole file at once
            Some(end) if end >= start && end - start >= policy.steady => {
                start.saturating_add(policy.steady.saturating_sub(1))
            }
            Some(end) => end,
        };

        if start >= file_size || end >= file_size || start > end {
            return Err(RangeError::Unsatisfiable);
        }

        Ok(ByteRange { start, end })
    }
}

fn parse_offset(s: &str) -> Result<u64, RangeError> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed);
    }
    s.parse().map_err(|_| RangeError::Malformed)
}

/// Inclusive byte interval, `start <= end < size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

#[allow(clippy::len_without_is_empty)]
impl ByteRange {
    /// Parse and resolve a `Range` header in one step
    pub fn parse(header: &str, file_size: u64, policy: &ChunkPolicy) -> Result<Self, RangeError> {
        RangeSpec::parse(header)?.resolve(file_size, policy)
    }

    /// The chunk served when the request carries no `Range` header
    pub fn initial(file_size: u64, policy: &ChunkPolicy) -> Result<Self, RangeError> {
        if file_size == 0 {
            return Err(RangeError::Unsatisfiable);
        }
        let chunk = policy.initial.min(file_size).max(1);
        Ok(Self {
            start: 0,
            end: chunk - 1,
        })
    }

    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a resource of `file_size` bytes
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, file_size)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
