/// Turns an opened blob and a resolved range into an HTTP response
use crate::{
    error::{Result, ServerError},
    services::storage::{OpenedBlob, SeekableRead, SourceError},
    streaming::range::{ByteRange, ChunkPolicy},
};
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use bytes::Bytes;
use std::io::{self, SeekFrom};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Read buffer for body copies
const COPY_BUFFER_BYTES: u64 = 64 * 1024;

/// Delivery settings shared by every stream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPolicy {
    pub chunks: ChunkPolicy,
    pub cache_control: String,
}

impl Default for StreamPolicy {
    fn default() -> Self {
        Self {
            chunks: ChunkPolicy::default(),
            cache_control: "public, max-age=3600, must-revalidate".to_string(),
        }
    }
}

/// `206 Partial Content` for `range` of the blob
///
/// The seek happens before any header is produced, so a failed seek is
/// still a clean 500.
pub async fn partial_content(
    blob: OpenedBlob,
    range: ByteRange,
    content_type: &str,
    policy: &StreamPolicy,
) -> Result<Response> {
    let OpenedBlob { mut handle, size } = blob;

    handle
        .seek(SeekFrom::Start(range.start))
        .await
        .map_err(|source| SourceError::SeekFailed {
            offset: range.start,
            source,
        })?;

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, range.len())
        .header(header::CONTENT_RANGE, range.content_range(size))
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, policy.cache_control.as_str())
        .body(exact_body(handle, range.start, range.len()))
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))
}

/// `200 OK` carrying the whole blob as an attachment
pub fn attachment(blob: OpenedBlob, content_type: &str, filename: &str) -> Result<Response> {
    let OpenedBlob { handle, size } = blob;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", sanitize_filename(filename)),
        )
        .body(exact_body(handle, 0, size))
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))
}

struct CopyState {
    reader: Box<dyn SeekableRead>,
    offset: u64,
    remaining: u64,
}

/// Body yielding exactly `len` bytes from the reader's current position
///
/// A source that ends early or fails is logged and surfaces as a stream
/// error, which makes hyper abort the connection instead of sending a
/// body shorter than its `Content-Length`. The reader is dropped with the
/// body, including when the client goes away mid-transfer.
fn exact_body(reader: Box<dyn SeekableRead>, offset: u64, len: u64) -> Body {
    let state = CopyState {
        reader,
        offset,
        remaining: len,
    };

    let stream = futures_util::stream::try_unfold(state, |mut copy| async move {
        if copy.remaining == 0 {
            return Ok(None);
        }

        let want = copy.remaining.min(COPY_BUFFER_BYTES) as usize;
        let mut buf = vec![0u8; want];
        let read = match copy.reader.read(&mut buf).await {
            Ok(0) => {
                tracing::warn!(
                    offset = copy.offset,
                    remaining = copy.remaining,
                    "Audio source ended before the requested range was sent"
                );
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "source shorter than advertised",
                ));
            }
            Ok(n) => n,
            Err(source) => {
                let err = SourceError::CopyFailed {
                    offset: copy.offset,
                    remaining: copy.remaining,
                    source,
                };
                tracing::error!("{}", err);
                return Err(io::Error::other(err));
            }
        };

        buf.truncate(read);
        copy.offset += read as u64;
        copy.remaining -= read as u64;
        Ok(Some((Bytes::from(buf), copy)))
    });

    Body::from_stream(stream)
}

/// Keep a filename safe inside a quoted header parameter
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    if cleaned.trim().is_empty() {
        "track".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn blob(data: &[u8]) -> OpenedBlob {
        OpenedBlob {
            handle: Box::new(Cursor::new(data.to_vec())),
            size: data.len() as u64,
        }
    }

    async fn body_bytes(response: Response) -> std::result::Result<Vec<u8>, axum::Error> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map(|b| b.to_vec())
    }

    #[tokio::test]
    async fn test_partial_content_headers_and_body() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let range = ByteRange { start: 10, end: 19 };

        let response = partial_content(blob(&data), range, "audio/mpeg", &StreamPolicy::default())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
        assert_eq!(headers[header::CONTENT_LENGTH], "10");
        assert_eq!(headers[header::CONTENT_RANGE], "bytes 10-19/1000");
        assert_eq!(headers[header::ACCEPT_RANGES], "bytes");
        assert_eq!(
            headers[header::CACHE_CONTROL],
            "public, max-age=3600, must-revalidate"
        );

        assert_eq!(body_bytes(response).await.unwrap(), data[10..20].to_vec());
    }

    #[tokio::test]
    async fn test_body_spans_multiple_buffers() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let range = ByteRange {
            start: 1,
            end: 150_000,
        };

        let response = partial_content(blob(&data), range, "audio/flac", &StreamPolicy::default())
            .await
            .unwrap();

        assert_eq!(body_bytes(response).await.unwrap(), data[1..=150_000].to_vec());
    }

    #[tokio::test]
    async fn test_short_source_errors_instead_of_padding() {
        // Advertised size is larger than what the reader holds
        let truncated = OpenedBlob {
            handle: Box::new(Cursor::new(vec![7u8; 50])),
            size: 100,
        };
        let range = ByteRange { start: 0, end: 99 };

        let response = partial_content(truncated, range, "audio/mpeg", &StreamPolicy::default())
            .await
            .unwrap();

        assert_eq!(response.headers()[header::CONTENT_LENGTH], "100");
        assert!(body_bytes(response).await.is_err());
    }

    #[tokio::test]
    async fn test_attachment() {
        let response = attachment(blob(b"abcdef"), "audio/wav", "My \"Song\".wav").unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "6");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"My Song.wav\""
        );
        assert_eq!(body_bytes(response).await.unwrap(), b"abcdef".to_vec());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a\r\nb.mp3"), "ab.mp3");
        assert_eq!(sanitize_filename("\"\""), "track");
    }
}
