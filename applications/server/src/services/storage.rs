/// Blob storage - audio files addressed by paths relative to a data root
use async_trait::async_trait;
use cratedrop_core::{TrackId, UserId};
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncSeek};

/// An open handle supporting absolute positioning before reads
pub trait SeekableRead: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> SeekableRead for T {}

/// Failures of the byte source. Always server-side faults.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open blob {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("seek to byte {offset} failed: {source}")]
    SeekFailed {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("copy failed at byte {offset} with {remaining} bytes outstanding: {source}")]
    CopyFailed {
        offset: u64,
        remaining: u64,
        #[source]
        source: io::Error,
    },

    #[error("failed to write blob {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("path escapes storage root: {0}")]
    InvalidPath(String),
}

/// A blob opened for one request. Dropping it closes the handle.
pub struct OpenedBlob {
    pub handle: Box<dyn SeekableRead>,
    /// Live size from the filesystem at open time
    pub size: u64,
}

impl std::fmt::Debug for OpenedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedBlob")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedBlob {
    /// Path relative to the storage root, as recorded on the track
    pub file_path: String,
    pub size: u64,
    pub content_type: String,
}

/// Capability set of an audio blob store
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Open a blob for seekable reading
    async fn open(&self, file_path: &str) -> Result<OpenedBlob, SourceError>;

    /// Store an uploaded file for a user's track
    async fn save(
        &self,
        user_id: &UserId,
        track_id: &TrackId,
        original_name: &str,
        data: &[u8],
    ) -> Result<SavedBlob, SourceError>;

    /// Remove a blob. Removing a missing blob succeeds.
    async fn delete(&self, file_path: &str) -> Result<(), SourceError>;

    /// Absolute location of a relative blob path, `None` if it would escape the root
    fn resolve_full_path(&self, file_path: &str) -> Option<PathBuf>;
}

/// Local filesystem blob storage rooted at a data directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    data_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Create the library directory
    pub async fn initialize(&self) -> io::Result<()> {
        fs::create_dir_all(self.data_dir.join("library")).await
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn resolve(&self, file_path: &str) -> Result<PathBuf, SourceError> {
        self.resolve_full_path(file_path)
            .ok_or_else(|| SourceError::InvalidPath(file_path.to_string()))
    }
}

#[async_trait]
impl BlobStorage for LocalStorage {
    async fn open(&self, file_path: &str) -> Result<OpenedBlob, SourceError> {
        let full = self.resolve(file_path)?;
        let open_failed = |source| SourceError::OpenFailed {
            path: file_path.to_string(),
            source,
        };

        let file = File::open(&full).await.map_err(open_failed)?;
        let metadata = file.metadata().await.map_err(open_failed)?;
        if !metadata.is_file() {
            return Err(open_failed(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        Ok(OpenedBlob {
            handle: Box::new(file),
            size: metadata.len(),
        })
    }

    async fn save(
        &self,
        user_id: &UserId,
        track_id: &TrackId,
        original_name: &str,
        data: &[u8],
    ) -> Result<SavedBlob, SourceError> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let file_path = format!(
            "library/user_{}/track_{}/{}{}",
            user_id, track_id, track_id, ext
        );

        let full = self.resolve(&file_path)?;
        let write_failed = |source| SourceError::WriteFailed {
            path: file_path.clone(),
            source,
        };

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await.map_err(write_failed)?;
        }

        // Write beside the target, then rename so readers never see a partial file
        let mut tmp = full.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Err(e) = fs::write(&tmp, data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(write_failed(e));
        }
        fs::rename(&tmp, &full).await.map_err(write_failed)?;

        let content_type = mime_guess::from_path(original_name)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();

        Ok(SavedBlob {
            file_path,
            size: data.len() as u64,
            content_type,
        })
    }

    async fn delete(&self, file_path: &str) -> Result<(), SourceError> {
        let full = self.resolve(file_path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SourceError::WriteFailed {
                path: file_path.to_string(),
                source,
            }),
        }
    }

    fn resolve_full_path(&self, file_path: &str) -> Option<PathBuf> {
        let relative = Path::new(file_path);
        if file_path.is_empty() || relative.is_absolute() {
            return None;
        }

        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }

        Some(self.data_dir.join(relative))
    }
}
