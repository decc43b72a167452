/// Server configuration
use crate::error::{Result, ServerError};
use crate::streaming::{ChunkPolicy, StreamPolicy, INITIAL_CHUNK_BYTES, MAX_CHUNK_BYTES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `CRATEDROP_AUTH__JWT_SECRET`
pub const ENV_PREFIX: &str = "CRATEDROP";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default = "default_streaming")]
    pub streaming: StreamingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Root directory for audio blobs; track paths are relative to it
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthSettings {
    /// HMAC secret shared with the service that issues access tokens
    #[serde(default)]
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamingSettings {
    /// Ceiling for the first chunk of playback (`bytes=0-` or no Range)
    #[serde(default = "default_initial_chunk_bytes")]
    pub initial_chunk_bytes: u64,

    /// Ceiling for every other range response
    #[serde(default = "default_max_chunk_bytes")]
    pub max_chunk_bytes: u64,

    #[serde(default = "default_cache_control")]
    pub cache_control: String,
}

impl StreamingSettings {
    pub fn policy(&self) -> StreamPolicy {
        StreamPolicy {
            chunks: ChunkPolicy {
                initial: self.initial_chunk_bytes,
                steady: self.max_chunk_bytes,
            },
            cache_control: self.cache_control.clone(),
        }
    }
}

impl StorageSettings {
    /// Filesystem path of the `SQLite` file, if the URL points at one
    pub fn database_file(&self) -> Option<PathBuf> {
        let path = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path == ":memory:" {
            return None;
        }
        Some(PathBuf::from(path))
    }
}

impl ServerConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Without an explicit path, `config.toml` in the working directory is
    /// used when present. Environment variables override file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set CRATEDROP_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        let streaming = &self.streaming;
        if streaming.initial_chunk_bytes == 0 || streaming.max_chunk_bytes == 0 {
            return Err(ServerError::Config(
                "Chunk sizes must be greater than zero".to_string(),
            ));
        }

        if streaming.initial_chunk_bytes > streaming.max_chunk_bytes {
            return Err(ServerError::Config(format!(
                "initial_chunk_bytes ({}) must not exceed max_chunk_bytes ({})",
                streaming.initial_chunk_bytes, streaming.max_chunk_bytes
            )));
        }

        if axum::http::HeaderValue::from_str(&streaming.cache_control).is_err() {
            return Err(ServerError::Config(
                "cache_control is not a valid header value".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        data_dir: default_data_dir(),
        database_url: default_database_url(),
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/cratedrop")
}

fn default_database_url() -> String {
    "sqlite://./data/cratedrop/db/cratedrop.sqlite".to_string()
}

fn default_streaming() -> StreamingSettings {
    StreamingSettings {
        initial_chunk_bytes: default_initial_chunk_bytes(),
        max_chunk_bytes: default_max_chunk_bytes(),
        cache_control: default_cache_control(),
    }
}

fn default_initial_chunk_bytes() -> u64 {
    INITIAL_CHUNK_BYTES
}

fn default_max_chunk_bytes() -> u64 {
    MAX_CHUNK_BYTES
}

fn default_cache_control() -> String {
    "public, max-age=3600, must-revalidate".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: AuthSettings::default(),
            streaming: default_streaming(),
        }
    }
}
