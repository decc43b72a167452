//! Common test utilities and fixtures
//!
//! Every test app gets its own temp directory holding a REAL `SQLite` file
//! and the blob store, so the full request path runs against disk.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use chrono::Duration;
use cratedrop_core::{Role, TrackId, UserId};
use cratedrop_server::{
    create_router,
    services::{AuthService, BlobStorage, LocalStorage, Principal},
    state::AppState,
    streaming::StreamPolicy,
};
use cratedrop_storage::{SqliteCatalog, SqlitePool};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key";

pub mod fixtures {
    pub const OWNER: &str = "owner-1";
    pub const STRANGER: &str = "stranger-1";
    pub const ADMIN: &str = "admin-1";
}

/// Deterministic, non-repeating-within-a-chunk audio stand-in
pub fn audio_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub storage: Arc<LocalStorage>,
    pub auth_service: Arc<AuthService>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_policy(StreamPolicy::default()).await
    }

    pub async fn with_policy(policy: StreamPolicy) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}", temp_dir.path().join("test.sqlite").display());

        let pool = cratedrop_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");
        cratedrop_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let storage = LocalStorage::new(temp_dir.path().join("blobs"));
        storage.initialize().await.expect("Failed to init storage");
        let storage = Arc::new(storage);

        let auth_service = Arc::new(AuthService::new(TEST_SECRET));

        let app_state = AppState::new(
            Arc::new(SqliteCatalog::new(pool.clone())),
            storage.clone(),
            Arc::clone(&auth_service),
            policy,
        );

        for (id, role) in [
            (fixtures::OWNER, "user"),
            (fixtures::STRANGER, "user"),
            (fixtures::ADMIN, "admin"),
        ] {
            sqlx::query("INSERT INTO users (id, email, role) VALUES (?, ?, ?)")
                .bind(id)
                .bind(format!("{id}@example.com"))
                .bind(role)
                .execute(&pool)
                .await
                .expect("Failed to create test user");
        }

        Self {
            router: create_router(app_state),
            pool,
            storage,
            auth_service,
            _temp_dir: temp_dir,
        }
    }

    pub fn token(&self, user_id: &str, role: Role) -> String {
        self.auth_service
            .create_access_token(
                &Principal::new(UserId::new(user_id), role),
                Duration::hours(1),
            )
            .expect("Failed to create token")
    }

    /// Store `data` as a track owned by `owner`, with a matching record
    pub async fn add_track(&self, id: &str, owner: &str, data: &[u8]) -> String {
        let saved = self
            .storage
            .save(
                &UserId::new(owner),
                &TrackId::new(id),
                &format!("{id} demo.mp3"),
                data,
            )
            .await
            .expect("Failed to save blob");

        self.insert_track(id, owner, &saved.file_path, saved.size as i64)
            .await;
        saved.file_path
    }

    /// Insert a track record without touching the blob store
    pub async fn insert_track(&self, id: &str, owner: &str, file_path: &str, size_bytes: i64) {
        sqlx::query(
            "INSERT INTO tracks (id, owner_user_id, original_filename, content_type, size_bytes, title, file_path)
             VALUES (?, ?, ?, 'audio/mpeg', ?, ?, ?)",
        )
        .bind(id)
        .bind(owner)
        .bind(format!("{id} demo.mp3"))
        .bind(size_bytes)
        .bind(format!("Track {id}"))
        .bind(file_path)
        .execute(&self.pool)
        .await
        .expect("Failed to create test track");
    }

    pub async fn add_playlist(&self, id: &str, owner: &str, is_public: bool, track_ids: &[&str]) {
        sqlx::query(
            "INSERT INTO playlists (id, owner_user_id, name, is_public) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(owner)
        .bind(format!("Crate {id}"))
        .bind(is_public)
        .execute(&self.pool)
        .await
        .expect("Failed to create test playlist");

        for (position, track_id) in track_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO playlist_tracks (id, playlist_id, track_id, position) VALUES (?, ?, ?, ?)",
            )
            .bind(format!("{id}-{track_id}"))
            .bind(id)
            .bind(*track_id)
            .bind(position as i64)
            .execute(&self.pool)
            .await
            .expect("Failed to add track to playlist");
        }
    }

    /// GET `uri` with an optional bearer token and `Range` header
    pub async fn get(&self, uri: &str, token: Option<&str>, range: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(range) = range {
            request = request.header(header::RANGE, range);
        }

        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Body is not JSON")
}

pub fn header_str<'a>(response: &'a Response, name: header::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
