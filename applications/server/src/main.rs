/// CrateDrop Server - range-aware audio streaming
use clap::{Parser, Subcommand};
use cratedrop_core::{TrackCatalog, TrackId};
use cratedrop_server::{
    config::ServerConfig,
    create_router,
    services::{AuthService, BlobStorage, LocalStorage},
    state::AppState,
};
use cratedrop_storage::SqliteCatalog;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cratedrop-server")]
#[command(about = "CrateDrop audio streaming server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CRATEDROP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Apply database migrations and exit
    Migrate,
    /// Show a track's stream target and compare recorded and live sizes
    Probe {
        /// Track ID
        track_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cratedrop_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Migrate => migrate(&config).await?,
        Commands::Probe { track_id } => probe(&config, &track_id).await?,
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting CrateDrop server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let pool = connect(&config).await?;
    let catalog = Arc::new(SqliteCatalog::new(pool));
    tracing::info!("Database connected");

    let storage = LocalStorage::new(config.storage.data_dir.clone());
    storage.initialize().await?;
    tracing::info!("Blob storage at {}", config.storage.data_dir.display());

    let auth_service = Arc::new(AuthService::new(&config.auth.jwt_secret));

    let policy = config.streaming.policy();
    tracing::info!(
        initial_chunk_bytes = policy.chunks.initial,
        max_chunk_bytes = policy.chunks.steady,
        "Streaming policy"
    );

    let app_state = AppState::new(catalog, Arc::new(storage), auth_service, policy);
    let app = create_router(app_state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn migrate(config: &ServerConfig) -> anyhow::Result<()> {
    connect(config).await?;
    println!("Migrations applied to {}", config.storage.database_url);
    Ok(())
}

async fn probe(config: &ServerConfig, track_id: &str) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let catalog = SqliteCatalog::new(pool);

    let track = catalog
        .get_track(&TrackId::new(track_id))
        .await?
        .ok_or_else(|| anyhow::anyhow!("Track not found: {}", track_id))?;
    let target = track.stream_target();

    println!("Track:        {}", track.id);
    println!("Owner:        {}", track.owner_user_id);
    println!("File path:    {}", target.file_path);
    println!("Content type: {}", target.content_type);
    println!("Recorded:     {} bytes", target.size_bytes);

    let storage = LocalStorage::new(config.storage.data_dir.clone());
    match storage.open(&target.file_path).await {
        Ok(blob) => {
            println!("Live:         {} bytes", blob.size);
            if target.size_matches(blob.size) {
                println!("Status:       ok");
            } else {
                println!("Status:       size mismatch (live size is served)");
            }
        }
        Err(e) => println!("Status:       blob unavailable ({})", e),
    }

    Ok(())
}

/// Open the pool and bring the schema up to date
async fn connect(config: &ServerConfig) -> anyhow::Result<cratedrop_storage::SqlitePool> {
    if let Some(db_file) = config.storage.database_file() {
        if let Some(parent) = db_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let pool = cratedrop_storage::create_pool(&config.storage.database_url).await?;
    cratedrop_storage::run_migrations(&pool).await?;
    Ok(pool)
}
