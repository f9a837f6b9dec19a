//! Composition root: stores, handlers, router, and the serve loop.
//!
//! ```text
//! AppConfig ─▶ Stores (memory | postgres) ─▶ handlers ─▶ api_router ─▶ axum::serve
//!                                   └─▶ BroadcastCoordinator ◀─ SubmitVoteHandler
//! ```

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::EnvFilter;

use crate::adapters::http::middleware::AuthState;
use crate::adapters::http::{api_router, PollHandlers};
use crate::adapters::memory::{InMemoryPollStore, InMemoryVoteLedger};
use crate::adapters::postgres::{PostgresPollStore, PostgresVoteLedger};
use crate::adapters::websocket::WebSocketState;
use crate::application::broadcast::{BroadcastCoordinator, SubscriptionRegistry};
use crate::application::handlers::poll::{
    ClosePollHandler, CreatePollHandler, GetPollHandler, GetResultsHandler, ListPollsHandler,
    SubmitVoteHandler,
};
use crate::config::{AppConfig, PollsConfig, ServerConfig, ValidationError};
use crate::ports::{PollCatalog, PollRepository, VoteLedger};

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Catalog and ledger implementations behind their ports.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn PollCatalog>,
    pub repository: Arc<dyn PollRepository>,
    pub ledger: Arc<dyn VoteLedger>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let polls = InMemoryPollStore::new();
        Self {
            catalog: Arc::new(polls.clone()),
            repository: Arc::new(polls),
            ledger: Arc::new(InMemoryVoteLedger::new()),
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        let polls = PostgresPollStore::new(pool.clone());
        Self {
            catalog: Arc::new(polls.clone()),
            repository: Arc::new(polls),
            ledger: Arc::new(PostgresVoteLedger::new(pool)),
        }
    }
}

/// Wire handlers, the broadcast coordinator, and the HTTP/WebSocket router.
pub fn build_router(stores: Stores, auth: AuthState, polls: &PollsConfig) -> Router {
    let results = GetResultsHandler::new(stores.catalog.clone(), stores.ledger.clone());
    let registry = Arc::new(SubscriptionRegistry::new());
    let coordinator = BroadcastCoordinator::new(results.clone(), registry.clone());

    let handlers = PollHandlers::new(
        Arc::new(CreatePollHandler::new(
            stores.repository.clone(),
            polls.poll_limits(),
        )),
        Arc::new(ClosePollHandler::new(stores.repository.clone())),
        Arc::new(GetPollHandler::new(stores.catalog.clone())),
        Arc::new(ListPollsHandler::new(stores.catalog.clone())),
        Arc::new(SubmitVoteHandler::new(
            stores.catalog.clone(),
            stores.ledger.clone(),
            Arc::new(coordinator),
            polls.vote_rules(),
        )),
        Arc::new(results.clone()),
    );

    let websocket = WebSocketState::new(registry, Arc::new(results), polls.subscriber_buffer);

    api_router(handlers, websocket, auth)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `server.log_level`. Production logs are JSON.
pub fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if server.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}

async fn open_stores(config: &AppConfig) -> Result<Stores, ServerError> {
    let Some(database) = &config.database else {
        tracing::info!("No database configured, using in-memory stores");
        return Ok(Stores::in_memory());
    };

    let pool = database.connect().await?;
    if database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }
    Ok(Stores::postgres(pool))
}

/// Build everything from `config` and serve until Ctrl+C or SIGTERM.
pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    config.validate()?;

    let auth: AuthState = Arc::new(config.auth.validator()?);
    let stores = open_stores(&config).await?;

    let app = build_router(stores, auth, &config.polls)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server));

    let address = config.server.socket_addr()?;
    let listener = TcpListener::bind(address).await?;
    tracing::info!(%address, environment = ?config.server.environment, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
