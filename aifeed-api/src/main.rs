use std::sync::Arc;
use std::net::SocketAddr;
use anyhow::Context;
use aifeed_api::{app, state::AppState, worker};
use aifeed_core::repository::{OfferRepository, QuestionRepository};
use aifeed_store::app_config::{Config, StorageBackend};
use aifeed_store::{
    DbClient, InMemoryOfferRepository, InMemoryQuestionRepository, PostgresOfferRepository,
    PostgresQuestionRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aifeed_api=debug,aifeed_retention=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting AI Feed retention API on port {}", config.server.port);

    let mut retention = config.retention.clone();
    let (questions, offers): (Arc<dyn QuestionRepository>, Arc<dyn OfferRepository>) = match config.storage.backend {
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .context("database.url is required for the postgres backend")?;
            let db = DbClient::new(url, config.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            retention = db
                .fetch_retention_settings(retention)
                .await
                .context("Failed to load retention settings")?;

            let questions: Arc<dyn QuestionRepository> = Arc::new(PostgresQuestionRepository { pool: db.pool.clone() });
            let offers: Arc<dyn OfferRepository> = Arc::new(PostgresOfferRepository { pool: db.pool });
            (questions, offers)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            let questions: Arc<dyn QuestionRepository> = Arc::new(InMemoryQuestionRepository::new());
            let offers: Arc<dyn OfferRepository> = Arc::new(InMemoryOfferRepository::new());
            (questions, offers)
        }
    };

    let (events, rx) = tokio::sync::broadcast::channel(retention.event_buffer.max(1));
    tokio::spawn(worker::start_event_logger(rx));

    let app_state = AppState {
        questions,
        offers,
        events,
        retention,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
