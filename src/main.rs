use gamehub::{build_router, AppConfig, AppState, InMemoryStore, PostgresStore, RandomShuffler};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamehub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tournament server");

    let config = AppConfig::from_env()?;

    // One store backs every repository so round commits stay atomic
    let app_state = match &config.database_url {
        Some(database_url) => {
            let store =
                Arc::new(PostgresStore::connect(database_url, config.db_max_connections).await?);
            store.apply_schema().await?;
            info!("Using PostgreSQL store");
            AppState::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store,
                Arc::new(RandomShuffler),
            )
        }
        None => {
            let store = Arc::new(InMemoryStore::new());
            info!("DATABASE_URL not set, using in-memory store");
            AppState::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store,
                Arc::new(RandomShuffler),
            )
        }
    };

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
