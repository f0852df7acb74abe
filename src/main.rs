use std::net::SocketAddr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use daykeep::config::AppConfig;
use daykeep::router;
use daykeep::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "daykeep=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://daykeep.db".to_string());
    let config = AppConfig::from_env();

    let pool = init_db(&database_url).await?;

    let state = AppState::new(pool, config.clone());
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Connects and migrates, retrying with exponential backoff.
async fn init_db(database_url: &str) -> Result<SqlitePool, Box<dyn std::error::Error>> {
    const RETRIES: u32 = 3;

    for attempt in 0..RETRIES {
        match try_init_db(database_url).await {
            Ok(pool) => {
                info!("database initialization complete");
                return Ok(pool);
            }
            Err(e) if attempt + 1 < RETRIES => {
                error!("database initialization failed (attempt {}): {}", attempt + 1, e);
                tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
            }
            Err(e) => return Err(e),
        }
    }
    unreachable!("retry loop returns on the last attempt")
}

async fn try_init_db(database_url: &str) -> Result<SqlitePool, Box<dyn std::error::Error>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
