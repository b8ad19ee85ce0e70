//! Jokebox API Service
//! Mission: Serve the joke CRUD and auth endpoints behind the token gate

use anyhow::{Context, Result};
use dotenv::dotenv;
use jokebox::auth::{RevocationStore, TokenSigner, UserStore};
use jokebox::config::ApiConfig;
use jokebox::jokes::JokeStore;
use jokebox::routes::api_router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jokebox=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    let user_store = Arc::new(UserStore::new(&config.auth_db_path)?);
    let joke_store = Arc::new(JokeStore::new(&config.jokes_db_path)?);
    let signer = Arc::new(TokenSigner::new(
        &config.access_token_secret,
        &config.refresh_token_secret,
    ));

    let blacklist = match &config.redis_url {
        Some(url) => RevocationStore::connect(url)
            .await
            .context("Failed to connect to Redis")?,
        None => {
            warn!("⚠️  REDIS_URL not set - refresh-token blacklist is in-memory only");
            RevocationStore::new_memory()
        }
    };

    info!("🔐 Authentication initialized (users at: {})", config.auth_db_path);

    let app = api_router(user_store, joke_store, signer, blacklist)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
