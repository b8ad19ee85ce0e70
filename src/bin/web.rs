//! Jokebox Front-End Service
//! Mission: Serve the pages and keep each browser's token pair alive transparently

use anyhow::{Context, Result};
use dotenv::dotenv;
use jokebox::auth::TokenKeys;
use jokebox::config::WebConfig;
use jokebox::web::{pages::web_router, ApiClient, SessionCodec, WebState};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
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

    let config = WebConfig::from_env()?;

    let state = WebState {
        api: ApiClient::new(&config.api_url),
        sessions: SessionCodec::new(&config.session_secret, config.secure_cookies),
        access_keys: TokenKeys::new(&config.access_token_secret),
    };

    let app = web_router(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🃏 Front end listening on {} (API at {})", addr, config.api_url);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
