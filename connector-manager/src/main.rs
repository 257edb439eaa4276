use anyhow::{Context, Result};
use axum::http::HeaderValue;
use connector_manager::api::{create_router, ApiState};
use connector_manager::HubSpotConnector;
use crm_bridge::api::{create_oauth_router, OAuthAppState, OAuthFlow};
use crm_bridge::cache::{run_cache_cleanup, KeyValueCache, MemoryCache, RedisCache};
use crm_bridge::config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "connector_manager=info,crm_bridge=info".into()),
        )
        .init();

    info!("Connector Manager starting...");

    let config = config::load().context("Failed to load configuration")?;

    // Shared cache: Redis when configured, in-process otherwise
    let cache: Arc<dyn KeyValueCache> = match &config.cache.redis_url {
        Some(url) => {
            let cache = RedisCache::connect(url).await?;
            info!("Redis cache connected");
            Arc::new(cache)
        }
        None => {
            let cache = MemoryCache::new();
            tokio::spawn(run_cache_cleanup(
                cache.clone(),
                config.cache.cleanup_interval_seconds,
            ));
            info!("Using in-process cache");
            Arc::new(cache)
        }
    };

    let oauth_state = OAuthAppState {
        flow: Arc::new(OAuthFlow::from_config(&config, cache)),
    };
    let api_state = ApiState {
        connector: Arc::new(HubSpotConnector::from_config(&config.hubspot)?),
    };

    let origin: HeaderValue = config
        .server
        .cors_origin
        .parse()
        .context("Invalid CORS origin")?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = create_oauth_router(oauth_state)
        .merge(create_router(api_state))
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .context("Failed to bind API address")?;
    info!(addr = %config.server.bind_addr, "Connector API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "Connector API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    info!("Connector manager stopped");

    Ok(())
}
