//! HTTP server bootstrap.
//!
//! Builds the full router with the middleware stack and runs it until ctrl-c.
//! Webhook routes sit behind the same timeout layer as everything else; the
//! gateway treats a timeout as a redelivery trigger, which is safe here.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::handlers::BillingAppState;
use super::routes::billing_router;

/// Builds the application router with middleware applied.
pub fn build_app(state: BillingAppState, config: &ServerConfig) -> Router {
    let cors = cors_layer(config);

    Router::new()
        .nest("/api", billing_router())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = config
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

/// Binds and serves until ctrl-c.
pub async fn start(state: BillingAppState, config: &ServerConfig) -> std::io::Result<()> {
    let app = build_app(state, config);
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "billing service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::MockPaymentGateway;
    use crate::adapters::platform::{InMemoryEntitlementStore, MockAuthProvider};
    use crate::domain::billing::WebhookVerifier;
    use std::sync::Arc;

    #[test]
    fn build_app_with_default_config() {
        let state = BillingAppState {
            store: Arc::new(InMemoryEntitlementStore::new()),
            gateway: Arc::new(MockPaymentGateway::new()),
            auth: Arc::new(MockAuthProvider::new()),
            verifier: Arc::new(WebhookVerifier::new(None)),
            gateway_public_key: "pk_test".to_string(),
        };
        let _app = build_app(state, &ServerConfig::default());
    }

    #[test]
    fn cors_layer_accepts_configured_origins() {
        let config = ServerConfig {
            cors_origins: Some("https://vibeflix.app".to_string()),
            ..Default::default()
        };
        let _layer = cors_layer(&config);
    }
}
