//! VibeFlix billing service entry point.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use vibeflix_billing::adapters::gateway::{KorapayConfig, KorapayGateway};
use vibeflix_billing::adapters::http::{self, BillingAppState};
use vibeflix_billing::adapters::platform::{
    PlatformAuthProvider, PlatformEntitlementStore, PlatformStoreConfig,
};
use vibeflix_billing::config::AppConfig;
use vibeflix_billing::domain::billing::WebhookVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    config.validate()?;

    if !config.gateway.verifies_webhooks() {
        tracing::warn!(
            "webhook signature verification is DISABLED; set VIBEFLIX__GATEWAY__WEBHOOK_SECRET"
        );
    }

    let gateway = KorapayGateway::new(
        KorapayConfig::new(config.gateway.secret_key.clone())
            .with_base_url(config.gateway.api_base_url.clone()),
    );

    let store = PlatformEntitlementStore::new(PlatformStoreConfig::new(
        config.platform.base_url.clone(),
        config.platform.service_role_key.clone(),
    ));

    let auth = PlatformAuthProvider::new(config.platform.base_url.clone());

    let state = BillingAppState {
        store: Arc::new(store),
        gateway: Arc::new(gateway),
        auth: Arc::new(auth),
        verifier: Arc::new(WebhookVerifier::new(config.gateway.webhook_secret.clone())),
        gateway_public_key: config.gateway.public_key.clone(),
    };

    http::start(state, &config.server).await?;

    Ok(())
}
