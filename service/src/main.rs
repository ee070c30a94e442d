use hub_common::Database;
use hub_service::domain::moderation::ModerationGateway;
use hub_service::infrastructure::AppStateImpl;
use hub_service::infrastructure::http::{HttpServer, HttpServerConfig};
use hub_service::infrastructure::persistence::PostgresStore;
use hub_service::infrastructure::settings::Settings;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    tracing::info!("Configuration loaded");

    let database = Database::connect(&settings.database).await?;

    let store = PostgresStore::new(database);
    let gateway = ModerationGateway::new(store, settings.dashboard.recent_limit);
    let state = AppStateImpl::new(gateway, &settings.moderation.token);

    let server_config = HttpServerConfig {
        port: &settings.server_port,
    };
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
