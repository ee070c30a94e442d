use hub_common::Database;
use hub_migration::infrastructure::settings::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    tracing::info!("Configuration loaded");

    let database = Database::connect(&settings.database).await?;

    // migrate database schema conform directory tables
    let created = hub_migration::migrate(&database).await?;
    tracing::info!(created, "Schema migrated");

    Ok(())
}
