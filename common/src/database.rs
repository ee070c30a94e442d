use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use sqlx::{
    Executor, PgPool, Postgres, Transaction,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};

/// Handle to the relational store.
///
/// Cloning is cheap: the pool is reference counted, so every repository gets
/// its own handle instead of reaching for a process-wide one.
#[derive(Clone, Debug)]
pub struct Database {
    database_pool: PgPool,
    database_schema: String,
    statement_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub db: String,
    pub schema: String,
    pub credentials: DatabaseCredentials,
    pub connection: DatabaseConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConnection {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    /// Upper bound for every statement run inside an operation's transaction.
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_millis: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

fn default_port() -> u16 {
    5432
}

fn default_statement_timeout() -> u64 {
    5_000
}

impl Database {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, anyhow::Error> {
        let credentials = &settings.credentials;
        let pg_connect_options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&credentials.username)
            .password(&credentials.password)
            .database(&settings.db)
            .ssl_mode(PgSslMode::Prefer)
            .options([("search_path", settings.schema.as_str())]);

        let connection = &settings.connection;
        let pool = PgPoolOptions::new()
            .min_connections(connection.min_connections)
            .max_connections(connection.max_connections)
            .acquire_timeout(Duration::from_secs(connection.acquire_timeout_seconds))
            .connect_with(pg_connect_options)
            .await
            .with_context(|| {
                format!(
                    "failed to open database at {}:{}/{}",
                    settings.host, settings.port, settings.db
                )
            })?;

        tracing::info!(host = %settings.host, db = %settings.db, "connected to database");

        Ok(Self::from_pool(
            pool,
            &settings.schema,
            Duration::from_millis(connection.statement_timeout_millis),
        ))
    }

    /// Wraps an already configured pool, e.g. one pointing at a test container.
    pub fn from_pool(pool: PgPool, schema: &str, statement_timeout: Duration) -> Self {
        Self {
            database_pool: pool,
            database_schema: schema.to_owned(),
            statement_timeout,
        }
    }

    /// Opens a transaction whose statements are bounded by the configured timeout.
    ///
    /// Dropping the returned transaction without committing rolls it back.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut transaction = self.database_pool.begin().await?;
        // SET does not accept bind parameters; the value is an integer from settings.
        let timeout = format!(
            "SET LOCAL statement_timeout = {}",
            self.statement_timeout.as_millis()
        );
        transaction.execute(timeout.as_str()).await?;
        Ok(transaction)
    }

    pub async fn execute_in_transaction(
        &self,
        queries: Vec<String>,
        ctx: &'static str,
    ) -> Result<(), anyhow::Error> {
        let mut transaction = self
            .database_pool
            .begin()
            .await
            .context(format!("failed to start {} transaction", ctx))?;

        tracing::info!("{}", ctx);

        for ddl in queries {
            tracing::debug!("{}", ddl);

            transaction
                .execute(sqlx::query(&ddl))
                .await
                .context(format!("failed to execute {} query", ctx))?;
        }

        transaction
            .commit()
            .await
            .context(format!("failed to commit {} transaction", ctx))?;

        Ok(())
    }

    pub fn database_pool(&self) -> &PgPool {
        &self.database_pool
    }

    pub fn database_schema(&self) -> &str {
        &self.database_schema
    }
}
