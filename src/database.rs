//! PostgreSQL connection pool.
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Postgres;

/// Custom db structure to pass to Axum.
#[derive(Clone)]
pub struct Database {
    pub postgres: PgPool,
}

impl Database {
    /// Init database connections.
    pub async fn new(config: &Postgres) -> Result<Self, Box<dyn std::error::Error>> {
        let url = config.connection_url()?;
        let pool = PgPoolOptions::new().max_connections(config.pool_size());
        let postgres = pool.connect(url.as_str()).await?;

        tracing::info!(
            hostname = url.host_str().unwrap_or_default(),
            db = url.path().trim_start_matches('/'),
            "postgres connected"
        );

        Ok(Self { postgres })
    }

    /// Execute migrations scripts.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.postgres).await
    }
}
