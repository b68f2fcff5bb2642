use sqlx::{
    postgres::PgPoolOptions,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Postgres, Sqlite,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::repositories::{
    postgres::PostgresStore, sqlite::SqliteStore, BookingRepository, EventRepository,
    RatingRepository, UserRepository,
};

#[derive(Clone)]
pub enum Database {
    Postgres(Pool<Postgres>),
    Sqlite(Pool<Sqlite>),
}

/// Набор хранилищ поверх одного пула.
#[derive(Clone)]
pub struct Repositories {
    pub events: Arc<dyn EventRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub ratings: Arc<dyn RatingRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let url = config.url.as_str();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            info!("Connecting to PostgreSQL...");
            let pool = PgPoolOptions::new()
                .max_connections(config.pool_size)
                .acquire_timeout(Duration::from_secs(5))
                .connect(url)
                .await?;
            return Ok(Database::Postgres(pool));
        }

        info!("Connecting to SQLite...");
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let mut opts = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            opts = opts.journal_mode(SqliteJournalMode::Wal);
        }

        // Каждое соединение с :memory: видит свою базу, поэтому держим одно
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(opts)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.pool_size)
                .acquire_timeout(Duration::from_secs(5))
                .connect_with(opts)
                .await?
        };
        Ok(Database::Sqlite(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        match self {
            Database::Postgres(pool) => {
                sqlx::migrate!("./src/migrations/postgres").run(pool).await?
            }
            Database::Sqlite(pool) => sqlx::migrate!("./src/migrations/sqlite").run(pool).await?,
        }
        info!("Migrations completed");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        match self {
            Database::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
            Database::Sqlite(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
        }
    }

    pub fn repositories(&self) -> Repositories {
        match self {
            Database::Postgres(pool) => {
                let store = Arc::new(PostgresStore::new(pool.clone()));
                Repositories {
                    events: store.clone(),
                    bookings: store.clone(),
                    ratings: store.clone(),
                    users: store,
                }
            }
            Database::Sqlite(pool) => {
                let store = Arc::new(SqliteStore::new(pool.clone()));
                Repositories {
                    events: store.clone(),
                    bookings: store.clone(),
                    ratings: store.clone(),
                    users: store,
                }
            }
        }
    }
}
