//! `SQLite` implementation of [`PlatformConfigRepository`].

use std::future::Future;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use bmshub_app::ports::PlatformConfigRepository;
use bmshub_domain::error::BmsError;
use bmshub_domain::id::ConfigId;
use bmshub_domain::platform_config::PlatformConfig;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`PlatformConfig`].
struct Wrapper(PlatformConfig);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let access_token: String = row.try_get("access_token")?;
        let location_id: Option<String> = row.try_get("location_id")?;
        let updated_at: String = row.try_get("updated_at")?;

        let id = ConfigId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .with_timezone(&Utc);

        let mut builder = PlatformConfig::builder()
            .id(id)
            .access_token(access_token)
            .updated_at(updated_at);
        if let Some(location_id) = location_id {
            builder = builder.location_id(location_id);
        }
        builder
            .build()
            .map(Self)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))
    }
}

const UPSERT_ACTIVE: &str = "INSERT INTO platform_configs (slot, id, access_token, location_id, updated_at) \
     VALUES ('active', ?, ?, ?, ?) \
     ON CONFLICT(slot) DO UPDATE SET \
         access_token = excluded.access_token, \
         location_id = excluded.location_id, \
         updated_at = excluded.updated_at \
     RETURNING id, access_token, location_id, updated_at";
const SELECT_ACTIVE: &str =
    "SELECT id, access_token, location_id, updated_at FROM platform_configs WHERE slot = 'active'";

/// `SQLite`-backed store for the active platform configuration.
pub struct SqlitePlatformConfigRepository {
    pool: SqlitePool,
}

impl SqlitePlatformConfigRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl PlatformConfigRepository for SqlitePlatformConfigRepository {
    fn upsert_active(
        &self,
        config: PlatformConfig,
    ) -> impl Future<Output = Result<PlatformConfig, BmsError>> + Send {
        let pool = self.pool.clone();
        async move {
            // The existing row keeps its id; only the credential fields move.
            let row: Wrapper = sqlx::query_as(UPSERT_ACTIVE)
                .bind(config.id.to_string())
                .bind(config.access_token.expose())
                .bind(&config.location_id)
                .bind(config.updated_at.to_rfc3339())
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.0)
        }
    }

    fn get_active(&self) -> impl Future<Output = Result<Option<PlatformConfig>, BmsError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_ACTIVE)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|Wrapper(config)| config))
        }
    }
}
