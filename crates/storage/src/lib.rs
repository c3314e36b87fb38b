use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{migrate::MigrateError, sqlite::SqlitePoolOptions, SqlitePool};
use thiserror::Error;

use domain_radar_core::types::{DomainCheck, Platform, PlatformUpdate, StatusCheck};

/// Number of checks returned by the history listing.
pub const HISTORY_LIMIT: i64 = 50;
/// Upper bound on status records returned by a listing.
pub const STATUS_LIST_LIMIT: i64 = 1000;

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(StorageError::Connect)?;

        apply_pragmas(&pool).await?;

        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle for the registrar platforms collection.
    pub fn platforms(&self) -> PlatformRepository {
        PlatformRepository {
            pool: self.pool.clone(),
        }
    }

    /// Returns a handle for the availability check history.
    pub fn domain_checks(&self) -> DomainCheckRepository {
        DomainCheckRepository {
            pool: self.pool.clone(),
        }
    }

    /// Returns a handle for liveness records.
    pub fn status_checks(&self) -> StatusCheckRepository {
        StatusCheckRepository {
            pool: self.pool.clone(),
        }
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes every pooled connection. In-flight queries are allowed to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn apply_pragmas(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query("PRAGMA journal_mode = WAL;")
        .fetch_one(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA synchronous = NORMAL;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA busy_timeout = 5000;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    Ok(())
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to apply pragma: {0}")]
    Pragma(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository for registrar platforms.
#[derive(Clone)]
pub struct PlatformRepository {
    pool: SqlitePool,
}

impl PlatformRepository {
    /// Returns every stored platform in insertion order.
    pub async fn list_all(&self) -> Result<Vec<Platform>, PlatformError> {
        let rows = sqlx::query_as::<_, PlatformRow>(
            "SELECT id, name, url, logo_url, is_default, created_at FROM platforms ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PlatformRow::into_domain).collect())
    }

    /// Stores a new platform.
    pub async fn insert(&self, platform: &Platform) -> Result<(), PlatformError> {
        sqlx::query(
            "INSERT INTO platforms (id, name, url, logo_url, is_default, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&platform.id)
        .bind(&platform.name)
        .bind(&platform.url)
        .bind(&platform.logo_url)
        .bind(platform.is_default)
        .bind(to_rfc3339(platform.created_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Stores `platform` unless a platform with the same name already exists.
    ///
    /// The existence check and the insert run as one statement, so repeated
    /// calls never produce two rows with the same name.
    pub async fn insert_if_name_absent(
        &self,
        platform: &Platform,
    ) -> Result<SeedOutcome, PlatformError> {
        let result = sqlx::query(
            "INSERT INTO platforms (id, name, url, logo_url, is_default, created_at) \
             SELECT ?, ?, ?, ?, ?, ? \
             WHERE NOT EXISTS (SELECT 1 FROM platforms WHERE name = ?)",
        )
        .bind(&platform.id)
        .bind(&platform.name)
        .bind(&platform.url)
        .bind(&platform.logo_url)
        .bind(platform.is_default)
        .bind(to_rfc3339(platform.created_at))
        .bind(&platform.name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(SeedOutcome::AlreadyPresent)
        } else {
            Ok(SeedOutcome::Inserted)
        }
    }

    /// Applies the `Some` fields of `update` and returns the stored record.
    pub async fn update(
        &self,
        id: &str,
        update: &PlatformUpdate,
    ) -> Result<Platform, PlatformError> {
        let row = sqlx::query_as::<_, PlatformRow>(
            "UPDATE platforms \
             SET name = COALESCE(?, name), \
                 url = COALESCE(?, url), \
                 logo_url = COALESCE(?, logo_url) \
             WHERE id = ? \
             RETURNING id, name, url, logo_url, is_default, created_at",
        )
        .bind(&update.name)
        .bind(&update.url)
        .bind(&update.logo_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(PlatformError::NotFound)?;

        Ok(row.into_domain())
    }

    /// Removes a platform by id.
    pub async fn delete(&self, id: &str) -> Result<(), PlatformError> {
        let result = sqlx::query("DELETE FROM platforms WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PlatformError::NotFound);
        }
        Ok(())
    }
}

/// Result of a name-keyed seed insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted,
    AlreadyPresent,
}

impl SeedOutcome {
    pub fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// Errors that can occur while operating on platforms.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, sqlx::FromRow)]
struct PlatformRow {
    id: String,
    name: String,
    url: String,
    logo_url: Option<String>,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl PlatformRow {
    fn into_domain(self) -> Platform {
        Platform {
            id: self.id,
            name: self.name,
            url: self.url,
            logo_url: self.logo_url,
            is_default: self.is_default,
            created_at: self.created_at,
        }
    }
}

/// Repository for the append-only check history.
#[derive(Clone)]
pub struct DomainCheckRepository {
    pool: SqlitePool,
}

impl DomainCheckRepository {
    /// Appends a check result.
    pub async fn insert(&self, check: &DomainCheck) -> Result<(), DomainCheckError> {
        sqlx::query("INSERT INTO domain_checks (domain, available, checked_at) VALUES (?, ?, ?)")
            .bind(&check.domain)
            .bind(check.available)
            .bind(to_rfc3339(check.checked_at))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Returns at most `limit` checks, newest first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<DomainCheck>, DomainCheckError> {
        let rows = sqlx::query_as::<_, DomainCheckRow>(
            "SELECT domain, available, checked_at FROM domain_checks \
             ORDER BY checked_at DESC, seq DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DomainCheck {
                domain: row.domain,
                available: row.available,
                checked_at: row.checked_at,
            })
            .collect())
    }
}

/// Errors that can occur while reading or writing check history.
#[derive(Debug, Error)]
pub enum DomainCheckError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, sqlx::FromRow)]
struct DomainCheckRow {
    domain: String,
    available: bool,
    checked_at: DateTime<Utc>,
}

/// Repository for liveness records.
#[derive(Clone)]
pub struct StatusCheckRepository {
    pool: SqlitePool,
}

impl StatusCheckRepository {
    pub async fn insert(&self, status: &StatusCheck) -> Result<(), StatusCheckError> {
        sqlx::query("INSERT INTO status_checks (id, client_name, timestamp) VALUES (?, ?, ?)")
            .bind(&status.id)
            .bind(&status.client_name)
            .bind(to_rfc3339(status.timestamp))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Returns at most `limit` records in no particular order.
    pub async fn list(&self, limit: i64) -> Result<Vec<StatusCheck>, StatusCheckError> {
        let rows = sqlx::query_as::<_, StatusCheckRow>(
            "SELECT id, client_name, timestamp FROM status_checks LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StatusCheck {
                id: row.id,
                client_name: row.client_name,
                timestamp: row.timestamp,
            })
            .collect())
    }
}

/// Errors that can occur while operating on liveness records.
#[derive(Debug, Error)]
pub enum StatusCheckError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, sqlx::FromRow)]
struct StatusCheckRow {
    id: String,
    client_name: String,
    timestamp: DateTime<Utc>,
}

fn to_rfc3339(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain_radar_core::catalogue::DEFAULT_PLATFORMS;
    use domain_radar_core::types::NewPlatform;

    async fn setup_db() -> Database {
        let db = Database::connect("sqlite::memory:?cache=shared")
            .await
            .expect("connect");
        db.run_migrations().await.expect("migrations");
        db
    }

    fn sample_platform(name: &str) -> Platform {
        Platform::from_new(
            NewPlatform {
                name: name.to_string(),
                url: format!("https://{}.example/search?q={{}}", name.to_lowercase()),
                logo_url: Some(format!("https://{}.example/logo.svg", name.to_lowercase())),
            },
            "2024-01-01T00:00:00Z".parse().expect("timestamp"),
        )
    }

    #[tokio::test]
    async fn migrations_apply() {
        let db = setup_db().await;

        let tables: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
             AND name IN ('platforms', 'domain_checks', 'status_checks')",
        )
        .fetch_one(db.pool())
        .await
        .expect("fetch tables");
        assert_eq!(tables.0, 3);
    }

    #[tokio::test]
    async fn inserted_platform_round_trips() {
        let db = setup_db().await;
        let repo = db.platforms();
        let platform = sample_platform("Porkbun");

        repo.insert(&platform).await.expect("insert");

        assert_eq!(repo.list_all().await.expect("list"), vec![platform]);
    }

    #[tokio::test]
    async fn seeding_twice_keeps_one_row_per_name() {
        let db = setup_db().await;
        let repo = db.platforms();
        let now = Utc::now();

        for entry in DEFAULT_PLATFORMS {
            let outcome = repo
                .insert_if_name_absent(&entry.to_platform(now))
                .await
                .expect("first seed");
            assert!(outcome.is_inserted());
        }
        for entry in DEFAULT_PLATFORMS {
            let outcome = repo
                .insert_if_name_absent(&entry.to_platform(now))
                .await
                .expect("second seed");
            assert_eq!(outcome, SeedOutcome::AlreadyPresent);
        }

        let platforms = repo.list_all().await.expect("list");
        assert_eq!(platforms.len(), DEFAULT_PLATFORMS.len());
        assert!(platforms.iter().all(|p| p.is_default));
    }

    #[tokio::test]
    async fn seeding_skips_names_created_by_users() {
        let db = setup_db().await;
        let repo = db.platforms();
        let custom = sample_platform("GoDaddy");
        repo.insert(&custom).await.expect("insert custom");

        let outcome = repo
            .insert_if_name_absent(&DEFAULT_PLATFORMS[0].to_platform(Utc::now()))
            .await
            .expect("seed");

        assert_eq!(outcome, SeedOutcome::AlreadyPresent);
        let platforms = repo.list_all().await.expect("list");
        assert_eq!(platforms.len(), 1);
        assert_eq!(platforms[0].id, custom.id);
    }

    #[tokio::test]
    async fn partial_update_only_touches_given_fields() {
        let db = setup_db().await;
        let repo = db.platforms();
        let platform = sample_platform("Porkbun");
        repo.insert(&platform).await.expect("insert");

        let update = PlatformUpdate {
            logo_url: Some("x".to_string()),
            ..PlatformUpdate::default()
        };
        let updated = repo.update(&platform.id, &update).await.expect("update");

        assert_eq!(updated.name, platform.name);
        assert_eq!(updated.url, platform.url);
        assert_eq!(updated.logo_url.as_deref(), Some("x"));
        assert_eq!(updated.created_at, platform.created_at);
    }

    #[tokio::test]
    async fn update_with_no_fields_returns_record_unchanged() {
        let db = setup_db().await;
        let repo = db.platforms();
        let platform = sample_platform("Porkbun");
        repo.insert(&platform).await.expect("insert");

        let updated = repo
            .update(&platform.id, &PlatformUpdate::default())
            .await
            .expect("update");
        assert_eq!(updated, platform);
    }

    #[tokio::test]
    async fn update_unknown_platform_is_not_found() {
        let db = setup_db().await;
        let err = db
            .platforms()
            .update("missing", &PlatformUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::NotFound));
    }

    #[tokio::test]
    async fn delete_removes_platform_and_then_reports_not_found() {
        let db = setup_db().await;
        let repo = db.platforms();
        let platform = sample_platform("Porkbun");
        repo.insert(&platform).await.expect("insert");

        repo.delete(&platform.id).await.expect("delete");
        assert!(repo.list_all().await.expect("list").is_empty());

        let err = repo.delete(&platform.id).await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound));
    }

    #[tokio::test]
    async fn history_is_newest_first_and_capped() {
        let db = setup_db().await;
        let repo = db.domain_checks();
        let start: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().expect("timestamp");

        for i in 0..60 {
            repo.insert(&DomainCheck {
                domain: format!("site-{i}"),
                available: i % 2 == 0,
                checked_at: start + Duration::seconds(i),
            })
            .await
            .expect("insert");
        }

        let history = repo.list_recent(HISTORY_LIMIT).await.expect("list");
        assert_eq!(history.len(), 50);
        assert_eq!(history[0].domain, "site-59");
        assert_eq!(history[49].domain, "site-10");
        assert!(history
            .windows(2)
            .all(|pair| pair[0].checked_at >= pair[1].checked_at));
    }

    #[tokio::test]
    async fn status_records_are_listed_with_limit() {
        let db = setup_db().await;
        let repo = db.status_checks();
        let now: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().expect("timestamp");

        let first = StatusCheck::new("frontend", now);
        let second = StatusCheck::new("monitor", now);
        repo.insert(&first).await.expect("insert first");
        repo.insert(&second).await.expect("insert second");

        let all = repo.list(STATUS_LIST_LIMIT).await.expect("list");
        assert_eq!(all.len(), 2);
        assert!(all.contains(&first));
        assert!(all.contains(&second));

        assert_eq!(repo.list(1).await.expect("limited").len(), 1);
    }
}
