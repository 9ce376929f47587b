//! PostgreSQL implementation of the simple link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::{NewSimpleLink, SimpleLink};
use crate::domain::repositories::{GetOrCreate, SimpleLinkRepository};
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on;

const CODE_CONSTRAINT: &str = "short_links_short_url_key";

#[derive(sqlx::FromRow)]
struct SimpleLinkRow {
    id: i64,
    short_url: String,
    url: String,
    subjects: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<SimpleLinkRow> for SimpleLink {
    fn from(row: SimpleLinkRow) -> Self {
        Self {
            id: row.id,
            code: row.short_url,
            url: row.url,
            subjects: row.subjects,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL repository for simple links.
///
/// Get-or-create relies on the unique index over `canonical_key`.
pub struct PgSimpleLinkRepository {
    pool: Arc<PgPool>,
}

impl PgSimpleLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SimpleLinkRepository for PgSimpleLinkRepository {
    async fn get_or_create(
        &self,
        new_link: NewSimpleLink,
    ) -> Result<GetOrCreate<SimpleLink>, AppError> {
        let key = new_link.canonical_key.digest();

        let inserted = sqlx::query_as::<_, SimpleLinkRow>(
            r#"
            INSERT INTO short_links (short_url, url, subjects, canonical_key)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (canonical_key) DO NOTHING
            RETURNING id, short_url, url, subjects, created_at
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.url)
        .bind(&new_link.subjects)
        .bind(&key)
        .fetch_optional(self.pool.as_ref())
        .await;

        match inserted {
            Ok(Some(row)) => return Ok(GetOrCreate::Created(row.into())),
            Ok(None) => {}
            Err(e) if is_unique_violation_on(&e, CODE_CONSTRAINT) => {
                debug!(code = %new_link.code, "Short code already taken");
                return Ok(GetOrCreate::CodeTaken);
            }
            Err(e) => return Err(e.into()),
        }

        // the insert lost to an existing row with the same canonical key
        let existing = sqlx::query_as::<_, SimpleLinkRow>(
            r#"
            SELECT id, short_url, url, subjects, created_at
            FROM short_links
            WHERE canonical_key = $1
            "#,
        )
        .bind(&key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        // a concurrent delete removed it in between; the caller tries again
        Ok(existing.map_or(GetOrCreate::CodeTaken, |row| {
            GetOrCreate::Existing(row.into())
        }))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<SimpleLink>, AppError> {
        let row = sqlx::query_as::<_, SimpleLinkRow>(
            r#"
            SELECT id, short_url, url, subjects, created_at
            FROM short_links
            WHERE short_url = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM short_links WHERE short_url = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
