//! PostgreSQL implementation of the composite link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::{CompositeLink, NewCompositeLink};
use crate::domain::repositories::{CompositeLinkRepository, GetOrCreate};
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on;

const CODE_CONSTRAINT: &str = "composite_links_short_url_key";

const COLUMNS: &str = "id, short_url, has_base_calendar, base_url, base_subjects, \
                       extra_subjects, event_count, created_at";

#[derive(sqlx::FromRow)]
struct CompositeLinkRow {
    id: i64,
    short_url: String,
    has_base_calendar: bool,
    base_url: Option<String>,
    base_subjects: Vec<String>,
    extra_subjects: Vec<String>,
    event_count: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<CompositeLinkRow> for CompositeLink {
    fn from(row: CompositeLinkRow) -> Self {
        Self {
            id: row.id,
            code: row.short_url,
            has_base_calendar: row.has_base_calendar,
            base_url: row.base_url,
            base_subjects: row.base_subjects,
            extra_subjects: row.extra_subjects,
            event_count: row.event_count,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL repository for composite links.
pub struct PgCompositeLinkRepository {
    pool: Arc<PgPool>,
}

impl PgCompositeLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompositeLinkRepository for PgCompositeLinkRepository {
    async fn get_or_create(
        &self,
        new_link: NewCompositeLink,
    ) -> Result<GetOrCreate<CompositeLink>, AppError> {
        let key = new_link.canonical_key.digest();

        let insert = format!(
            r#"
            INSERT INTO composite_links
                (short_url, has_base_calendar, base_url, base_subjects,
                 extra_subjects, event_count, canonical_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (canonical_key) DO NOTHING
            RETURNING {COLUMNS}
            "#
        );

        let inserted = sqlx::query_as::<_, CompositeLinkRow>(&insert)
            .bind(&new_link.code)
            .bind(new_link.has_base_calendar)
            .bind(&new_link.base_url)
            .bind(&new_link.base_subjects)
            .bind(&new_link.extra_subjects)
            .bind(new_link.event_count)
            .bind(&key)
            .fetch_optional(self.pool.as_ref())
            .await;

        match inserted {
            Ok(Some(row)) => return Ok(GetOrCreate::Created(row.into())),
            Ok(None) => {}
            Err(e) if is_unique_violation_on(&e, CODE_CONSTRAINT) => {
                debug!(code = %new_link.code, "Composite short code already taken");
                return Ok(GetOrCreate::CodeTaken);
            }
            Err(e) => return Err(e.into()),
        }

        let select = format!("SELECT {COLUMNS} FROM composite_links WHERE canonical_key = $1");
        let existing = sqlx::query_as::<_, CompositeLinkRow>(&select)
            .bind(&key)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(existing.map_or(GetOrCreate::CodeTaken, |row| {
            GetOrCreate::Existing(row.into())
        }))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<CompositeLink>, AppError> {
        let select = format!("SELECT {COLUMNS} FROM composite_links WHERE short_url = $1");
        let row = sqlx::query_as::<_, CompositeLinkRow>(&select)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM composite_links WHERE short_url = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM composite_links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
