use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::ScrapedPage;
use crate::kernel::BasePageSink;

/// Policy - one stored policy document (scraped or entered by hand)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Policy {
    pub id: Uuid,
    pub identifier: String,
    pub title: String,
    pub category: String,
    pub content: String,
    pub summary: String,
    pub source_url: String,
    pub source_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_scraped_at: Option<DateTime<Utc>>,
}

/// Filters for listing policies
#[derive(Debug, Clone)]
pub struct PolicyFilter {
    pub category: Option<String>,
    /// Case-insensitive substring match on title or content
    pub search: Option<String>,
    pub include_inactive: bool,
    pub limit: i64,
    pub offset: i64,
}

impl Default for PolicyFilter {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            include_inactive: false,
            limit: 50,
            offset: 0,
        }
    }
}

/// Fields for a manually created policy
#[derive(Debug, Clone)]
pub struct NewPolicy {
    pub identifier: String,
    pub title: String,
    pub category: String,
    pub content: String,
    pub summary: String,
    pub source_url: String,
    pub source_name: String,
}

/// Partial update; `None` leaves the column as is
#[derive(Debug, Clone, Default)]
pub struct PolicyUpdate {
    pub title: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub source_url: Option<String>,
    pub is_active: Option<bool>,
}

/// Number of active policies per category
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Policy {
    /// Insert or update by identifier
    ///
    /// On conflict only the scraped fields (title, content, summary, source_url)
    /// and timestamps change. Category, source name, active flag and created_at
    /// keep their first-insert values.
    pub async fn upsert(page: &ScrapedPage, pool: &PgPool) -> Result<Self> {
        let policy = sqlx::query_as::<_, Policy>(
            r#"
            INSERT INTO policies (
                id, identifier, title, category, content, summary,
                source_url, source_name, last_scraped_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (identifier) DO UPDATE SET
                title = EXCLUDED.title,
                content = EXCLUDED.content,
                summary = EXCLUDED.summary,
                source_url = EXCLUDED.source_url,
                updated_at = NOW(),
                last_scraped_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&page.identifier)
        .bind(&page.title)
        .bind(&page.category)
        .bind(&page.content)
        .bind(&page.summary)
        .bind(&page.source_url)
        .bind(&page.source_name)
        .fetch_one(pool)
        .await?;
        Ok(policy)
    }

    /// Insert a manually entered policy
    pub async fn create(new: NewPolicy, pool: &PgPool) -> Result<Self> {
        let policy = sqlx::query_as::<_, Policy>(
            r#"
            INSERT INTO policies (
                id, identifier, title, category, content, summary, source_url, source_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.identifier)
        .bind(new.title)
        .bind(new.category)
        .bind(new.content)
        .bind(new.summary)
        .bind(new.source_url)
        .bind(new.source_name)
        .fetch_one(pool)
        .await?;
        Ok(policy)
    }

    /// Find policy by ID
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        let policy = sqlx::query_as::<_, Policy>("SELECT * FROM policies WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(policy)
    }

    /// Find policy by its natural key
    pub async fn find_by_identifier(identifier: &str, pool: &PgPool) -> Result<Option<Self>> {
        let policy = sqlx::query_as::<_, Policy>("SELECT * FROM policies WHERE identifier = $1")
            .bind(identifier)
            .fetch_optional(pool)
            .await?;
        Ok(policy)
    }

    /// List policies, most recently updated first
    pub async fn list(filter: &PolicyFilter, pool: &PgPool) -> Result<Vec<Self>> {
        let search = filter.search.as_deref().map(escape_like);

        let policies = sqlx::query_as::<_, Policy>(
            r#"
            SELECT * FROM policies
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL
                   OR title ILIKE '%' || $2 || '%' ESCAPE '\'
                   OR content ILIKE '%' || $2 || '%' ESCAPE '\')
              AND ($3 OR is_active = true)
            ORDER BY updated_at DESC, title
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.category.as_deref())
        .bind(search)
        .bind(filter.include_inactive)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;
        Ok(policies)
    }

    /// The `limit` most recently updated active policies, optionally in one category
    pub async fn find_recent_active(
        limit: i64,
        category: Option<&str>,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let policies = sqlx::query_as::<_, Policy>(
            r#"
            SELECT * FROM policies
            WHERE is_active = true
              AND ($1::text IS NULL OR category = $1)
            ORDER BY updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(category)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(policies)
    }

    /// Active policy counts per category
    pub async fn categories(pool: &PgPool) -> Result<Vec<CategoryCount>> {
        let categories = sqlx::query_as::<_, CategoryCount>(
            r#"
            SELECT category, COUNT(*) AS count
            FROM policies
            WHERE is_active = true
            GROUP BY category
            ORDER BY category
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(categories)
    }

    pub async fn count_active(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM policies WHERE is_active = true",
        )
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Apply a partial update, returning the updated row if it exists
    pub async fn update(id: Uuid, changes: PolicyUpdate, pool: &PgPool) -> Result<Option<Self>> {
        let policy = sqlx::query_as::<_, Policy>(
            r#"
            UPDATE policies SET
                title = COALESCE($2, title),
                category = COALESCE($3, category),
                content = COALESCE($4, content),
                summary = COALESCE($5, summary),
                source_url = COALESCE($6, source_url),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.category)
        .bind(changes.content)
        .bind(changes.summary)
        .bind(changes.source_url)
        .bind(changes.is_active)
        .fetch_optional(pool)
        .await?;
        Ok(policy)
    }

    pub async fn set_active(id: Uuid, active: bool, pool: &PgPool) -> Result<Option<Self>> {
        Self::update(
            id,
            PolicyUpdate {
                is_active: Some(active),
                ..Default::default()
            },
            pool,
        )
        .await
    }

    /// Delete a policy; returns false when nothing matched
    pub async fn delete(id: Uuid, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM policies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Postgres-backed page sink
// =============================================================================

/// Stores accepted pages in the `policies` table
#[derive(Clone)]
pub struct PolicyStore {
    pool: PgPool,
}

impl PolicyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BasePageSink for PolicyStore {
    async fn store(&self, page: &ScrapedPage) -> Result<()> {
        let policy = Policy::upsert(page, &self.pool).await?;
        tracing::debug!(
            identifier = %policy.identifier,
            policy_id = %policy.id,
            "Policy upserted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
