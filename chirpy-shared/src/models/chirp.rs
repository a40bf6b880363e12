/// Chirp model and database operations
///
/// Chirps are the posts users publish. Reading them is public; creating one
/// requires an access token and deleting one additionally requires being its
/// author (see [`crate::auth::authorization`]).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE chirps (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     body TEXT NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A published post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,

    /// Post text
    pub body: String,

    /// Author (owner) of the chirp
    pub user_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a chirp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChirp {
    pub body: String,

    /// Author, always taken from the caller's verified identity
    pub user_id: Uuid,
}

/// Sort direction for chirp listings (by creation time)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filters for listing chirps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChirpQuery {
    /// Only chirps by this author
    pub author_id: Option<Uuid>,

    pub sort: SortOrder,
}

impl Chirp {
    /// Creates a chirp
    pub async fn create(pool: &PgPool, data: CreateChirp) -> Result<Self, sqlx::Error> {
        let chirp = sqlx::query_as::<_, Chirp>(
            r#"
            INSERT INTO chirps (body, user_id)
            VALUES ($1, $2)
            RETURNING id, body, user_id, created_at, updated_at
            "#,
        )
        .bind(data.body)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(chirp)
    }

    /// Finds a chirp by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let chirp = sqlx::query_as::<_, Chirp>(
            r#"
            SELECT id, body, user_id, created_at, updated_at
            FROM chirps
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(chirp)
    }

    /// Lists chirps, optionally filtered by author
    pub async fn list(pool: &PgPool, query: ChirpQuery) -> Result<Vec<Self>, sqlx::Error> {
        // ORDER BY direction cannot be bound as a parameter
        let sql = format!(
            r#"
            SELECT id, body, user_id, created_at, updated_at
            FROM chirps
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at {}
            "#,
            query.sort.as_sql()
        );

        let chirps = sqlx::query_as::<_, Chirp>(&sql)
            .bind(query.author_id)
            .fetch_all(pool)
            .await?;

        Ok(chirps)
    }

    /// Deletes a chirp
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_defaults_to_ascending() {
        assert_eq!(SortOrder::default(), SortOrder::Asc);
        assert_eq!(ChirpQuery::default().sort.as_sql(), "ASC");
    }

    #[test]
    fn test_sort_order_deserializes_lowercase() {
        let order: SortOrder = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(order, SortOrder::Desc);
    }
}
