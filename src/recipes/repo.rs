use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::NewRecipe;

/// Recipe record in the database. `ingredients` and `instructions` are
/// opaque text; callers may store plain text or serialized JSON and the
/// store treats both the same.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: String,
    pub instructions: String,
    pub created_by: Uuid,
    pub created_at: OffsetDateTime,
}

const COLUMNS: &str = "id, title, description, ingredients, instructions, created_by, created_at";

/// Escapes LIKE wildcards so a search term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Builds the ILIKE needle for a substring search, if a term was given.
pub fn search_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(s)))
}

impl Recipe {
    pub async fn create(db: &PgPool, owner: Uuid, new: &NewRecipe) -> anyhow::Result<Recipe> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            INSERT INTO recipes (title, description, ingredients, instructions, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.ingredients)
        .bind(&new.instructions)
        .bind(owner)
        .fetch_one(db)
        .await?;
        Ok(recipe)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"SELECT {COLUMNS} FROM recipes WHERE id = $1"#,
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(recipe)
    }

    /// Full replacement of the mutable fields. `created_by` is never touched.
    pub async fn update(db: &PgPool, id: Uuid, new: &NewRecipe) -> anyhow::Result<Recipe> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes
            SET title = $2, description = $3, ingredients = $4, instructions = $5
            WHERE id = $1
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.ingredients)
        .bind(&new.instructions)
        .fetch_one(db)
        .await?;
        Ok(recipe)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// One page of recipes, ordered by title. A search needle (from
    /// [`search_pattern`]) matches title OR ingredients, case-insensitively.
    pub async fn page(
        db: &PgPool,
        pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM recipes
            WHERE $1::text IS NULL OR title ILIKE $1 OR ingredients ILIKE $1
            ORDER BY title ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn count(db: &PgPool, pattern: Option<&str>) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM recipes
            WHERE $1::text IS NULL OR title ILIKE $1 OR ingredients ILIKE $1
            "#,
        )
        .bind(pattern)
        .fetch_one(db)
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_pattern_wraps_in_wildcards() {
        assert_eq!(search_pattern(Some("Chicken")).as_deref(), Some("%Chicken%"));
    }

    #[test]
    fn search_pattern_escapes_like_metacharacters() {
        assert_eq!(
            search_pattern(Some("100%_done\\")).as_deref(),
            Some("%100\\%\\_done\\\\%")
        );
    }

    #[test]
    fn search_pattern_ignores_blank_terms() {
        assert_eq!(search_pattern(None), None);
        assert_eq!(search_pattern(Some("")), None);
        assert_eq!(search_pattern(Some("   ")), None);
    }

    #[test]
    fn search_pattern_keeps_inner_spaces() {
        assert_eq!(
            search_pattern(Some("bell peppers")).as_deref(),
            Some("%bell peppers%")
        );
    }
}
