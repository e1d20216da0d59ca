//! Category repository
//!
//! Plain CRUD. Deleting a category detaches its questions instead of
//! deleting them.

use sqlx::{FromRow, SqlitePool};

use crate::models::CategoryName;
use super::DbError;

/// Category record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Category repository
pub struct CategoryRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CategoryRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a category and return it with its generated id.
    pub async fn create(&self, name: CategoryName) -> Result<Category, DbError> {
        let category: Category = sqlx::query_as(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING id, name
            "#,
        )
        .bind(name.as_str())
        .fetch_one(self.pool)
        .await?;

        tracing::info!(category_id = category.id, "category created");
        Ok(category)
    }

    /// List all categories in insertion order.
    pub async fn list(&self) -> Result<Vec<Category>, DbError> {
        let categories = sqlx::query_as("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        Ok(categories)
    }

    /// Get a single category by ID.
    pub async fn get(&self, id: i64) -> Result<Category, DbError> {
        sqlx::query_as("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("category", id))
    }

    /// Rename a category.
    pub async fn update(&self, id: i64, name: CategoryName) -> Result<Category, DbError> {
        let category: Category = sqlx::query_as(
            r#"
            UPDATE categories SET name = $2
            WHERE id = $1
            RETURNING id, name
            "#,
        )
        .bind(id)
        .bind(name.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("category", id))?;

        tracing::info!(category_id = id, "category updated");
        Ok(category)
    }

    /// Delete a category, clearing the category of every question that
    /// referenced it (atomic).
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let detached = sqlx::query("UPDATE questions SET category_id = NULL WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(DbError::not_found("category", id));
        }

        tx.commit().await?;

        tracing::info!(category_id = id, detached, "category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn name(s: &str) -> CategoryName {
        CategoryName::new(s).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_ids_in_order() {
        let pool = open_in_memory().await.unwrap();
        let repo = CategoryRepo::new(&pool);

        let sports = repo.create(name("Sports")).await.unwrap();
        let music = repo.create(name("Music")).await.unwrap();

        assert_eq!(sports, Category { id: 1, name: "Sports".into() });
        assert_eq!(music.id, 2);
        assert_eq!(repo.list().await.unwrap(), vec![sports, music]);
    }

    #[tokio::test]
    async fn get_by_id() {
        let pool = open_in_memory().await.unwrap();
        let repo = CategoryRepo::new(&pool);
        let sports = repo.create(name("Sports")).await.unwrap();

        assert_eq!(repo.get(sports.id).await.unwrap(), sports);
        assert!(matches!(
            repo.get(9).await.unwrap_err(),
            DbError::NotFound { resource: "category", .. }
        ));
    }

    #[tokio::test]
    async fn update_missing_category_is_not_found() {
        let pool = open_in_memory().await.unwrap();
        let err = CategoryRepo::new(&pool)
            .update(42, name("Films"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { resource: "category", .. }));
    }

    #[tokio::test]
    async fn delete_detaches_questions() {
        let pool = open_in_memory().await.unwrap();
        let repo = CategoryRepo::new(&pool);
        let sports = repo.create(name("Sports")).await.unwrap();

        sqlx::query("INSERT INTO questions (question, category_id) VALUES ('Do you like football?', $1)")
            .bind(sports.id)
            .execute(&pool)
            .await
            .unwrap();

        repo.delete(sports.id).await.unwrap();

        let (category_id,): (Option<i64>,) =
            sqlx::query_as("SELECT category_id FROM questions WHERE id = 1")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(category_id, None);
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_category_is_not_found() {
        let pool = open_in_memory().await.unwrap();
        let err = CategoryRepo::new(&pool).delete(7).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
