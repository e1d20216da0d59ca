//! Question repository
//!
//! Questions carry an optional category reference, checked at write time.
//! Reads embed a snapshot of the category through a LEFT JOIN.

use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::models::{QuestionPatch, QuestionText};
use super::responses::purge_question;
use super::{Category, DbError};

const SELECT_QUESTIONS: &str = r#"
    SELECT q.id, q.question, c.id AS category_id, c.name AS category_name
    FROM questions q
    LEFT JOIN categories c ON c.id = q.category_id
"#;

/// Question with its category embedded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub category: Option<Category>,
}

#[derive(FromRow)]
struct QuestionRow {
    id: i64,
    question: String,
    category_id: Option<i64>,
    category_name: Option<String>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        let category = match (row.category_id, row.category_name) {
            (Some(id), Some(name)) => Some(Category { id, name }),
            _ => None,
        };

        Self {
            id: row.id,
            question: row.question,
            category,
        }
    }
}

/// Question repository
pub struct QuestionRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> QuestionRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a question, optionally attached to an existing category.
    ///
    /// The insert is guarded by the category lookup and opens the
    /// transaction, so SQLite takes the write lock before anything is read.
    pub async fn create(
        &self,
        text: QuestionText,
        category_id: Option<i64>,
    ) -> Result<Question, DbError> {
        let mut tx = self.pool.begin().await?;

        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO questions (question, category_id)
            SELECT $1, $2
            WHERE $2 IS NULL OR EXISTS (SELECT 1 FROM categories WHERE id = $2)
            RETURNING id
            "#,
        )
        .bind(text.as_str())
        .bind(category_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((id,)) = inserted else {
            // Only a missing category can suppress the insert
            return Err(DbError::not_found("category", category_id.unwrap_or_default()));
        };

        let question = fetch_question(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(question_id = id, ?category_id, "question created");
        Ok(question)
    }

    /// List all questions with their categories.
    pub async fn list(&self) -> Result<Vec<Question>, DbError> {
        let rows: Vec<QuestionRow> = sqlx::query_as(&format!("{SELECT_QUESTIONS} ORDER BY q.id"))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Question::from).collect())
    }

    /// Get a single question by ID.
    pub async fn get(&self, id: i64) -> Result<Question, DbError> {
        let mut conn = self.pool.acquire().await?;
        fetch_question(&mut conn, id).await
    }

    /// Apply a partial update (atomic).
    ///
    /// A `Some(None)` category clears the association. The transaction opens
    /// with the text update, which doubles as the existence check.
    pub async fn update(&self, id: i64, patch: QuestionPatch) -> Result<Question, DbError> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE questions SET question = COALESCE($2, question)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(patch.question.as_ref().map(QuestionText::as_str))
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Err(DbError::not_found("question", id));
        }

        if let Some(category_id) = patch.category {
            if let Some(category_id) = category_id {
                find_category(&mut tx, category_id).await?;
            }

            sqlx::query("UPDATE questions SET category_id = $2 WHERE id = $1")
                .bind(id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
        }

        let question = fetch_question(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(question_id = id, "question updated");
        Ok(question)
    }

    /// Delete a question together with its responses and statistic (atomic).
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let responses = purge_question(&mut tx, id).await?;

        let deleted = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(DbError::not_found("question", id));
        }

        tx.commit().await?;

        tracing::info!(question_id = id, responses, "question deleted");
        Ok(())
    }
}

async fn find_category(conn: &mut SqliteConnection, id: i64) -> Result<Category, DbError> {
    sqlx::query_as("SELECT id, name FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("category", id))
}

async fn fetch_question(conn: &mut SqliteConnection, id: i64) -> Result<Question, DbError> {
    let row: QuestionRow = sqlx::query_as(&format!("{SELECT_QUESTIONS} WHERE q.id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("question", id))?;

    Ok(row.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_in_memory, CategoryRepo};
    use crate::models::CategoryName;

    fn text(s: &str) -> QuestionText {
        QuestionText::new(s).unwrap()
    }

    async fn sports(pool: &SqlitePool) -> Category {
        CategoryRepo::new(pool)
            .create(CategoryName::new("Sports").unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_embeds_category() {
        let pool = open_in_memory().await.unwrap();
        let category = sports(&pool).await;

        let question = QuestionRepo::new(&pool)
            .create(text("Do you like football?"), Some(category.id))
            .await
            .unwrap();

        assert_eq!(question.id, 1);
        assert_eq!(question.question, "Do you like football?");
        assert_eq!(question.category, Some(category));
    }

    #[tokio::test]
    async fn create_with_unknown_category_writes_nothing() {
        let pool = open_in_memory().await.unwrap();
        let repo = QuestionRepo::new(&pool);

        let err = repo
            .create(text("Do you like football?"), Some(99))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { resource: "category", .. }));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_can_clear_category() {
        let pool = open_in_memory().await.unwrap();
        let category = sports(&pool).await;
        let repo = QuestionRepo::new(&pool);
        let question = repo
            .create(text("Do you like football?"), Some(category.id))
            .await
            .unwrap();

        let patch = QuestionPatch::new(None, Some(None)).unwrap();
        let updated = repo.update(question.id, patch).await.unwrap();

        assert_eq!(updated.category, None);
        assert_eq!(updated.question, "Do you like football?");
    }

    #[tokio::test]
    async fn update_with_unknown_category_leaves_text_untouched() {
        let pool = open_in_memory().await.unwrap();
        let repo = QuestionRepo::new(&pool);
        let question = repo.create(text("Do you like football?"), None).await.unwrap();

        let patch = QuestionPatch::new(Some("Do you like basketball?"), Some(Some(5))).unwrap();
        let err = repo.update(question.id, patch).await.unwrap_err();

        assert!(matches!(err, DbError::NotFound { resource: "category", .. }));
        assert_eq!(
            repo.get(question.id).await.unwrap().question,
            "Do you like football?"
        );
    }

    #[tokio::test]
    async fn get_missing_question_is_not_found() {
        let pool = open_in_memory().await.unwrap();
        let err = QuestionRepo::new(&pool).get(3).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "question", .. }));
    }
}
