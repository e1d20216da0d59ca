//! Schema migrations for the survey tables
//!
//! Every statement is idempotent, so `run` is safe on each startup.

use sqlx::SqlitePool;

/// Run all survey migrations
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    tracing::info!("Running survey migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question TEXT NOT NULL,
            category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS responses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question_id INTEGER NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            is_agree BOOLEAN NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One row per question, counters can never go negative
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS statistics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question_id INTEGER NOT NULL UNIQUE REFERENCES questions(id) ON DELETE CASCADE,
            agree_count INTEGER NOT NULL DEFAULT 0 CHECK (agree_count >= 0),
            disagree_count INTEGER NOT NULL DEFAULT 0 CHECK (disagree_count >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_questions_category ON questions(category_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_responses_question ON responses(question_id)")
        .execute(pool)
        .await?;

    tracing::info!("Survey migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::create_memory_pool;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = create_memory_pool().await.unwrap();

        run(&pool).await.expect("first run failed");
        run(&pool).await.expect("second run failed");

        let (tables,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM sqlite_master
            WHERE type = 'table'
              AND name IN ('categories', 'questions', 'responses', 'statistics')
            "#,
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(tables, 4);
    }
}
