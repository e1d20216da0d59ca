//! Response repository and statistic engine
//!
//! Every response mutation adjusts the per-question statistic inside the
//! same transaction, so the counters always match the live responses:
//!
//! - create: insert response, create statistic lazily, +1 on one counter
//! - update: flip the answer, -1 on the old counter, +1 on the new one
//! - delete: remove response, -1 on its counter
//!
//! Counters are only ever changed by relative updates and never recomputed.
//! Each transaction opens with a write, so SQLite takes the write lock
//! before anything is read.

use sqlx::{FromRow, SqliteConnection, SqlitePool};

use super::DbError;

/// Response record from database
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct SurveyResponse {
    pub id: i64,
    pub question_id: i64,
    pub is_agree: bool,
}

/// Per-question tally of answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct Statistic {
    pub question_id: i64,
    pub agree_count: i64,
    pub disagree_count: i64,
}

impl Statistic {
    /// Number of live responses the statistic accounts for.
    pub fn total(&self) -> i64 {
        self.agree_count + self.disagree_count
    }
}

/// Which of the two counters an answer lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Counter {
    Agree,
    Disagree,
}

impl Counter {
    fn for_answer(is_agree: bool) -> Self {
        if is_agree {
            Self::Agree
        } else {
            Self::Disagree
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Agree => "agree_count",
            Self::Disagree => "disagree_count",
        }
    }

    fn value(self, stat: &Statistic) -> i64 {
        match self {
            Self::Agree => stat.agree_count,
            Self::Disagree => stat.disagree_count,
        }
    }

    fn increment_sql(self) -> &'static str {
        match self {
            Self::Agree => {
                "UPDATE statistics SET agree_count = agree_count + 1 WHERE question_id = $1"
            }
            Self::Disagree => {
                "UPDATE statistics SET disagree_count = disagree_count + 1 WHERE question_id = $1"
            }
        }
    }

    fn decrement_sql(self) -> &'static str {
        match self {
            Self::Agree => {
                "UPDATE statistics SET agree_count = agree_count - 1 \
                 WHERE question_id = $1 AND agree_count > 0"
            }
            Self::Disagree => {
                "UPDATE statistics SET disagree_count = disagree_count - 1 \
                 WHERE question_id = $1 AND disagree_count > 0"
            }
        }
    }
}

/// Response repository
pub struct ResponseRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ResponseRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record an answer to a question (atomic).
    ///
    /// Fails with `NotFound` before anything is written when the question
    /// does not exist.
    pub async fn create(&self, question_id: i64, is_agree: bool) -> Result<SurveyResponse, DbError> {
        let mut tx = self.pool.begin().await?;

        // Insert-select doubles as the existence check
        let response: SurveyResponse = sqlx::query_as(
            r#"
            INSERT INTO responses (question_id, is_agree)
            SELECT id, $2 FROM questions WHERE id = $1
            RETURNING id, question_id, is_agree
            "#,
        )
        .bind(question_id)
        .bind(is_agree)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("question", question_id))?;

        sqlx::query(
            r#"
            INSERT INTO statistics (question_id, agree_count, disagree_count)
            VALUES ($1, 0, 0)
            ON CONFLICT (question_id) DO NOTHING
            "#,
        )
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

        increment(&mut tx, question_id, Counter::for_answer(is_agree)).await?;

        tx.commit().await?;

        tracing::info!(
            response_id = response.id,
            question_id,
            is_agree,
            "response recorded"
        );
        Ok(response)
    }

    /// Get a single response by ID.
    pub async fn get(&self, id: i64) -> Result<SurveyResponse, DbError> {
        sqlx::query_as("SELECT id, question_id, is_agree FROM responses WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("response", id))
    }

    /// Change the answer of a response (atomic).
    ///
    /// Re-submitting the current answer is a no-op. When the question has no
    /// statistic row the counters are left alone rather than fabricated.
    pub async fn update(&self, id: i64, is_agree: bool) -> Result<SurveyResponse, DbError> {
        let mut tx = self.pool.begin().await?;

        // Only matches when the answer actually flips
        let flipped: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE responses SET is_agree = $2
            WHERE id = $1 AND is_agree <> $2
            RETURNING question_id
            "#,
        )
        .bind(id)
        .bind(is_agree)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((question_id,)) = flipped else {
            let unchanged: SurveyResponse =
                sqlx::query_as("SELECT id, question_id, is_agree FROM responses WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| DbError::not_found("response", id))?;

            tracing::debug!(response_id = id, "response unchanged");
            return Ok(unchanged);
        };

        match load_statistic(&mut tx, question_id).await? {
            Some(stat) => {
                decrement(&mut tx, &stat, Counter::for_answer(!is_agree)).await?;
                increment(&mut tx, question_id, Counter::for_answer(is_agree)).await?;
            }
            None => tracing::warn!(
                response_id = id,
                question_id,
                "no statistic row for question, counters not adjusted"
            ),
        }

        tx.commit().await?;

        tracing::info!(response_id = id, question_id, is_agree, "response updated");
        Ok(SurveyResponse {
            id,
            question_id,
            is_agree,
        })
    }

    /// Delete a response and take it out of its question's statistic (atomic).
    pub async fn delete(&self, id: i64) -> Result<SurveyResponse, DbError> {
        let mut tx = self.pool.begin().await?;

        let removed: SurveyResponse = sqlx::query_as(
            r#"
            DELETE FROM responses WHERE id = $1
            RETURNING id, question_id, is_agree
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("response", id))?;

        match load_statistic(&mut tx, removed.question_id).await? {
            Some(stat) => decrement(&mut tx, &stat, Counter::for_answer(removed.is_agree)).await?,
            None => tracing::warn!(
                response_id = id,
                question_id = removed.question_id,
                "no statistic row for question, counters not adjusted"
            ),
        }

        tx.commit().await?;

        tracing::info!(response_id = id, question_id = removed.question_id, "response deleted");
        Ok(removed)
    }

    /// List all statistics ordered by question.
    pub async fn list_statistics(&self) -> Result<Vec<Statistic>, DbError> {
        let stats = sqlx::query_as(
            r#"
            SELECT question_id, agree_count, disagree_count
            FROM statistics
            ORDER BY question_id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(stats)
    }

    /// Get the statistic of one question, if any response was ever recorded.
    pub async fn statistic(&self, question_id: i64) -> Result<Option<Statistic>, DbError> {
        let mut conn = self.pool.acquire().await?;
        load_statistic(&mut conn, question_id).await
    }
}

/// Remove every response and the statistic of a question being deleted.
///
/// Returns the number of responses removed.
pub(crate) async fn purge_question(
    conn: &mut SqliteConnection,
    question_id: i64,
) -> Result<u64, DbError> {
    let responses = sqlx::query("DELETE FROM responses WHERE question_id = $1")
        .bind(question_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM statistics WHERE question_id = $1")
        .bind(question_id)
        .execute(&mut *conn)
        .await?;

    Ok(responses)
}

async fn load_statistic(
    conn: &mut SqliteConnection,
    question_id: i64,
) -> Result<Option<Statistic>, DbError> {
    let stat = sqlx::query_as(
        r#"
        SELECT question_id, agree_count, disagree_count
        FROM statistics
        WHERE question_id = $1
        "#,
    )
    .bind(question_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(stat)
}

async fn increment(
    conn: &mut SqliteConnection,
    question_id: i64,
    counter: Counter,
) -> Result<(), DbError> {
    sqlx::query(counter.increment_sql())
        .bind(question_id)
        .execute(&mut *conn)
        .await?;

    tracing::debug!(question_id, counter = counter.column(), "counter incremented");
    Ok(())
}

/// Decrement one counter, refusing to go below zero.
async fn decrement(
    conn: &mut SqliteConnection,
    stat: &Statistic,
    counter: Counter,
) -> Result<(), DbError> {
    let underflow = || {
        tracing::error!(
            question_id = stat.question_id,
            counter = counter.column(),
            agree_count = stat.agree_count,
            disagree_count = stat.disagree_count,
            "statistic drift detected: counter already at zero"
        );
        DbError::CounterUnderflow {
            question_id: stat.question_id,
            counter: counter.column(),
        }
    };

    if counter.value(stat) == 0 {
        return Err(underflow());
    }

    let updated = sqlx::query(counter.decrement_sql())
        .bind(stat.question_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(underflow());
    }

    tracing::debug!(
        question_id = stat.question_id,
        counter = counter.column(),
        "counter decremented"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    async fn pool_with_question() -> SqlitePool {
        let pool = open_in_memory().await.unwrap();
        sqlx::query("INSERT INTO questions (question) VALUES ('Do you like football?')")
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn first_response_creates_statistic() {
        let pool = pool_with_question().await;
        let repo = ResponseRepo::new(&pool);
        assert_eq!(repo.statistic(1).await.unwrap(), None);

        let response = repo.create(1, true).await.unwrap();

        assert_eq!(response.question_id, 1);
        assert!(response.is_agree);
        assert_eq!(
            repo.statistic(1).await.unwrap(),
            Some(Statistic {
                question_id: 1,
                agree_count: 1,
                disagree_count: 0
            })
        );
    }

    #[tokio::test]
    async fn missing_question_leaves_no_trace() {
        let pool = pool_with_question().await;
        let repo = ResponseRepo::new(&pool);

        let err = repo.create(2, false).await.unwrap_err();

        assert!(matches!(err, DbError::NotFound { resource: "question", .. }));
        assert!(repo.list_statistics().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn flip_moves_one_count() {
        let pool = pool_with_question().await;
        let repo = ResponseRepo::new(&pool);
        let response = repo.create(1, true).await.unwrap();

        let updated = repo.update(response.id, false).await.unwrap();
        assert!(!updated.is_agree);

        let stat = repo.statistic(1).await.unwrap().unwrap();
        assert_eq!((stat.agree_count, stat.disagree_count), (0, 1));
    }

    #[tokio::test]
    async fn same_answer_is_noop() {
        let pool = pool_with_question().await;
        let repo = ResponseRepo::new(&pool);
        let response = repo.create(1, false).await.unwrap();

        let unchanged = repo.update(response.id, false).await.unwrap();

        assert_eq!(unchanged, response);
        let stat = repo.statistic(1).await.unwrap().unwrap();
        assert_eq!((stat.agree_count, stat.disagree_count), (0, 1));
    }

    #[tokio::test]
    async fn delete_keeps_zeroed_statistic() {
        let pool = pool_with_question().await;
        let repo = ResponseRepo::new(&pool);
        let response = repo.create(1, true).await.unwrap();

        repo.delete(response.id).await.unwrap();

        assert_eq!(
            repo.statistic(1).await.unwrap(),
            Some(Statistic {
                question_id: 1,
                agree_count: 0,
                disagree_count: 0
            })
        );
        assert!(matches!(
            repo.get(response.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn unknown_response_is_not_found() {
        let pool = pool_with_question().await;
        let repo = ResponseRepo::new(&pool);

        assert!(matches!(
            repo.update(9, true).await.unwrap_err(),
            DbError::NotFound { resource: "response", .. }
        ));
        assert!(matches!(
            repo.delete(9).await.unwrap_err(),
            DbError::NotFound { resource: "response", .. }
        ));
    }

    #[test]
    fn counter_columns() {
        assert_eq!(Counter::for_answer(true).column(), "agree_count");
        assert_eq!(Counter::for_answer(false).column(), "disagree_count");
    }
}
