//! Result Store: append-only persistence of finished tests.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::history::{InterviewTestRow, QuestionResultRow, StoredTest};
use crate::models::result::{TestResult, TestSummary};

/// Carried by the service as `Arc<dyn ResultStore>`.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Stores one finished test. Returns the new test id.
    async fn save(
        &self,
        owner: Option<Uuid>,
        summary: &TestSummary,
        results: &[TestResult],
    ) -> Result<Uuid, AppError>;

    /// Stored tests for a user, newest first, each with its per-question rows.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<StoredTest>, AppError>;
}

pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn save(
        &self,
        owner: Option<Uuid>,
        summary: &TestSummary,
        results: &[TestResult],
    ) -> Result<Uuid, AppError> {
        let test_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO interview_tests
                (id, user_id, domain, score, total, performance, avg_time_ms)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(test_id)
        .bind(owner)
        .bind(&summary.domain)
        .bind(summary.correct_answers as i32)
        .bind(summary.total_questions as i32)
        .bind(summary.performance_level.as_str())
        .bind(summary.average_response_time)
        .execute(&mut *tx)
        .await?;

        for (position, result) in results.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO interview_question_results
                    (test_id, position, question_id, selected, is_correct, response_time_ms, warned)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(test_id)
            .bind(position as i32)
            .bind(&result.question_id)
            .bind(result.selected_answer as i16)
            .bind(result.is_correct)
            .bind(result.response_time_ms as i64)
            .bind(result.was_warned)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            %test_id,
            domain = %summary.domain,
            questions = results.len(),
            "Stored interview test"
        );
        Ok(test_id)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<StoredTest>, AppError> {
        let tests = sqlx::query_as::<_, InterviewTestRow>(
            "SELECT * FROM interview_tests WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let test_ids: Vec<Uuid> = tests.iter().map(|t| t.id).collect();
        let rows = sqlx::query_as::<_, QuestionResultRow>(
            r#"
            SELECT * FROM interview_question_results
            WHERE test_id = ANY($1)
            ORDER BY test_id, position ASC
            "#,
        )
        .bind(&test_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_by_test(tests, rows))
    }
}

/// Attaches question rows to their test, keeping the test order.
fn group_by_test(tests: Vec<InterviewTestRow>, rows: Vec<QuestionResultRow>) -> Vec<StoredTest> {
    let mut by_test: HashMap<Uuid, Vec<QuestionResultRow>> = HashMap::new();
    for row in rows {
        by_test.entry(row.test_id).or_default().push(row);
    }
    tests
        .into_iter()
        .map(|test| {
            let mut questions = by_test.remove(&test.id).unwrap_or_default();
            questions.sort_by_key(|q| q.position);
            StoredTest { test, questions }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn test_row(id: Uuid, minutes_ago: i64) -> InterviewTestRow {
        InterviewTestRow {
            id,
            user_id: Some(Uuid::nil()),
            domain: "Backend Developer".to_string(),
            score: 3,
            total: 5,
            performance: "Good".to_string(),
            avg_time_ms: 4200.0,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    fn result_row(id: i64, test_id: Uuid, position: i32) -> QuestionResultRow {
        QuestionResultRow {
            id,
            test_id,
            position,
            question_id: format!("q{}", position + 1),
            selected: 0,
            is_correct: true,
            response_time_ms: 3000,
            warned: false,
        }
    }

    #[test]
    fn test_group_by_test_keeps_test_order_and_sorts_positions() {
        let newer = Uuid::new_v4();
        let older = Uuid::new_v4();
        let grouped = group_by_test(
            vec![test_row(newer, 1), test_row(older, 60)],
            vec![
                result_row(1, older, 0),
                result_row(2, newer, 1),
                result_row(3, newer, 0),
            ],
        );

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].test.id, newer);
        let positions: Vec<i32> = grouped[0].questions.iter().map(|q| q.position).collect();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(grouped[1].questions.len(), 1);
    }

    #[test]
    fn test_group_by_test_handles_tests_without_rows() {
        let id = Uuid::new_v4();
        let grouped = group_by_test(vec![test_row(id, 5)], vec![]);
        assert!(grouped[0].questions.is_empty());
    }
}
