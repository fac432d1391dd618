use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS interview_tests (
        id           UUID PRIMARY KEY,
        user_id      UUID,
        domain       TEXT NOT NULL,
        score        INTEGER NOT NULL,
        total        INTEGER NOT NULL,
        performance  TEXT NOT NULL,
        avg_time_ms  DOUBLE PRECISION NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interview_question_results (
        id                BIGSERIAL PRIMARY KEY,
        test_id           UUID NOT NULL REFERENCES interview_tests(id) ON DELETE CASCADE,
        position          INTEGER NOT NULL,
        question_id       TEXT NOT NULL,
        selected          SMALLINT NOT NULL,
        is_correct        BOOLEAN NOT NULL,
        response_time_ms  BIGINT NOT NULL,
        warned            BOOLEAN NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS interview_tests_user_idx ON interview_tests (user_id, created_at DESC)",
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the result tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Interview result schema ready");
    Ok(())
}
