//! Schema for the repository cache

use sqlx::PgPool;

/// Create the repositories table and its owner index if missing.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running repository cache migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS repositories (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            owner TEXT NOT NULL,
            language TEXT,
            url TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            UNIQUE (name, owner)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_repositories_owner_created
        ON repositories (owner, created_at DESC)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Repository cache migrations complete");
    Ok(())
}
