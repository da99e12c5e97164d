//! PostgreSQL-backed repository cache
//!
//! - upsert: INSERT with ON CONFLICT (name, owner), one statement per record,
//!   statements run concurrently over the pool
//! - find: single indexed query ordered by created_at DESC

use async_trait::async_trait;
use futures::future::try_join_all;
use sqlx::PgPool;

use super::{RepoStore, StoreError};
use crate::models::{Repository, UpstreamRepo};

/// Repository cache on a shared connection pool
#[derive(Debug, Clone)]
pub struct PgRepoStore {
    pool: PgPool,
}

impl PgRepoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert_one(&self, repo: &UpstreamRepo) -> Result<Repository, StoreError> {
        let stored: Repository = sqlx::query_as(
            r#"
            INSERT INTO repositories (name, owner, language, url, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name, owner) DO UPDATE
            SET language = EXCLUDED.language,
                url = EXCLUDED.url,
                created_at = EXCLUDED.created_at
            RETURNING id, name, owner, language, url, created_at
            "#,
        )
        .bind(&repo.name)
        .bind(&repo.owner.login)
        .bind(&repo.language)
        .bind(&repo.html_url)
        .bind(repo.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }
}

#[async_trait]
impl RepoStore for PgRepoStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn upsert_all(&self, repos: &[UpstreamRepo]) -> Result<Vec<Repository>, StoreError> {
        // try_join_all keeps input order regardless of completion order.
        try_join_all(repos.iter().map(|repo| self.upsert_one(repo))).await
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Repository>, StoreError> {
        let rows: Vec<Repository> = sqlx::query_as(
            r#"
            SELECT id, name, owner, language, url, created_at
            FROM repositories
            WHERE owner = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
