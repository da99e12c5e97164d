//! Repository cache - connection pool, schema, and store implementations
//!
//! # Design Principles
//!
//! - (name, owner) is UNIQUE in the schema; upserts rely on ON CONFLICT,
//!   never check-then-insert
//! - Reads are ordered newest repository first
//! - Errors are reported, never retried here

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repositories;

use async_trait::async_trait;

use crate::models::{Repository, UpstreamRepo};

pub use memory::MemoryRepoStore;
pub use pool::{create_pool, create_pool_with_options};
pub use repositories::PgRepoStore;

/// Storage failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("in-memory store lock poisoned")]
    Poisoned,
}

/// Persistent cache of repositories keyed by (name, owner).
#[async_trait]
pub trait RepoStore: Send + Sync {
    /// Write-or-replace one record per descriptor.
    ///
    /// Returns the stored records in input order.
    async fn upsert_all(&self, repos: &[UpstreamRepo]) -> Result<Vec<Repository>, StoreError>;

    /// All records for `owner`, newest `created_at` first.
    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Repository>, StoreError>;

    /// Short backend name reported by the health check.
    fn backend(&self) -> &'static str;
}
