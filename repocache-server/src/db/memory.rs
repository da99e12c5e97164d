//! In-process repository cache.
//!
//! Same contract as [`PgRepoStore`](super::PgRepoStore); contents are lost
//! on restart. Backs `repocache serve --in-memory` and the handler tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{RepoStore, StoreError};
use crate::models::{Repository, UpstreamRepo};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    rows: HashMap<(String, String), Repository>,
}

/// Repository cache held in a mutex-guarded map
#[derive(Debug, Default)]
pub struct MemoryRepoStore {
    inner: Mutex<Inner>,
}

impl MemoryRepoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all owners.
    pub fn len(&self) -> Result<usize, StoreError> {
        let inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl RepoStore for MemoryRepoStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn upsert_all(&self, repos: &[UpstreamRepo]) -> Result<Vec<Repository>, StoreError> {
        let mut inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stored = Vec::with_capacity(repos.len());

        for repo in repos {
            let key = (repo.name.clone(), repo.owner.login.clone());
            let id = match inner.rows.get(&key) {
                Some(existing) => existing.id,
                None => {
                    inner.next_id += 1;
                    inner.next_id
                }
            };

            let record = Repository {
                id,
                name: repo.name.clone(),
                owner: repo.owner.login.clone(),
                language: repo.language.clone(),
                url: repo.html_url.clone(),
                created_at: repo.created_at,
            };
            inner.rows.insert(key, record.clone());
            stored.push(record);
        }

        Ok(stored)
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Repository>, StoreError> {
        let inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        let mut found: Vec<Repository> = inner
            .rows
            .values()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect();

        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UpstreamOwner;

    fn repo(name: &str, owner: &str, language: Option<&str>, created_at: &str) -> UpstreamRepo {
        UpstreamRepo {
            name: name.into(),
            owner: UpstreamOwner {
                login: owner.into(),
            },
            language: language.map(str::to_owned),
            html_url: format!("https://github.com/{}/{}", owner, name),
            created_at: created_at.parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn repeated_upsert_does_not_duplicate() {
        let store = MemoryRepoStore::new();
        let input = vec![
            repo("a", "alice", Some("Go"), "2020-01-01T00:00:00Z"),
            repo("b", "alice", None, "2021-01-01T00:00:00Z"),
        ];

        let first = store.upsert_all(&input).await.unwrap();
        let second = store.upsert_all(&input).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn upsert_overwrites_language_and_keeps_id() {
        let store = MemoryRepoStore::new();
        let first = store
            .upsert_all(&[repo("a", "alice", Some("Go"), "2020-01-01T00:00:00Z")])
            .await
            .unwrap();
        let second = store
            .upsert_all(&[repo("a", "alice", Some("Rust"), "2020-01-01T00:00:00Z")])
            .await
            .unwrap();

        assert_eq!(first[0].id, second[0].id);
        assert_eq!(second[0].language.as_deref(), Some("Rust"));
        let found = store.find_by_owner("alice").await.unwrap();
        assert_eq!(found[0].language.as_deref(), Some("Rust"));
    }

    #[tokio::test]
    async fn same_name_different_owner_are_distinct() {
        let store = MemoryRepoStore::new();
        store
            .upsert_all(&[
                repo("dotfiles", "alice", None, "2020-01-01T00:00:00Z"),
                repo("dotfiles", "bob", None, "2020-01-01T00:00:00Z"),
            ])
            .await
            .unwrap();

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.find_by_owner("bob").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_by_owner_sorts_newest_first() {
        let store = MemoryRepoStore::new();
        store
            .upsert_all(&[
                repo("old", "alice", None, "2019-01-01T00:00:00Z"),
                repo("new", "alice", None, "2023-01-01T00:00:00Z"),
                repo("mid", "alice", None, "2021-01-01T00:00:00Z"),
                repo("other", "bob", None, "2024-01-01T00:00:00Z"),
            ])
            .await
            .unwrap();

        let names: Vec<_> = store
            .find_by_owner("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn find_unknown_owner_is_empty() {
        let store = MemoryRepoStore::new();
        assert!(store.find_by_owner("nobody").await.unwrap().is_empty());
        assert!(store.is_empty().unwrap());
    }
}
