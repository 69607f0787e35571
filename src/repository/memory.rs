//! Process-local module store.
//!
//! Records live in a `DashMap`; ids come from an atomic counter starting at 1
//! and are never reused, even after deletion.

use super::{ModuleRepository, RepositoryError};
use crate::module::Module;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

pub struct InMemoryModuleRepository {
    modules: DashMap<i64, Module>,
    next_id: AtomicI64,
}

impl InMemoryModuleRepository {
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored modules
    pub fn count(&self) -> usize {
        self.modules.len()
    }
}

impl Default for InMemoryModuleRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModuleRepository for InMemoryModuleRepository {
    async fn get_by_id(&self, id: i64) -> Result<Module, RepositoryError> {
        self.modules
            .get(&id)
            .map(|m| m.clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<Module>, RepositoryError> {
        let mut modules: Vec<Module> = self.modules.iter().map(|m| m.clone()).collect();
        modules.sort_by_key(|m| m.id);
        Ok(modules)
    }

    async fn insert(&self, mut module: Module) -> Result<Module, RepositoryError> {
        module.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.modules.insert(module.id, module.clone());
        Ok(module)
    }

    async fn replace(&self, module: &Module) -> Result<(), RepositoryError> {
        let mut existing = self
            .modules
            .get_mut(&module.id)
            .ok_or(RepositoryError::NotFound)?;
        *existing = module.clone();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.modules.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample(name: &str) -> Module {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        Module {
            id: 0,
            name: name.to_string(),
            content: "content".to_string(),
            description: String::new(),
            category: String::new(),
            create_time: now,
            update_time: now,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = InMemoryModuleRepository::new();
        let a = repo.insert(sample("a")).await.unwrap();
        let b = repo.insert(sample("b")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(repo.count(), 2);
    }

    #[tokio::test]
    async fn test_insert_ignores_caller_id() {
        let repo = InMemoryModuleRepository::new();
        let mut module = sample("a");
        module.id = 42;

        let stored = repo.insert(module).await.unwrap();
        assert_eq!(stored.id, 1);
        assert!(matches!(
            repo.get_by_id(42).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = InMemoryModuleRepository::new();
        assert!(matches!(
            repo.get_by_id(1).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_all_ordered_by_id() {
        let repo = InMemoryModuleRepository::new();
        for name in ["c", "a", "b"] {
            repo.insert(sample(name)).await.unwrap();
        }

        let ids: Vec<i64> = repo.list_all().await.unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_replace_overwrites_record() {
        let repo = InMemoryModuleRepository::new();
        let mut stored = repo.insert(sample("a")).await.unwrap();
        stored.content = "new".to_string();

        repo.replace(&stored).await.unwrap();
        assert_eq!(repo.get_by_id(stored.id).await.unwrap().content, "new");
    }

    #[tokio::test]
    async fn test_replace_missing_is_not_found() {
        let repo = InMemoryModuleRepository::new();
        let mut module = sample("a");
        module.id = 5;

        assert!(matches!(
            repo.replace(&module).await,
            Err(RepositoryError::NotFound)
        ));
        assert_eq!(repo.count(), 0);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let repo = InMemoryModuleRepository::new();
        let stored = repo.insert(sample("a")).await.unwrap();

        assert!(repo.delete(stored.id).await.unwrap());
        assert!(!repo.delete(stored.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let repo = InMemoryModuleRepository::new();
        let first = repo.insert(sample("a")).await.unwrap();
        repo.delete(first.id).await.unwrap();

        let second = repo.insert(sample("b")).await.unwrap();
        assert_ne!(first.id, second.id);
    }
}
