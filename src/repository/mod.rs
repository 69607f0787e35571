//! Module persistence.
//!
//! [`ModuleRepository`] is the only seam between the service and storage.
//! Two adapters ship with the crate:
//!
//! - [`MySqlModuleRepository`]: the production store, backed by a sqlx pool
//! - [`InMemoryModuleRepository`]: process-local, used by tests and local runs
//!
//! Implementations must be safe for concurrent use; the service adds no
//! locking of its own and concurrent writers to the same id resolve as
//! last-write-wins.

use crate::module::Module;
use async_trait::async_trait;

mod memory;
mod mysql;

pub use memory::InMemoryModuleRepository;
pub use mysql::MySqlModuleRepository;

#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// Fetch one module by id.
    async fn get_by_id(&self, id: i64) -> Result<Module, RepositoryError>;

    /// All modules, ascending by id.
    async fn list_all(&self) -> Result<Vec<Module>, RepositoryError>;

    /// Store a new module. The incoming `id` is ignored; the returned record
    /// carries the assigned one.
    async fn insert(&self, module: Module) -> Result<Module, RepositoryError>;

    /// Overwrite every field of an existing module, keyed by `module.id`.
    ///
    /// Fails with `NotFound` if no such record exists.
    async fn replace(&self, module: &Module) -> Result<(), RepositoryError>;

    /// Remove a module. Returns whether a record was actually removed.
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// Repository errors
#[derive(Debug)]
pub enum RepositoryError {
    /// No record with the requested id
    NotFound,
    /// Backend failure (connection, query, decoding)
    Storage(anyhow::Error),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::NotFound => write!(f, "module not found"),
            RepositoryError::Storage(e) => write!(f, "storage error: {:#}", e),
        }
    }
}

impl std::error::Error for RepositoryError {}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            other => RepositoryError::Storage(other.into()),
        }
    }
}
