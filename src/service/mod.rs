//! Module lifecycle: CRUD for administrators plus the public download path.
//!
//! Every operation loads what it needs from the repository, applies the
//! timestamp rules, and hands back [`ModuleView`]s. Nothing is cached between
//! calls.

use crate::module::{Module, ModulePayload, ModuleView};
use crate::repository::{ModuleRepository, RepositoryError};
use crate::time;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};


/// File extension given to downloaded modules
pub const MODULE_FILE_EXTENSION: &str = "sgmodule";

/// Parse a create/update request body.
///
/// The body must be a JSON object; string fields must be strings or null.
pub fn parse_payload(body: &[u8]) -> Result<ModulePayload, ServiceError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    if !value.is_object() {
        return Err(ServiceError::Validation(
            "expected a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| ServiceError::Validation(e.to_string()))
}

/// Raw module content ready to be served as a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    /// `<module name>.sgmodule`
    pub file_name: String,
    pub content: String,
}

impl Subscription {
    /// `Content-Disposition` value advertising the content as an attachment.
    ///
    /// Control characters in the name become `_`, quotes and backslashes are
    /// escaped. Non-ASCII names also get an RFC 5987 `filename*` parameter.
    pub fn content_disposition(&self) -> String {
        let quoted: String = self
            .file_name
            .chars()
            .flat_map(|c| match c {
                '"' | '\\' => vec!['\\', c],
                c if c.is_control() => vec!['_'],
                c => vec![c],
            })
            .collect();

        let mut value = format!("attachment; filename=\"{}\"", quoted);
        if !self.file_name.is_ascii() {
            value.push_str("; filename*=UTF-8''");
            value.push_str(&urlencoding::encode(&self.file_name));
        }
        value
    }
}

/// Module service errors
#[derive(Debug, PartialEq)]
pub enum ServiceError {
    /// Request body could not be understood
    Validation(String),
    /// No module with that id
    NotFound,
    /// Repository failure, message includes the failed operation
    Storage(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Validation(msg) => write!(f, "invalid request data: {}", msg),
            ServiceError::NotFound => write!(f, "module does not exist"),
            ServiceError::Storage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Map a repository error, tagging storage failures with the operation.
fn storage_error(op: &str, e: RepositoryError) -> ServiceError {
    match e {
        RepositoryError::NotFound => ServiceError::NotFound,
        RepositoryError::Storage(cause) => {
            error!(operation = op, error = %format!("{:#}", cause), "Module storage failure");
            ServiceError::Storage(format!("failed to {}: {:#}", op, cause))
        }
    }
}

/// Orchestrates the repository for all module operations.
#[derive(Clone)]
pub struct ModuleService {
    repository: Arc<dyn ModuleRepository>,
}

impl ModuleService {
    pub fn new(repository: Arc<dyn ModuleRepository>) -> Self {
        Self { repository }
    }

    /// All modules, ascending by id.
    pub async fn list(&self) -> Result<Vec<ModuleView>, ServiceError> {
        let modules = self
            .repository
            .list_all()
            .await
            .map_err(|e| storage_error("list modules", e))?;
        Ok(modules.into_iter().map(ModuleView::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<ModuleView, ServiceError> {
        let module = self
            .repository
            .get_by_id(id)
            .await
            .map_err(|e| storage_error("get module", e))?;
        Ok(module.into())
    }

    /// Store a new module. Both timestamps are set to now.
    pub async fn create(&self, payload: ModulePayload) -> Result<ModuleView, ServiceError> {
        let module = Module::new(payload, time::now());
        let stored = self
            .repository
            .insert(module)
            .await
            .map_err(|e| storage_error("create module", e))?;

        info!(module_id = stored.id, name = %stored.name, "Module created");
        Ok(stored.into())
    }

    /// Merge `payload` onto an existing module and refresh its `update_time`.
    pub async fn update(
        &self,
        id: i64,
        payload: ModulePayload,
    ) -> Result<ModuleView, ServiceError> {
        let module = self.load_for_update(id).await?;
        self.store_update(module, payload).await
    }

    /// Like [`update`](Self::update), but parses a raw request body only once
    /// the target is known to exist, so a missing id is `NotFound` whatever
    /// the body holds.
    pub async fn update_from_body(
        &self,
        id: i64,
        body: &[u8],
    ) -> Result<ModuleView, ServiceError> {
        let module = self.load_for_update(id).await?;
        let payload = parse_payload(body)?;
        self.store_update(module, payload).await
    }

    async fn load_for_update(&self, id: i64) -> Result<Module, ServiceError> {
        self.repository
            .get_by_id(id)
            .await
            .map_err(|e| storage_error("update module", e))
    }

    async fn store_update(
        &self,
        mut module: Module,
        payload: ModulePayload,
    ) -> Result<ModuleView, ServiceError> {
        module.apply(payload, time::now());

        self.repository
            .replace(&module)
            .await
            .map_err(|e| storage_error("update module", e))?;

        info!(module_id = module.id, "Module updated");
        Ok(module.into())
    }

    /// Delete a module. Deleting an absent id succeeds.
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let removed = self
            .repository
            .delete(id)
            .await
            .map_err(|e| storage_error("delete module", e))?;

        if removed {
            info!(module_id = id, "Module deleted");
        } else {
            debug!(module_id = id, "Delete of absent module");
        }
        Ok(())
    }

    /// Raw content of a module for the public download route.
    pub async fn subscribe(&self, id: i64) -> Result<Subscription, ServiceError> {
        let module = self
            .repository
            .get_by_id(id)
            .await
            .map_err(|e| storage_error("fetch module content", e))?;

        debug!(module_id = id, bytes = module.content.len(), "Serving module content");
        Ok(Subscription {
            file_name: format!("{}.{}", module.name, MODULE_FILE_EXTENSION),
            content: module.content,
        })
    }
}
