use crate::time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored configuration module.
///
/// Timestamps are real instants here; they only become integers when the
/// record is turned into a [`ModuleView`] for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Assigned by the repository on insert, never changed afterwards
    pub id: i64,
    /// Human-readable name, also the download filename stem
    pub name: String,
    /// Opaque payload served verbatim by the subscription route
    pub content: String,
    pub description: String,
    pub category: String,
    /// Set once on creation
    pub create_time: DateTime<Utc>,
    /// Set on creation, refreshed on every update
    pub update_time: DateTime<Utc>,
}

impl Module {
    /// Build a new, not yet stored, module from a create payload.
    ///
    /// Missing fields become empty strings. `id` is left at 0 for the
    /// repository to assign.
    pub fn new(payload: ModulePayload, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            name: payload.name.unwrap_or_default(),
            content: payload.content.unwrap_or_default(),
            description: payload.description.unwrap_or_default(),
            category: payload.category.unwrap_or_default(),
            create_time: now,
            update_time: now,
        }
    }

    /// Merge an update payload onto this record.
    ///
    /// Only fields present in the payload are overwritten. `id` and
    /// `create_time` are never touched; `update_time` becomes `now`.
    pub fn apply(&mut self, payload: ModulePayload, now: DateTime<Utc>) {
        if let Some(name) = payload.name {
            self.name = name;
        }
        if let Some(content) = payload.content {
            self.content = content;
        }
        if let Some(description) = payload.description {
            self.description = description;
        }
        if let Some(category) = payload.category {
            self.category = category;
        }
        // Never move backwards, even if the clock does
        self.update_time = now.max(self.update_time);
    }
}

/// Create/update request body.
///
/// Anything else the caller sends (`id`, `create_time`, `update_time`, ...) is
/// ignored. A `null` field is treated the same as an absent one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModulePayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Wire representation of a module, timestamps encoded as epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleView {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub description: String,
    pub category: String,
    pub create_time: i64,
    pub update_time: i64,
}

impl From<&Module> for ModuleView {
    fn from(module: &Module) -> Self {
        Self {
            id: module.id,
            name: module.name.clone(),
            content: module.content.clone(),
            description: module.description.clone(),
            category: module.category.clone(),
            create_time: time::encode(module.create_time),
            update_time: time::encode(module.update_time),
        }
    }
}

impl From<Module> for ModuleView {
    fn from(module: Module) -> Self {
        Self {
            id: module.id,
            create_time: time::encode(module.create_time),
            update_time: time::encode(module.update_time),
            name: module.name,
            content: module.content,
            description: module.description,
            category: module.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn stored() -> Module {
        Module {
            id: 7,
            name: "proxy1".to_string(),
            content: "rule=DIRECT".to_string(),
            description: "original".to_string(),
            category: "net".to_string(),
            create_time: at(1_000),
            update_time: at(2_000),
        }
    }

    #[test]
    fn test_new_sets_both_timestamps_to_now() {
        let payload = ModulePayload {
            name: Some("A".to_string()),
            content: Some("x".to_string()),
            ..Default::default()
        };
        let module = Module::new(payload, at(5_000));

        assert_eq!(module.id, 0);
        assert_eq!(module.name, "A");
        assert_eq!(module.content, "x");
        assert_eq!(module.description, "");
        assert_eq!(module.create_time, at(5_000));
        assert_eq!(module.update_time, at(5_000));
    }

    #[test]
    fn test_apply_merges_only_supplied_fields() {
        let mut module = stored();
        let payload = ModulePayload {
            description: Some("updated".to_string()),
            ..Default::default()
        };
        module.apply(payload, at(3_000));

        assert_eq!(module.description, "updated");
        assert_eq!(module.content, "rule=DIRECT");
        assert_eq!(module.name, "proxy1");
        assert_eq!(module.category, "net");
        assert_eq!(module.id, 7);
        assert_eq!(module.create_time, at(1_000));
        assert_eq!(module.update_time, at(3_000));
    }

    #[test]
    fn test_apply_empty_string_overwrites() {
        let mut module = stored();
        let payload = ModulePayload {
            category: Some(String::new()),
            ..Default::default()
        };
        module.apply(payload, at(3_000));
        assert_eq!(module.category, "");
    }

    #[test]
    fn test_apply_never_moves_update_time_backwards() {
        let mut module = stored();
        module.apply(ModulePayload::default(), at(1_500));
        assert_eq!(module.update_time, at(2_000));
    }

    #[test]
    fn test_payload_ignores_server_owned_fields() {
        let payload: ModulePayload = serde_json::from_value(json!({
            "id": 99,
            "name": "A",
            "create_time": 1,
            "update_time": 2
        }))
        .unwrap();

        assert_eq!(payload.name.as_deref(), Some("A"));
        assert_eq!(payload.content, None);
    }

    #[test]
    fn test_payload_null_is_absent() {
        let payload: ModulePayload =
            serde_json::from_value(json!({"content": null})).unwrap();
        assert_eq!(payload.content, None);
    }

    #[test]
    fn test_payload_rejects_wrong_types() {
        let result = serde_json::from_value::<ModulePayload>(json!({"name": 12}));
        assert!(result.is_err());

        let result = serde_json::from_value::<ModulePayload>(json!("name"));
        assert!(result.is_err());
    }

    #[test]
    fn test_view_encodes_timestamps_as_integers() {
        let view = ModuleView::from(&stored());
        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 7,
                "name": "proxy1",
                "content": "rule=DIRECT",
                "description": "original",
                "category": "net",
                "create_time": 1000,
                "update_time": 2000
            })
        );
    }

    #[test]
    fn test_owned_and_borrowed_conversions_agree() {
        let module = stored();
        assert_eq!(ModuleView::from(&module), ModuleView::from(module));
    }
}
