//! Event schema side-channel — publish payload schemas per event type
//!
//! Schemas are a parallel, loosely-coupled artifact: each event type gets a
//! document (name, description, JSON-Schema body rendered as an OpenAPI
//! fragment) published to a registry. Publishing never gates rule
//! compilation.

use crate::error::{CompileError, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Schema document for one event type
#[derive(Debug, Clone)]
pub struct SchemaDoc {
    /// Event type identifier (e.g., "web-repo")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON-Schema body for the event payload
    pub body: serde_json::Value,
}

impl SchemaDoc {
    /// Create a schema document
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            body,
        }
    }

    /// Render as an OpenAPI fragment, the registry's wire format
    pub fn openapi_fragment(&self) -> serde_json::Value {
        let mut schemas = serde_json::Map::new();
        schemas.insert(self.name.clone(), self.body.clone());

        serde_json::json!({
            "openapi": "3.0.0",
            "info": {
                "title": self.name,
                "description": self.description,
                "version": "1.0.0",
            },
            "components": {
                "schemas": schemas,
            },
        })
    }
}

/// Trait for schema registries
pub trait SchemaPublisher: Send + Sync {
    /// Publish a schema document; republishing a name replaces it
    fn publish(&self, doc: SchemaDoc) -> Result<()>;

    /// Get a published document by event type name
    fn get(&self, name: &str) -> Result<Option<SchemaDoc>>;

    /// List published event type names, sorted
    fn list(&self) -> Result<Vec<String>>;
}

/// In-memory schema registry for development and testing
///
/// Documents are lost on process restart.
#[derive(Default)]
pub struct MemorySchemaRegistry {
    docs: RwLock<HashMap<String, SchemaDoc>>,
}

impl MemorySchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchemaPublisher for MemorySchemaRegistry {
    fn publish(&self, doc: SchemaDoc) -> Result<()> {
        if doc.name.is_empty() {
            return Err(CompileError::Schema {
                event_type: doc.name,
                reason: "name must be non-empty".to_string(),
            });
        }
        if !doc.body.is_object() {
            return Err(CompileError::Schema {
                event_type: doc.name,
                reason: "body must be a JSON-Schema object".to_string(),
            });
        }

        let mut docs = self.docs.write().map_err(|e| {
            CompileError::Engine(format!("Schema registry lock poisoned: {}", e))
        })?;
        docs.insert(doc.name.clone(), doc);
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<SchemaDoc>> {
        let docs = self.docs.read().map_err(|e| {
            CompileError::Engine(format!("Schema registry lock poisoned: {}", e))
        })?;
        Ok(docs.get(name).cloned())
    }

    fn list(&self) -> Result<Vec<String>> {
        let docs = self.docs.read().map_err(|e| {
            CompileError::Engine(format!("Schema registry lock poisoned: {}", e))
        })?;
        let mut names: Vec<String> = docs.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> SchemaDoc {
        SchemaDoc::new(
            "web-repo",
            "Repository change event",
            serde_json::json!({
                "type": "object",
                "properties": {"repo": {"type": "string"}},
                "required": ["repo"],
            }),
        )
    }

    #[test]
    fn test_publish_and_get() {
        let registry = MemorySchemaRegistry::new();
        registry.publish(doc()).unwrap();

        let found = registry.get("web-repo").unwrap().unwrap();
        assert_eq!(found.description, "Repository change event");
        assert!(registry.get("unknown").unwrap().is_none());
    }

    #[test]
    fn test_publish_replaces() {
        let registry = MemorySchemaRegistry::new();
        registry.publish(doc()).unwrap();
        registry
            .publish(SchemaDoc::new("web-repo", "Updated", serde_json::json!({})))
            .unwrap();

        let found = registry.get("web-repo").unwrap().unwrap();
        assert_eq!(found.description, "Updated");
        assert_eq!(registry.list().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let registry = MemorySchemaRegistry::new();
        let err = registry
            .publish(SchemaDoc::new("", "x", serde_json::json!({})))
            .unwrap_err();
        assert!(matches!(err, CompileError::Schema { .. }));
    }

    #[test]
    fn test_non_object_body_rejected() {
        let registry = MemorySchemaRegistry::new();
        let result = registry.publish(SchemaDoc::new(
            "web-repo",
            "x",
            serde_json::json!("not a schema"),
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_list_sorted() {
        let registry = MemorySchemaRegistry::new();
        registry
            .publish(SchemaDoc::new("b", "", serde_json::json!({})))
            .unwrap();
        registry
            .publish(SchemaDoc::new("a", "", serde_json::json!({})))
            .unwrap();
        assert_eq!(registry.list().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_openapi_fragment() {
        let fragment = doc().openapi_fragment();
        assert_eq!(fragment["openapi"], "3.0.0");
        assert_eq!(fragment["info"]["title"], "web-repo");
        assert_eq!(
            fragment["components"]["schemas"]["web-repo"]["required"][0],
            "repo"
        );
    }
}
