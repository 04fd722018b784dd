//! Catalog snapshot exported from the shop CMS.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bridge::CatalogObject;
use crate::error::{BridgeError, BridgeResult};

/// Kind of catalog object that can be indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Product,
    Category,
}

impl ObjectType {
    pub const ALL: [ObjectType; 2] = [ObjectType::Product, ObjectType::Category];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Product => "product",
            ObjectType::Category => "category",
        }
    }

    /// Parse a user supplied type name (singular or plural, any case).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product" | "products" => Some(ObjectType::Product),
            "category" | "categories" => Some(ObjectType::Category),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_published() -> bool {
    true
}

/// A product or category as exported by the CMS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,
    pub key: String,
    /// Full path in the object tree (e.g. `/catalog/shoes/runner-x`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_path: Option<String>,
    /// Stores the object is assigned to; empty means every store.
    #[serde(default)]
    pub stores: Vec<String>,
    pub modified_at: DateTime<Utc>,
    #[serde(default = "default_published")]
    pub published: bool,
    /// Language independent fields.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Per-language field overrides.
    #[serde(default)]
    pub localized: HashMap<String, serde_json::Map<String, serde_json::Value>>,
    #[serde(skip)]
    pub object_type: Option<ObjectType>,
}

impl CatalogEntry {
    /// Whether the object belongs to the given store.
    pub fn in_store(&self, store: &str) -> bool {
        self.stores.is_empty() || self.stores.iter().any(|s| s == store)
    }

    /// Whether the object changed at or after the cutoff.
    pub fn modified_since(&self, since: Option<&DateTime<Utc>>) -> bool {
        since.map_or(true, |since| self.modified_at >= *since)
    }

    /// Build the index document for a language: shared data overlaid with
    /// the language's localized fields.
    pub fn document(&self, language: &str) -> serde_json::Value {
        let mut doc = self.data.clone();
        if let Some(localized) = self.localized.get(language) {
            for (key, value) in localized {
                doc.insert(key.clone(), value.clone());
            }
        }
        doc.insert("id".to_string(), self.id.into());
        doc.insert("key".to_string(), self.key.clone().into());
        if let Some(ref path) = self.full_path {
            doc.insert("path".to_string(), path.clone().into());
        }
        doc.insert(
            "updated_at".to_string(),
            self.modified_at.to_rfc3339().into(),
        );
        serde_json::Value::Object(doc)
    }
}

impl CatalogObject for CatalogEntry {
    fn type_name(&self) -> &str {
        self.object_type.map(|t| t.as_str()).unwrap_or("object")
    }

    fn full_path(&self) -> Option<&str> {
        self.full_path.as_deref()
    }
}

/// All indexable objects of a shop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<CatalogEntry>,
    #[serde(default)]
    pub categories: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load a snapshot from disk. Format follows the file extension
    /// (TOML, YAML, otherwise JSON).
    pub async fn load(path: &Path) -> BridgeResult<Self> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| BridgeError::CatalogRead {
                    path: path.to_path_buf(),
                    source,
                })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |message: String| BridgeError::CatalogParse {
            path: path.to_path_buf(),
            message,
        };

        let mut catalog: Catalog = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?
            }
            _ => serde_json::from_str(&contents).map_err(|e| parse_error(e.to_string()))?,
        };
        catalog.tag_types();

        tracing::debug!(
            "Loaded catalog {}: {} products, {} categories",
            path.display(),
            catalog.products.len(),
            catalog.categories.len()
        );
        Ok(catalog)
    }

    fn tag_types(&mut self) {
        for entry in &mut self.products {
            entry.object_type = Some(ObjectType::Product);
        }
        for entry in &mut self.categories {
            entry.object_type = Some(ObjectType::Category);
        }
    }

    pub fn entries(&self, object_type: ObjectType) -> &[CatalogEntry] {
        match object_type {
            ObjectType::Product => &self.products,
            ObjectType::Category => &self.categories,
        }
    }
}
