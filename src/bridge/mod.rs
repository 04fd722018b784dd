//! Importer abstraction between the catalog and the Vue Storefront indexes.
//!
//! An [`ImporterFactory`] resolves the requested scope into a list of
//! [`Importer`] units; each unit knows how many objects it would export and
//! streams them to its target, reporting every processed object back through
//! a callback.

mod factory;
mod importer;

pub use factory::CatalogImporterFactory;
pub use importer::CatalogImporter;

use chrono::{DateTime, Utc};

/// Which catalog objects a run should cover.
///
/// `None` on a filter means "every configured value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportScope {
    pub site: Option<String>,
    pub object_type: Option<String>,
    pub language: Option<String>,
    pub store: Option<String>,
    /// Only objects modified at or after this instant are exported.
    pub since: Option<DateTime<Utc>>,
}

/// How an exported object is shown next to the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLabel<'a> {
    /// The object lives in a tree and has a full path.
    Path(&'a str),
    /// No path; fall back to the type name.
    TypeName(&'a str),
}

impl std::fmt::Display for ItemLabel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemLabel::Path(path) => f.write_str(path),
            ItemLabel::TypeName(name) => f.write_str(name),
        }
    }
}

/// An object handed to the progress callback.
pub trait CatalogObject: Send + Sync {
    /// Type tag used when the object has no path.
    fn type_name(&self) -> &str;

    /// Hierarchical path of the object, if it has one.
    fn full_path(&self) -> Option<&str> {
        None
    }

    fn label(&self) -> ItemLabel<'_> {
        match self.full_path() {
            Some(path) => ItemLabel::Path(path),
            None => ItemLabel::TypeName(self.type_name()),
        }
    }
}

/// Callback invoked once per exported object.
pub type ItemCallback<'a> = dyn FnMut(&dyn CatalogObject) + Send + 'a;

/// One bounded export task for a single object type and scope.
#[async_trait::async_trait]
pub trait Importer: Send + Sync {
    /// Human-readable description of what is being exported.
    fn describe(&self) -> String;

    /// Name of the index the objects are written to.
    fn target(&self) -> String;

    /// Number of objects pending export.
    async fn count(&self) -> anyhow::Result<u64>;

    /// Export every pending object, calling `on_item` after each one.
    async fn import(&mut self, on_item: &mut ItemCallback<'_>) -> anyhow::Result<()>;
}

/// Resolves a scope into the importer units that cover it.
#[async_trait::async_trait]
pub trait ImporterFactory: Send + Sync {
    async fn create(&self, scope: &ImportScope) -> anyhow::Result<Vec<Box<dyn Importer>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Category {
        path: String,
    }

    impl CatalogObject for Category {
        fn type_name(&self) -> &str {
            "category"
        }

        fn full_path(&self) -> Option<&str> {
            Some(&self.path)
        }
    }

    struct Unlabeled;

    impl CatalogObject for Unlabeled {
        fn type_name(&self) -> &str {
            "product"
        }
    }

    #[test]
    fn test_label_prefers_path() {
        let category = Category {
            path: "/catalog/shoes".to_string(),
        };
        assert_eq!(category.label(), ItemLabel::Path("/catalog/shoes"));
        assert_eq!(category.label().to_string(), "/catalog/shoes");
    }

    #[test]
    fn test_label_falls_back_to_type_name() {
        assert_eq!(Unlabeled.label(), ItemLabel::TypeName("product"));
        assert_eq!(Unlabeled.label().to_string(), "product");
    }
}
