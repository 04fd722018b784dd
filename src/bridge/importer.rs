//! Importer writing catalog objects as Elasticsearch bulk NDJSON.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncWriteExt, BufWriter};

use super::{Importer, ItemCallback};
use crate::catalog::{Catalog, CatalogEntry, ObjectType};
use crate::error::BridgeError;

/// Exports one object type of one site/store/language combination.
pub struct CatalogImporter {
    catalog: Arc<Catalog>,
    object_type: ObjectType,
    site: String,
    store: String,
    language: String,
    since: Option<DateTime<Utc>>,
    index_prefix: String,
    output_dir: PathBuf,
}

impl CatalogImporter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<Catalog>,
        object_type: ObjectType,
        site: &str,
        store: &str,
        language: &str,
        since: Option<DateTime<Utc>>,
        index_prefix: &str,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            catalog,
            object_type,
            site: site.to_string(),
            store: store.to_string(),
            language: language.to_string(),
            since,
            index_prefix: index_prefix.to_string(),
            output_dir,
        }
    }

    /// Bulk file the objects are written to.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.ndjson", self.target(), self.object_type))
    }

    fn pending(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.catalog
            .entries(self.object_type)
            .iter()
            .filter(move |entry| {
                entry.published
                    && entry.in_store(&self.store)
                    && entry.modified_since(self.since.as_ref())
            })
    }
}

#[async_trait::async_trait]
impl Importer for CatalogImporter {
    fn describe(&self) -> String {
        format!(
            "{} (site: {}, store: {}, language: {})",
            self.object_type, self.site, self.store, self.language
        )
    }

    fn target(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.index_prefix, self.site, self.store, self.language
        )
        .to_lowercase()
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(self.pending().count() as u64)
    }

    async fn import(&mut self, on_item: &mut ItemCallback<'_>) -> anyhow::Result<()> {
        let path = self.output_path();
        let write_error = |source: std::io::Error| BridgeError::TargetWrite {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(write_error)?;
        let file = tokio::fs::File::create(&path).await.map_err(write_error)?;
        let mut writer = BufWriter::new(file);

        let index = self.target();
        let mut written = 0usize;
        for entry in self.pending() {
            let action = serde_json::json!({ "index": { "_index": index, "_id": entry.id } });
            let document = entry.document(&self.language);

            let mut lines = serde_json::to_string(&action)?;
            lines.push('\n');
            lines.push_str(&serde_json::to_string(&document)?);
            lines.push('\n');
            writer
                .write_all(lines.as_bytes())
                .await
                .map_err(write_error)?;

            written += 1;
            on_item(entry);
        }

        writer.flush().await.map_err(write_error)?;
        tracing::info!(
            "Wrote {} {} documents to {}",
            written,
            self.object_type,
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::CatalogObject;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn catalog() -> Arc<Catalog> {
        let mut catalog: Catalog = serde_json::from_value(serde_json::json!({
            "products": [
                {"id": 1, "key": "a", "modified_at": "2024-03-10T00:00:00Z",
                 "data": {"name": "A"}, "localized": {"de": {"name": "A-de"}}},
                {"id": 2, "key": "b", "stores": ["at"], "modified_at": "2024-03-12T00:00:00Z"},
                {"id": 3, "key": "c", "modified_at": "2024-03-14T00:00:00Z", "published": false},
                {"id": 4, "key": "d", "modified_at": "2024-01-01T00:00:00Z"}
            ],
            "categories": [
                {"id": 20, "key": "shoes", "full_path": "/catalog/shoes",
                 "modified_at": "2024-03-14T00:00:00Z"}
            ]
        }))
        .unwrap();
        for entry in &mut catalog.products {
            entry.object_type = Some(ObjectType::Product);
        }
        for entry in &mut catalog.categories {
            entry.object_type = Some(ObjectType::Category);
        }
        Arc::new(catalog)
    }

    fn importer(
        object_type: ObjectType,
        since: Option<DateTime<Utc>>,
        dir: PathBuf,
    ) -> CatalogImporter {
        CatalogImporter::new(
            catalog(),
            object_type,
            "Shop",
            "DE",
            "de",
            since,
            "vsf",
            dir,
        )
    }

    #[tokio::test]
    async fn test_describe_and_target() {
        let imp = importer(ObjectType::Product, None, PathBuf::from("."));
        assert_eq!(
            imp.describe(),
            "product (site: Shop, store: DE, language: de)"
        );
        assert_eq!(imp.target(), "vsf_shop_de_de");
    }

    #[tokio::test]
    async fn test_count_skips_unpublished_and_foreign_stores() {
        let imp = importer(ObjectType::Product, None, PathBuf::from("."));
        // 1 and 4 only: 2 is assigned to another store, 3 is unpublished
        assert_eq!(imp.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_count_honors_since() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let imp = importer(ObjectType::Product, Some(since), PathBuf::from("."));
        assert_eq!(imp.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_import_writes_bulk_file_and_reports_items() {
        let dir = tempdir().unwrap();
        let mut imp = importer(ObjectType::Product, None, dir.path().join("out"));

        let mut labels = Vec::new();
        imp.import(&mut |item: &dyn CatalogObject| labels.push(item.label().to_string()))
            .await
            .unwrap();
        assert_eq!(labels, vec!["product", "product"]);

        let contents = std::fs::read_to_string(imp.output_path()).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["index"]["_index"], "vsf_shop_de_de");
        assert_eq!(lines[0]["index"]["_id"], 1);
        assert_eq!(lines[1]["name"], "A-de");
        assert_eq!(lines[2]["index"]["_id"], 4);
    }

    #[tokio::test]
    async fn test_import_categories_label_with_path() {
        let dir = tempdir().unwrap();
        let mut imp = importer(ObjectType::Category, None, dir.path().to_path_buf());

        let mut labels = Vec::new();
        imp.import(&mut |item: &dyn CatalogObject| labels.push(item.label().to_string()))
            .await
            .unwrap();
        assert_eq!(labels, vec!["/catalog/shoes"]);
        assert!(imp
            .output_path()
            .ends_with("vsf_shop_de_de_category.ndjson"));
    }
}
