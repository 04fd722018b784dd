//! End-to-end export of a catalog snapshot into bulk index files.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use tempfile::tempdir;

use vsbridge::bridge::CatalogImporterFactory;
use vsbridge::config::{Settings, SiteConfig};
use vsbridge::{ConsoleReporter, IndexRequest, IndexRunner, RunStatus};

const CATALOG: &str = r#"
products:
  - id: 1
    key: runner-x
    full_path: /products/runner-x
    modified_at: 2024-03-14T08:00:00Z
    data: { sku: RX-1, name: Runner X }
    localized:
      de: { name: Läufer X }
  - id: 2
    key: trail-y
    stores: [at]
    modified_at: 2024-01-02T08:00:00Z
    data: { sku: TY-2 }
categories:
  - id: 10
    key: shoes
    full_path: /catalog/shoes
    modified_at: 2023-12-01T00:00:00Z
"#;

fn settings(dir: &std::path::Path) -> Settings {
    let catalog_path = dir.join("catalog.yaml");
    std::fs::write(&catalog_path, CATALOG).unwrap();

    let mut sites = BTreeMap::new();
    sites.insert(
        "shop".to_string(),
        SiteConfig {
            stores: vec!["de".to_string(), "at".to_string()],
            languages: vec!["de".to_string()],
        },
    );

    Settings {
        catalog_path,
        output_dir: dir.join("out"),
        index_prefix: "vsf".to_string(),
        sites,
    }
}

#[tokio::test]
async fn test_full_export_writes_one_file_per_unit() {
    let dir = tempdir().unwrap();
    let settings = settings(dir.path());
    let factory = CatalogImporterFactory::new(settings.clone());
    let reporter = ConsoleReporter::new();

    let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    let summary = IndexRunner::new(&factory, &reporter)
        .run(&IndexRequest::default(), now)
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Success);
    // 2 stores x 1 language x 2 types
    assert_eq!(summary.units, 4);
    // de: runner-x + shoes, at: runner-x + trail-y + shoes
    assert_eq!(summary.imported, 5);
    assert_eq!(summary.skipped, 0);

    let de_products =
        std::fs::read_to_string(settings.output_dir.join("vsf_shop_de_de_product.ndjson")).unwrap();
    let lines: Vec<serde_json::Value> = de_products
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["index"]["_index"], "vsf_shop_de_de");
    assert_eq!(lines[1]["name"], "Läufer X");
    assert_eq!(lines[1]["path"], "/products/runner-x");

    assert!(settings
        .output_dir
        .join("vsf_shop_at_de_category.ndjson")
        .exists());
}

#[tokio::test]
async fn test_updated_since_skips_stale_units() {
    let dir = tempdir().unwrap();
    let settings = settings(dir.path());
    let factory = CatalogImporterFactory::new(settings.clone());
    let reporter = ConsoleReporter::new();

    let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    let request = IndexRequest {
        store: Some("at".to_string()),
        updated_since: Some("-1 week".to_string()),
        ..IndexRequest::default()
    };
    let summary = IndexRunner::new(&factory, &reporter)
        .run(&request, now)
        .await
        .unwrap();

    assert_eq!(summary.units, 2);
    // Only runner-x changed within the last week; categories are skipped
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.skipped, 1);
    assert!(!settings
        .output_dir
        .join("vsf_shop_at_de_category.ndjson")
        .exists());
}

#[tokio::test]
async fn test_unknown_type_is_an_error() {
    let dir = tempdir().unwrap();
    let factory = CatalogImporterFactory::new(settings(dir.path()));
    let reporter = ConsoleReporter::new();

    let request = IndexRequest {
        object_type: Some("cms_page".to_string()),
        ..IndexRequest::default()
    };
    let err = IndexRunner::new(&factory, &reporter)
        .run(&request, Utc::now())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cms_page"));
}
