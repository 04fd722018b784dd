//! Application settings.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default prefix of the Vue Storefront index names.
pub const DEFAULT_INDEX_PREFIX: &str = "vue_storefront_catalog";

/// Default catalog snapshot filename.
const CATALOG_FILENAME: &str = "catalog.json";

/// Default output subdirectory name.
const OUTPUT_SUBDIR: &str = "output";

/// Stores and languages served by one site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub stores: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Catalog snapshot to export from.
    pub catalog_path: PathBuf,
    /// Directory for the bulk index files.
    pub output_dir: PathBuf,
    /// Prefix of every target index name.
    pub index_prefix: String,
    /// Configured sites, keyed by site name.
    pub sites: BTreeMap<String, SiteConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        // Data dir -> Home dir -> Current dir
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vsbridge");

        let mut sites = BTreeMap::new();
        sites.insert(
            "default".to_string(),
            SiteConfig {
                stores: vec!["default".to_string()],
                languages: vec!["en".to_string()],
            },
        );

        Self {
            catalog_path: data_dir.join(CATALOG_FILENAME),
            output_dir: data_dir.join(OUTPUT_SUBDIR),
            index_prefix: DEFAULT_INDEX_PREFIX.to_string(),
            sites,
        }
    }
}
