//! Factory expanding a scope over the configured sites.

use std::sync::Arc;

use super::{CatalogImporter, ImportScope, Importer, ImporterFactory};
use crate::catalog::{Catalog, ObjectType};
use crate::config::{Settings, SiteConfig};
use crate::error::BridgeError;

/// One (site, store, language, type) combination to export.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Unit<'a> {
    site: &'a str,
    store: &'a str,
    language: &'a str,
    object_type: ObjectType,
}

/// Builds [`CatalogImporter`]s from the catalog snapshot and site settings.
pub struct CatalogImporterFactory {
    settings: Settings,
}

impl CatalogImporterFactory {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    fn object_types(scope: &ImportScope) -> Result<Vec<ObjectType>, BridgeError> {
        match scope.object_type.as_deref() {
            Some(name) => ObjectType::parse(name)
                .map(|t| vec![t])
                .ok_or_else(|| BridgeError::UnknownObjectType(name.to_string())),
            None => Ok(ObjectType::ALL.to_vec()),
        }
    }

    fn sites<'a>(
        &'a self,
        scope: &ImportScope,
    ) -> Result<Vec<(&'a str, &'a SiteConfig)>, BridgeError> {
        match scope.site.as_deref() {
            Some(name) => self
                .settings
                .sites
                .get_key_value(name)
                .map(|(k, v)| vec![(k.as_str(), v)])
                .ok_or_else(|| BridgeError::UnknownSite(name.to_string())),
            None => Ok(self
                .settings
                .sites
                .iter()
                .map(|(k, v)| (k.as_str(), v))
                .collect()),
        }
    }

    /// Expand the scope into units, in site, store, language, type order.
    ///
    /// A store or language filter must exist on the requested site, or on at
    /// least one site when no site is given.
    fn plan<'a>(&'a self, scope: &ImportScope) -> Result<Vec<Unit<'a>>, BridgeError> {
        let object_types = Self::object_types(scope)?;
        let sites = self.sites(scope)?;

        let mut units = Vec::new();
        let mut store_seen = scope.store.is_none();
        let mut language_seen = scope.language.is_none();

        for &(site, config) in &sites {
            let stores: Vec<&str> = config
                .stores
                .iter()
                .map(String::as_str)
                .filter(|s| scope.store.as_deref().is_none_or_eq(s))
                .collect();
            let languages: Vec<&str> = config
                .languages
                .iter()
                .map(String::as_str)
                .filter(|l| scope.language.as_deref().is_none_or_eq(l))
                .collect();

            store_seen |= !stores.is_empty();
            language_seen |= !languages.is_empty();

            for &store in &stores {
                for &language in &languages {
                    for &object_type in &object_types {
                        units.push(Unit {
                            site,
                            store,
                            language,
                            object_type,
                        });
                    }
                }
            }
        }

        let site_label = || scope.site.clone().unwrap_or_else(|| "*".to_string());
        if !store_seen {
            return Err(BridgeError::UnknownStore {
                site: site_label(),
                store: scope.store.clone().unwrap_or_default(),
            });
        }
        if !language_seen {
            return Err(BridgeError::UnknownLanguage {
                site: site_label(),
                language: scope.language.clone().unwrap_or_default(),
            });
        }

        Ok(units)
    }
}

/// Matching helper for optional filters.
trait FilterExt {
    fn is_none_or_eq(&self, value: &str) -> bool;
}

impl FilterExt for Option<&str> {
    fn is_none_or_eq(&self, value: &str) -> bool {
        match self {
            Some(filter) => filter.eq_ignore_ascii_case(value),
            None => true,
        }
    }
}

#[async_trait::async_trait]
impl ImporterFactory for CatalogImporterFactory {
    async fn create(&self, scope: &ImportScope) -> anyhow::Result<Vec<Box<dyn Importer>>> {
        let units = self.plan(scope)?;
        if units.is_empty() {
            return Ok(Vec::new());
        }

        let catalog = Arc::new(Catalog::load(&self.settings.catalog_path).await?);
        tracing::info!(
            "Planned {} importers from {}",
            units.len(),
            self.settings.catalog_path.display()
        );

        Ok(units
            .into_iter()
            .map(|unit| {
                Box::new(CatalogImporter::new(
                    Arc::clone(&catalog),
                    unit.object_type,
                    unit.site,
                    unit.store,
                    unit.language,
                    scope.since,
                    &self.settings.index_prefix,
                    self.settings.output_dir.clone(),
                )) as Box<dyn Importer>
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn settings() -> Settings {
        let mut sites = BTreeMap::new();
        sites.insert(
            "b2c".to_string(),
            SiteConfig {
                stores: vec!["de".to_string(), "at".to_string()],
                languages: vec!["de".to_string(), "en".to_string()],
            },
        );
        sites.insert(
            "b2b".to_string(),
            SiteConfig {
                stores: vec!["wholesale".to_string()],
                languages: vec!["en".to_string()],
            },
        );
        Settings {
            sites,
            ..Settings::default()
        }
    }

    fn scope(
        site: Option<&str>,
        ty: Option<&str>,
        lang: Option<&str>,
        store: Option<&str>,
    ) -> ImportScope {
        ImportScope {
            site: site.map(String::from),
            object_type: ty.map(String::from),
            language: lang.map(String::from),
            store: store.map(String::from),
            since: None,
        }
    }

    #[test]
    fn test_plan_everything() {
        let factory = CatalogImporterFactory::new(settings());
        let units = factory.plan(&ImportScope::default()).unwrap();
        // b2b: 1 store x 1 language x 2 types; b2c: 2 x 2 x 2
        assert_eq!(units.len(), 2 + 8);
        assert_eq!(units[0].site, "b2b");
        assert_eq!(units[0].object_type, ObjectType::Product);
        assert_eq!(units[1].object_type, ObjectType::Category);
    }

    #[test]
    fn test_plan_with_filters() {
        let factory = CatalogImporterFactory::new(settings());
        let units = factory
            .plan(&scope(Some("b2c"), Some("categories"), Some("EN"), Some("at")))
            .unwrap();
        assert_eq!(
            units,
            vec![Unit {
                site: "b2c",
                store: "at",
                language: "en",
                object_type: ObjectType::Category,
            }]
        );
    }

    #[test]
    fn test_plan_language_filter_across_sites() {
        let factory = CatalogImporterFactory::new(settings());
        let units = factory
            .plan(&scope(None, Some("product"), Some("en"), None))
            .unwrap();
        assert_eq!(units.len(), 3);
        assert!(units.iter().all(|u| u.language == "en"));
    }

    #[test]
    fn test_plan_rejects_unknown_values() {
        let factory = CatalogImporterFactory::new(settings());
        assert!(matches!(
            factory.plan(&scope(Some("outlet"), None, None, None)),
            Err(BridgeError::UnknownSite(_))
        ));
        assert!(matches!(
            factory.plan(&scope(None, Some("cms_page"), None, None)),
            Err(BridgeError::UnknownObjectType(_))
        ));
        assert!(matches!(
            factory.plan(&scope(Some("b2b"), None, None, Some("de"))),
            Err(BridgeError::UnknownStore { .. })
        ));
        assert!(matches!(
            factory.plan(&scope(None, None, Some("fr"), None)),
            Err(BridgeError::UnknownLanguage { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_loads_catalog_and_builds_importers() {
        let dir = tempdir().unwrap();
        let catalog_path = dir.path().join("catalog.json");
        std::fs::write(
            &catalog_path,
            r#"{"products": [{"id": 1, "key": "a", "modified_at": "2024-03-10T00:00:00Z"}]}"#,
        )
        .unwrap();

        let mut settings = settings();
        settings.catalog_path = catalog_path;
        settings.output_dir = dir.path().join("out");
        let factory = CatalogImporterFactory::new(settings);

        let importers = factory
            .create(&scope(Some("b2b"), None, None, None))
            .await
            .unwrap();
        assert_eq!(importers.len(), 2);
        assert_eq!(
            importers[0].describe(),
            "product (site: b2b, store: wholesale, language: en)"
        );
        assert_eq!(importers[0].count().await.unwrap(), 1);
        assert_eq!(importers[1].count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_propagates_missing_catalog() {
        let dir = tempdir().unwrap();
        let mut settings = settings();
        settings.catalog_path = dir.path().join("missing.json");
        let factory = CatalogImporterFactory::new(settings);

        let err = factory.create(&ImportScope::default()).await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<BridgeError>(),
            Some(BridgeError::CatalogRead { .. })
        ));
    }
}
