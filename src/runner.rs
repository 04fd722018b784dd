//! Index runner that drives importers with progress reporting.

use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

use crate::bridge::{CatalogObject, ImportScope, ImporterFactory};
use crate::error::SINCE_GUIDANCE;
use crate::report::Reporter;
use crate::since::resolve_since;

/// Banner printed at the start of every run.
pub const TITLE: &str = "Coreshop => Vue Storefront data importer";

/// Parameters of one `index-objects` run, as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRequest {
    pub site: Option<String>,
    pub object_type: Option<String>,
    pub language: Option<String>,
    pub store: Option<String>,
    /// Relative time expression such as `-2hour` or `yesterday`.
    pub updated_since: Option<String>,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// The `--updated-since` expression was rejected; nothing was imported.
    InvalidTimeExpression,
}

impl RunStatus {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunStatus::Success => 0,
            RunStatus::InvalidTimeExpression => 1,
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub status: RunStatus,
    /// Importer units the factory returned.
    pub units: usize,
    /// Units skipped because they had nothing pending.
    pub skipped: usize,
    /// Items imported across all units.
    pub imported: u64,
    /// Cutoff handed to the factory, if any.
    pub since: Option<DateTime<Utc>>,
}

impl RunSummary {
    fn new(status: RunStatus) -> Self {
        Self {
            status,
            units: 0,
            skipped: 0,
            imported: 0,
            since: None,
        }
    }
}

/// Orchestrates one index run: validate, resolve importers, run each in turn.
pub struct IndexRunner<'a> {
    factory: &'a dyn ImporterFactory,
    reporter: &'a dyn Reporter,
}

impl<'a> IndexRunner<'a> {
    pub fn new(factory: &'a dyn ImporterFactory, reporter: &'a dyn Reporter) -> Self {
        Self { factory, reporter }
    }

    /// Run the importers for `request`, resolving relative times against `now`.
    ///
    /// Factory and importer errors abort the run and are returned as-is;
    /// later units are not attempted.
    pub async fn run<Tz>(
        &self,
        request: &IndexRequest,
        now: DateTime<Tz>,
    ) -> anyhow::Result<RunSummary>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let reporter = self.reporter;
        reporter.title(TITLE);

        let since = match request.updated_since.as_deref() {
            Some(expression) => match resolve_since(&now, expression) {
                Ok(since) => {
                    reporter.warning(&format!(
                        "Indexing only updated since: {}",
                        since.to_rfc3339_opts(SecondsFormat::Secs, false)
                    ));
                    Some(since.with_timezone(&Utc))
                }
                Err(e) => {
                    tracing::debug!("Rejecting --updated-since: {}", e);
                    reporter.error(SINCE_GUIDANCE);
                    return Ok(RunSummary::new(RunStatus::InvalidTimeExpression));
                }
            },
            None => None,
        };

        let scope = ImportScope {
            site: request.site.clone(),
            object_type: request.object_type.clone(),
            language: request.language.clone(),
            store: request.store.clone(),
            since,
        };
        tracing::debug!("Resolving importers for {:?}", scope);
        let importers = self.factory.create(&scope).await?;

        let mut summary = RunSummary::new(RunStatus::Success);
        summary.units = importers.len();
        summary.since = since;

        for mut importer in importers {
            reporter.section(&format!("Importing: {}", importer.describe()));
            reporter.note(&format!("Target: {}", importer.target()));

            let count = importer.count().await?;
            if count == 0 {
                reporter.warning("Nothing to import, skipping.");
                summary.skipped += 1;
                continue;
            }

            reporter.note(&format!("Found {} items to import.", count));
            reporter.progress_start(count);

            let mut position = 0u64;
            let result = importer
                .import(&mut |item: &dyn CatalogObject| {
                    position += 1;
                    reporter.progress_advance(position, &item.label().to_string());
                })
                .await;
            reporter.progress_clear();
            result?;

            if position != count {
                tracing::warn!(
                    "{} reported {} items but processed {}",
                    importer.describe(),
                    count,
                    position
                );
            }

            reporter.success(&format!("Imported {} items.", count));
            summary.imported += count;
        }

        reporter.success("Done.");
        Ok(summary)
    }
}
