//! `vsbridge:index-objects` command.

use std::process::ExitCode;

use chrono::Local;

use vsbridge::bridge::CatalogImporterFactory;
use vsbridge::config::Settings;
use vsbridge::{ConsoleReporter, IndexRequest, IndexRunner};

/// Export the requested catalog objects into their Vue Storefront indexes.
pub async fn cmd_index_objects(
    settings: &Settings,
    request: &IndexRequest,
) -> anyhow::Result<ExitCode> {
    tracing::debug!(
        "Indexing from {} into {}",
        settings.catalog_path.display(),
        settings.output_dir.display()
    );

    let factory = CatalogImporterFactory::new(settings.clone());
    let reporter = ConsoleReporter::new();
    let runner = IndexRunner::new(&factory, &reporter);

    let summary = runner.run(request, Local::now()).await?;
    tracing::info!(
        "Run finished: {} units, {} skipped, {} items imported",
        summary.units,
        summary.skipped,
        summary.imported
    );

    Ok(ExitCode::from(summary.status.exit_code()))
}
