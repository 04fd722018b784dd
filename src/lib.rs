//! vsbridge - export CoreShop catalog objects into Vue Storefront indexes.
//!
//! The library holds the index runner and its collaborators; the `vsbridge`
//! binary wires them to the command line.

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod since;

pub use bridge::{CatalogObject, ImportScope, Importer, ImporterFactory, ItemLabel};
pub use error::{BridgeError, BridgeResult};
pub use report::{ConsoleReporter, Reporter};
pub use runner::{IndexRequest, IndexRunner, RunStatus, RunSummary};
