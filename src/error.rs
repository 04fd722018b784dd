//! Error types for the catalog bridge.

use std::path::PathBuf;

use thiserror::Error;

/// Guidance shown when an `--updated-since` expression is rejected.
pub const SINCE_GUIDANCE: &str =
    r#"Invalid since param passed, try something like "-5minute", "-2hour", "-1day", "yesterday""#;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Invalid time expression '{expression}'")]
    InvalidTimeExpression { expression: String },
    #[error("Unknown object type '{0}' (expected 'product' or 'category')")]
    UnknownObjectType(String),
    #[error("Unknown site '{0}'")]
    UnknownSite(String),
    #[error("Unknown store '{store}' for site '{site}'")]
    UnknownStore { site: String, store: String },
    #[error("Unknown language '{language}' for site '{site}'")]
    UnknownLanguage { site: String, language: String },
    #[error("Failed to read catalog '{}': {source}", .path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse catalog '{}': {message}", .path.display())]
    CatalogParse { path: PathBuf, message: String },
    #[error("Failed to write index target '{}': {source}", .path.display())]
    TargetWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type BridgeResult<T> = Result<T, BridgeError>;
