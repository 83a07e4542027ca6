//! Error taxonomy for registry, filesystem and share operations.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// No package id was given, or the registry has no such package.
    #[error("package not found: {}", .package.as_deref().unwrap_or("<none>"))]
    NotFound { package: Option<String> },

    #[error("I/O failure on {path:?}: {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("share broker rejected the request: {0}")]
    BrokerFailure(String),

    #[error("package registry query failed: {0}")]
    RegistryFailure(String),

    #[error("background task stopped before reporting a result")]
    Interrupted,
}

impl AppError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        AppError::IoFailure {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Short text for the transient status message.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound { package: None } => "Package not found.".to_string(),
            AppError::NotFound { package: Some(id) } => format!("Package {} not found.", id),
            AppError::IoFailure { path, source } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                format!("File error ({}): {}", name, source)
            }
            AppError::BrokerFailure(msg) => format!("Share failed: {}", msg),
            AppError::RegistryFailure(msg) => format!("Cannot query packages: {}", msg),
            AppError::Interrupted => "Operation stopped unexpectedly.".to_string(),
        }
    }
}
