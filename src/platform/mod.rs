//! Capability traits for the host services the app depends on, plus their adapters.

pub mod adb;
pub mod desktop;
#[cfg(test)]
pub mod fake;

use crate::error::AppError;
use crate::export::ShareHandle;
use crate::types::PackageMeta;

/// Read-only view of the installed packages on a device.
pub trait PackageRegistry: Send + Sync {
    /// Every installed package, system ones included, in registry order.
    fn installed_packages(&self) -> Result<Vec<PackageMeta>, AppError>;

    /// A single package. `Ok(None)` when the registry does not know `package_id`.
    /// The returned `installer_path` must be readable on the local filesystem.
    fn package(&self, package_id: &str) -> Result<Option<PackageMeta>, AppError>;
}

/// What is handed to a share broker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareRequest {
    pub mime: &'static str,
    pub handle: ShareHandle,
    pub chooser_title: String,
}

/// Delivers a staged file to whatever the user picks as a share target.
pub trait ShareBroker: Send + Sync {
    fn share(&self, request: &ShareRequest) -> Result<(), AppError>;
}
