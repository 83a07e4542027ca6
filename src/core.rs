use std::{
    collections::HashSet,
    fs, thread,
    time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::error::AppError;
use crate::platform::PackageRegistry;
use crate::types::{AppDetail, AppRecord};

// Core/business logic: enumerating installed packages, resolving one package's
// detail, and formatting sizes. Exporting lives in crate::export.

/// Default minimum time the list stays in its loading state.
pub const MIN_LOADING: Duration = Duration::from_millis(500);

const SIZE_UNITS: [&str; 7] = ["B", "K", "M", "G", "T", "P", "E"];

/// List every non-system package, in registry order, one record per package id.
pub fn load_installed_apps(registry: &dyn PackageRegistry) -> Result<Vec<AppRecord>, AppError> {
    let packages = registry.installed_packages()?;
    let total = packages.len();

    let mut seen = HashSet::new();
    let apps: Vec<AppRecord> = packages
        .iter()
        .filter(|p| !p.system)
        .filter(|p| seen.insert(p.package_id.clone()))
        .map(AppRecord::from_meta)
        .collect();

    info!(total, listed = apps.len(), "Loaded installed apps");
    Ok(apps)
}

/// Run `f`, then sleep for whatever is left of `min`. Never sleeps once `min` has passed.
pub fn hold_for_at_least<T>(min: Duration, f: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    let out = f();
    let elapsed = started.elapsed();
    if let Some(rest) = min.checked_sub(elapsed) {
        debug!(?elapsed, ?rest, "Holding loading state");
        thread::sleep(rest);
    }
    out
}

/// Query one package and compute its derived fields.
pub fn resolve_detail(registry: &dyn PackageRegistry, package_id: &str) -> Result<AppDetail, AppError> {
    let package_id = package_id.trim();
    if package_id.is_empty() {
        return Err(AppError::NotFound { package: None });
    }

    let meta = registry
        .package(package_id)?
        .ok_or_else(|| AppError::NotFound {
            package: Some(package_id.to_string()),
        })?;

    let size = fs::metadata(&meta.installer_path)
        .map_err(|e| AppError::io(&meta.installer_path, e))?
        .len();
    debug!(package = package_id, size, path = %meta.installer_path.display(), "Resolved package");

    Ok(AppDetail {
        record: AppRecord::from_meta(&meta),
        installer_path: meta.installer_path,
        data_dir: meta.data_dir,
        size,
        uid: meta.uid,
    })
}

/// Binary-unit size with two decimals and a one letter suffix, e.g. `1.50K`.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0usize;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2}{}", value, SIZE_UNITS[unit])
}
