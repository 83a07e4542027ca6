//! Core data types shared across the application.

use egui::Color32;
use std::path::PathBuf;

use crate::error::AppError;
use crate::export::ShareHandle;

/// Opaque icon handle attached to every listed application.
///
/// The registry adapters have no access to launcher artwork, so the handle is a
/// monogram: a glyph plus a hue derived from the package id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconHandle {
    glyph: char,
    hue: u8,
}

impl IconHandle {
    pub fn monogram(label: &str, package_id: &str) -> Self {
        let glyph = label
            .chars()
            .find(|c| c.is_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?');
        // FNV-1a, stable across runs
        let hash = package_id
            .bytes()
            .fold(0x811c_9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
        Self {
            glyph,
            hue: (hash % 251) as u8,
        }
    }

    pub fn glyph(&self) -> char {
        self.glyph
    }

    pub fn hue(&self) -> u8 {
        self.hue
    }
}

/// Raw package metadata as reported by a `PackageRegistry`.
#[derive(Clone, Debug)]
pub struct PackageMeta {
    pub package_id: String,
    pub label: String,
    pub version_name: String,
    pub version_code: i64,
    pub installer_path: PathBuf,
    pub data_dir: PathBuf,
    pub uid: u32,
    pub system: bool,
}

/// One row of the application list.
#[derive(Clone, Debug, PartialEq)]
pub struct AppRecord {
    pub package_id: String,
    pub label: String,
    pub version_name: String,
    pub version_code: i64,
    pub icon: IconHandle,
}

impl AppRecord {
    pub fn from_meta(meta: &PackageMeta) -> Self {
        Self {
            package_id: meta.package_id.clone(),
            label: meta.label.clone(),
            version_name: meta.version_name.clone(),
            version_code: meta.version_code,
            icon: IconHandle::monogram(&meta.label, &meta.package_id),
        }
    }
}

/// Everything the detail panel shows for a single package.
#[derive(Clone, Debug, PartialEq)]
pub struct AppDetail {
    pub record: AppRecord,
    pub installer_path: PathBuf,
    pub data_dir: PathBuf,
    pub size: u64,
    pub uid: u32,
}

impl AppDetail {
    /// Human readable installer size, always derived from `size`.
    pub fn size_display(&self) -> String {
        crate::core::format_size(self.size)
    }
}

/// Kind of background task a worker is running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskKind {
    RefreshApps,
    ResolveDetail(String), // package id
    Export,
}

/// Completion message sent from a worker thread to the UI thread.
#[derive(Debug)]
pub enum TaskEvent {
    AppsLoaded(Result<Vec<AppRecord>, AppError>),
    DetailResolved {
        package_id: String,
        result: Result<AppDetail, AppError>,
    },
    ExportFinished(Result<ShareHandle, AppError>),
}

impl TaskEvent {
    /// Event reported when a worker of `kind` stopped without a result.
    pub fn interrupted(kind: &TaskKind) -> Self {
        let err = AppError::Interrupted;
        match kind {
            TaskKind::RefreshApps => TaskEvent::AppsLoaded(Err(err)),
            TaskKind::ResolveDetail(id) => TaskEvent::DetailResolved {
                package_id: id.clone(),
                result: Err(err),
            },
            TaskKind::Export => TaskEvent::ExportFinished(Err(err)),
        }
    }
}

pub struct StateColors {
    pub default: Color32,
    pub hover: Color32,
    pub selected: Option<Color32>, // None = use default theme color
}
