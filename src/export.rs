//! Staging an installer copy and handing it to a share broker.
//!
//! The scratch directory is reset on every export, so only the most recent
//! staged file (and its grant) is valid at any time.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};
use url::Url;

use crate::error::AppError;
use crate::platform::{ShareBroker, ShareRequest};
use crate::types::{AppDetail, AppRecord};

pub const APK_MIME: &str = "application/vnd.android.package-archive";

/// A `content://` handle for a staged file. Never carries a filesystem path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShareHandle(Url);

impl ShareHandle {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ShareHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Maps files under one root directory to `content://<authority>/share/...` handles.
pub struct ShareProvider {
    authority: String,
    root: PathBuf,
    grants: Mutex<HashMap<String, PathBuf>>,
}

impl ShareProvider {
    pub fn new(authority: impl Into<String>, root: PathBuf) -> Self {
        Self {
            authority: authority.into(),
            root,
            grants: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn grant(&self, path: &Path) -> Result<ShareHandle, AppError> {
        let rel = path.strip_prefix(&self.root).map_err(|_| {
            AppError::BrokerFailure(format!("{} is outside the shared directory", path.display()))
        })?;

        let mut url = Url::parse(&format!("content://{}/share/", self.authority))
            .map_err(|e| AppError::BrokerFailure(format!("bad authority {:?}: {}", self.authority, e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::BrokerFailure("content url cannot hold a path".into()))?
            .pop_if_empty()
            .extend(rel.iter().map(|c| c.to_string_lossy()));

        let handle = ShareHandle(url);
        self.grants
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.as_str().to_string(), path.to_path_buf());
        debug!(%handle, "Granted share handle");
        Ok(handle)
    }

    /// Path behind a granted handle, if it is still valid.
    pub fn open(&self, handle: &ShareHandle) -> Option<PathBuf> {
        self.grants
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(handle.as_str())
            .cloned()
    }

    pub fn revoke_all(&self) {
        self.grants.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Copies installers into the provider's root and passes them to a broker.
pub struct Exporter {
    provider: Arc<ShareProvider>,
    chooser_title: String,
    // one staging at a time; the scratch directory is shared
    busy: Mutex<()>,
}

impl Exporter {
    pub fn new(provider: Arc<ShareProvider>, chooser_title: impl Into<String>) -> Self {
        Self {
            provider,
            chooser_title: chooser_title.into(),
            busy: Mutex::new(()),
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        self.provider.root()
    }

    pub fn export(&self, detail: &AppDetail, broker: &dyn ShareBroker) -> Result<ShareHandle, AppError> {
        let _busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);

        self.reset_scratch_dir()?;
        let target = self.scratch_dir().join(export_file_name(&detail.record));
        copy_file(&detail.installer_path, &target)?;

        let handle = self.provider.grant(&target)?;
        let request = ShareRequest {
            mime: APK_MIME,
            handle: handle.clone(),
            chooser_title: self.chooser_title.clone(),
        };
        broker.share(&request)?;

        info!(package = %detail.record.package_id, %handle, "Exported installer");
        Ok(handle)
    }

    fn reset_scratch_dir(&self) -> Result<(), AppError> {
        let dir = self.scratch_dir();
        self.provider.revoke_all();
        if dir.exists() {
            fs::remove_dir_all(dir).map_err(|e| AppError::io(dir, e))?;
        }
        fs::create_dir_all(dir).map_err(|e| AppError::io(dir, e))
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<u64, AppError> {
    let mut src = File::open(from).map_err(|e| AppError::io(from, e))?;
    let mut dst = File::create(to).map_err(|e| AppError::io(to, e))?;
    let copied = io::copy(&mut src, &mut dst).map_err(|e| AppError::io(to, e))?;
    if let Err(e) = dst.sync_all() {
        warn!(path = %to.display(), "sync failed: {}", e);
    }
    Ok(copied)
}

/// `<label>_<package>_<version>.apk`, with separators and control characters replaced.
pub fn export_file_name(record: &AppRecord) -> String {
    let clean = |s: &str| -> String {
        s.chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect()
    };
    format!(
        "{}_{}_{}.apk",
        clean(&record.label),
        clean(&record.package_id),
        clean(&record.version_name)
    )
}
