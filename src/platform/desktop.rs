//! Desktop share target: reveal the staged file in the system file manager.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use super::{ShareBroker, ShareRequest};
use crate::error::AppError;
use crate::export::ShareProvider;

pub struct FileManagerBroker {
    provider: Arc<ShareProvider>,
}

impl FileManagerBroker {
    pub fn new(provider: Arc<ShareProvider>) -> Self {
        Self { provider }
    }
}

impl ShareBroker for FileManagerBroker {
    fn share(&self, request: &ShareRequest) -> Result<(), AppError> {
        let path = self
            .provider
            .open(&request.handle)
            .ok_or_else(|| AppError::BrokerFailure(format!("unknown handle {}", request.handle)))?;
        reveal_in_file_manager(&path).map_err(|e| AppError::BrokerFailure(format!("{:#}", e)))?;
        info!(title = %request.chooser_title, mime = request.mime, handle = %request.handle, "Shared package");
        Ok(())
    }
}

/// Reveal path in Finder / Explorer, or open its folder elsewhere.
pub fn reveal_in_file_manager(path: &Path) -> Result<()> {
    let p = path
        .canonicalize()
        .with_context(|| format!("Canon {:?}", path))?;

    let status = file_manager_command(&p)
        .status()
        .with_context(|| "Failed to launch the file manager")?;

    // explorer.exe reports 1 even when it succeeds
    if !status.success() && !cfg!(target_os = "windows") {
        return Err(anyhow::anyhow!("File manager exited with {}", status));
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn file_manager_command(p: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg("-R").arg(p);
    cmd
}

#[cfg(windows)]
fn file_manager_command(p: &Path) -> Command {
    use std::os::windows::process::CommandExt;

    // Explorer wants `/select,"path"` verbatim, not the whole token quoted.
    let mut cmd = Command::new("explorer");
    cmd.raw_arg(explorer_select_arg(p));
    cmd
}

#[cfg(not(any(target_os = "macos", windows)))]
fn file_manager_command(p: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(p.parent().unwrap_or(p));
    cmd
}

/// `canonicalize` yields `\\?\C:\...` on Windows, which Explorer does not accept.
#[cfg(any(windows, test))]
fn explorer_select_arg(p: &Path) -> String {
    let shown = p.display().to_string();
    let plain = shown.strip_prefix(r"\\?\").unwrap_or(&shown);
    format!("/select,\"{}\"", plain)
}
