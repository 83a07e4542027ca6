//! UI state holder.
//!
//! Owned by the UI thread. Panels read it through the accessors; it changes only
//! through the operations below and through `apply`, which the UI thread calls
//! with completion events drained from the worker channel.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::types::{AppDetail, AppRecord, TaskEvent};

/// What the central panel shows.
#[derive(Clone, Debug, PartialEq)]
pub enum DetailView {
    Empty,
    Loading(String),
    Loaded(AppDetail),
    Failed { package_id: String, message: String },
}

/// Transient message shown in the status bar.
#[derive(Clone, Debug)]
pub struct Toast {
    pub text: String,
    pub expires: Instant,
}

pub struct AppState {
    apps: Vec<AppRecord>,
    loading: bool,
    load_error: Option<String>,
    detail: DetailView,
    sharing: bool,
    toasts: Vec<Toast>,
    toast_ttl: Duration,
}

impl AppState {
    pub fn new(toast_ttl: Duration) -> Self {
        Self {
            apps: Vec::new(),
            loading: false,
            load_error: None,
            detail: DetailView::Empty,
            sharing: false,
            toasts: Vec::new(),
            toast_ttl,
        }
    }

    pub fn apps(&self) -> &[AppRecord] {
        &self.apps
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn detail(&self) -> &DetailView {
        &self.detail
    }

    /// Package id of the open detail, if any.
    pub fn selected(&self) -> Option<&str> {
        match &self.detail {
            DetailView::Empty => None,
            DetailView::Loading(id) => Some(id),
            DetailView::Loaded(d) => Some(&d.record.package_id),
            DetailView::Failed { package_id, .. } => Some(package_id),
        }
    }

    pub fn is_sharing(&self) -> bool {
        self.sharing
    }

    pub fn latest_toast(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    /// Mark a refresh as started. `false` when one is already running.
    pub fn begin_refresh(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Open the detail for `package_id`. `false` when it is already open.
    pub fn select(&mut self, package_id: &str) -> bool {
        if self.selected() == Some(package_id) && !matches!(self.detail, DetailView::Failed { .. }) {
            return false;
        }
        self.detail = DetailView::Loading(package_id.to_string());
        true
    }

    pub fn close_detail(&mut self) {
        self.detail = DetailView::Empty;
    }

    /// Mark an export as started and return the detail to export.
    /// `None` when nothing is loaded or an export is already running.
    pub fn begin_export(&mut self) -> Option<AppDetail> {
        if self.sharing {
            return None;
        }
        match &self.detail {
            DetailView::Loaded(detail) => {
                self.sharing = true;
                Some(detail.clone())
            }
            _ => None,
        }
    }

    /// Apply a worker's completion event.
    pub fn apply(&mut self, event: TaskEvent, now: Instant) {
        match event {
            TaskEvent::AppsLoaded(Ok(apps)) => {
                self.loading = false;
                self.load_error = None;
                self.push_toast(format!("Loaded {} apps", apps.len()), now);
                self.apps = apps;
            }
            TaskEvent::AppsLoaded(Err(e)) => {
                warn!("Refresh apps failed: {}", e);
                self.loading = false;
                self.apps.clear();
                let msg = e.user_message();
                self.load_error = Some(msg.clone());
                self.push_toast(msg, now);
            }
            TaskEvent::DetailResolved { package_id, result } => {
                // drop answers for a detail that is no longer open
                if self.detail != DetailView::Loading(package_id.clone()) {
                    info!(package = %package_id, "Discarding stale detail");
                    return;
                }
                self.detail = match result {
                    Ok(detail) => DetailView::Loaded(detail),
                    Err(e) => {
                        warn!(package = %package_id, "Resolve failed: {}", e);
                        DetailView::Failed {
                            package_id,
                            message: e.user_message(),
                        }
                    }
                };
            }
            TaskEvent::ExportFinished(result) => {
                self.sharing = false;
                match result {
                    Ok(handle) => info!(%handle, "Share handed off"),
                    Err(e) => {
                        warn!("Export failed: {}", e);
                        self.push_toast(e.user_message(), now);
                    }
                }
            }
        }
    }

    pub fn push_toast(&mut self, text: String, now: Instant) {
        self.toasts.push(Toast {
            text,
            expires: now + self.toast_ttl,
        });
    }

    /// Drop expired messages.
    pub fn prune_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::types::IconHandle;
    use std::path::PathBuf;

    fn record(id: &str) -> AppRecord {
        AppRecord {
            package_id: id.into(),
            label: id.into(),
            version_name: "1.0".into(),
            version_code: 1,
            icon: IconHandle::monogram(id, id),
        }
    }

    fn detail(id: &str) -> AppDetail {
        AppDetail {
            record: record(id),
            installer_path: PathBuf::from("/nonexistent/base.apk"),
            data_dir: PathBuf::from("/data/user/0/x"),
            size: 0,
            uid: 10_001,
        }
    }

    fn state_with_detail(id: &str) -> AppState {
        let mut s = AppState::new(Duration::from_secs(4));
        assert!(s.select(id));
        s.apply(
            TaskEvent::DetailResolved {
                package_id: id.into(),
                result: Ok(detail(id)),
            },
            Instant::now(),
        );
        s
    }

    #[test]
    fn refresh_cannot_start_twice() {
        let mut s = AppState::new(Duration::from_secs(4));
        assert!(s.begin_refresh());
        assert!(!s.begin_refresh());
        s.apply(TaskEvent::AppsLoaded(Ok(vec![record("a"), record("b")])), Instant::now());
        assert!(!s.is_loading());
        assert_eq!(s.apps().len(), 2);
        assert_eq!(s.latest_toast().unwrap().text, "Loaded 2 apps");
        assert!(s.begin_refresh());
    }

    #[test]
    fn failed_refresh_clears_loading_and_reports() {
        let mut s = AppState::new(Duration::from_secs(4));
        s.begin_refresh();
        s.apply(
            TaskEvent::AppsLoaded(Err(AppError::RegistryFailure("no devices".into()))),
            Instant::now(),
        );
        assert!(!s.is_loading());
        assert!(s.apps().is_empty());
        assert_eq!(s.load_error(), Some("Cannot query packages: no devices"));
    }

    #[test]
    fn second_export_is_refused_while_first_runs() {
        let mut s = state_with_detail("com.a");
        assert!(s.begin_export().is_some());
        assert!(s.is_sharing());
        assert!(s.begin_export().is_none());

        s.apply(TaskEvent::ExportFinished(Err(AppError::Interrupted)), Instant::now());
        assert!(!s.is_sharing());
        assert!(s.begin_export().is_some());
    }

    #[test]
    fn export_failure_clears_sharing_and_toasts() {
        let mut s = state_with_detail("com.a");
        s.begin_export();
        let err = AppError::io(
            &PathBuf::from("/nonexistent/base.apk"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        );
        s.apply(TaskEvent::ExportFinished(Err(err)), Instant::now());
        assert!(!s.is_sharing());
        assert_eq!(s.latest_toast().unwrap().text, "File error (base.apk): No such file");
    }

    #[test]
    fn export_needs_a_loaded_detail() {
        let mut s = AppState::new(Duration::from_secs(4));
        assert!(s.begin_export().is_none());
        s.select("com.a");
        assert!(s.begin_export().is_none());
        assert!(!s.is_sharing());
    }

    #[test]
    fn stale_detail_is_discarded() {
        let mut s = AppState::new(Duration::from_secs(4));
        s.select("com.a");
        s.select("com.b");
        s.apply(
            TaskEvent::DetailResolved {
                package_id: "com.a".into(),
                result: Ok(detail("com.a")),
            },
            Instant::now(),
        );
        assert_eq!(s.detail(), &DetailView::Loading("com.b".into()));
    }

    #[test]
    fn not_found_detail_shows_message() {
        let mut s = AppState::new(Duration::from_secs(4));
        s.select("gone.pkg");
        s.apply(
            TaskEvent::DetailResolved {
                package_id: "gone.pkg".into(),
                result: Err(AppError::NotFound {
                    package: Some("gone.pkg".into()),
                }),
            },
            Instant::now(),
        );
        assert_eq!(
            s.detail(),
            &DetailView::Failed {
                package_id: "gone.pkg".into(),
                message: "Package gone.pkg not found.".into()
            }
        );
        // retry allowed after a failure
        assert!(s.select("gone.pkg"));
    }

    #[test]
    fn reselecting_open_detail_is_a_no_op() {
        let mut s = state_with_detail("com.a");
        assert!(!s.select("com.a"));
        s.close_detail();
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn toasts_expire() {
        let mut s = AppState::new(Duration::from_secs(4));
        let now = Instant::now();
        s.push_toast("hello".into(), now);
        s.prune_toasts(now + Duration::from_secs(1));
        assert!(s.latest_toast().is_some());
        s.prune_toasts(now + Duration::from_secs(5));
        assert!(s.latest_toast().is_none());
    }
}
