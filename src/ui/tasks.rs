//! Background tasks used by the UI for refreshing the app list, resolving a
//! package's detail, and exporting an installer without blocking the UI thread.
//!
//! Workers never touch `AppState`; each one sends exactly one `TaskEvent`.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use tracing::{error, warn};

use crate::core::{hold_for_at_least, load_installed_apps, resolve_detail};
use crate::export::Exporter;
use crate::platform::{PackageRegistry, ShareBroker};
use crate::types::{AppDetail, TaskEvent, TaskKind};

/// Handles the workers need, cheap to clone into a thread.
#[derive(Clone)]
pub struct Services {
    pub registry: Arc<dyn PackageRegistry>,
    pub broker: Arc<dyn ShareBroker>,
    pub exporter: Arc<Exporter>,
    pub min_loading: Duration,
}

/// Sends the worker's result, or an `interrupted` event if the worker unwinds first.
struct TaskCompletion {
    tx: Sender<TaskEvent>,
    kind: TaskKind,
    done: bool,
}

impl TaskCompletion {
    fn new(tx: Sender<TaskEvent>, kind: TaskKind) -> Self {
        Self { tx, kind, done: false }
    }

    fn finish(mut self, event: TaskEvent) {
        self.done = true;
        let _ = self.tx.send(event);
    }
}

impl Drop for TaskCompletion {
    fn drop(&mut self) {
        if !self.done {
            warn!(kind = ?self.kind, "Task ended without a result");
            let _ = self.tx.send(TaskEvent::interrupted(&self.kind));
        }
    }
}

fn spawn_task(name: &str, completion: TaskCompletion, work: impl FnOnce() -> TaskEvent + Send + 'static) {
    let spawned = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let event = work();
            completion.finish(event);
        });
    // a failed spawn drops the closure, and with it the completion guard
    if let Err(e) = spawned {
        error!("Cannot spawn {} worker: {}", name, e);
    }
}

/// Spawn a background task to reload the list of installed applications.
pub fn spawn_refresh_apps(services: &Services, tx: Sender<TaskEvent>) {
    let registry = services.registry.clone();
    let min = services.min_loading;
    let completion = TaskCompletion::new(tx, TaskKind::RefreshApps);
    spawn_task("refresh-apps", completion, move || {
        TaskEvent::AppsLoaded(hold_for_at_least(min, || load_installed_apps(registry.as_ref())))
    });
}

/// Spawn a background task to resolve one package's detail.
pub fn spawn_resolve_detail(services: &Services, tx: Sender<TaskEvent>, package_id: String) {
    let registry = services.registry.clone();
    let completion = TaskCompletion::new(tx, TaskKind::ResolveDetail(package_id.clone()));
    spawn_task("resolve-detail", completion, move || {
        let result = resolve_detail(registry.as_ref(), &package_id);
        TaskEvent::DetailResolved { package_id, result }
    });
}

/// Spawn a background task that stages the installer and hands it to the broker.
pub fn spawn_export(services: &Services, tx: Sender<TaskEvent>, detail: AppDetail) {
    let exporter = services.exporter.clone();
    let broker = services.broker.clone();
    let completion = TaskCompletion::new(tx, TaskKind::Export);
    spawn_task("export", completion, move || {
        TaskEvent::ExportFinished(exporter.export(&detail, broker.as_ref()))
    });
}
