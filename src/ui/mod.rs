//! Egui-based UI for APK Share.
//!
//! `ApkShareApp` owns the `AppState` and the receiving end of the worker channel.
//! Panels only read the state and report what the user clicked; `update` turns
//! those actions into state operations and background tasks.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use eframe::{App, egui};
use tracing::debug;

use crate::state::AppState;
use crate::style::set_material_style;
use crate::types::TaskEvent;

pub mod list;
pub mod panels;
pub mod tasks;

use tasks::Services;

/// What the user asked for during one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiAction {
    Refresh,
    Select(String),
    CloseDetail,
    Share,
}

/// Main eframe application that renders and controls the UI.
pub struct ApkShareApp {
    state: AppState,
    services: Services,
    device: Option<String>,
    events_tx: mpsc::Sender<TaskEvent>,
    events_rx: mpsc::Receiver<TaskEvent>,
}

impl ApkShareApp {
    /// Start with an empty state and immediately trigger an apps refresh.
    pub fn new(services: Services, device: Option<String>, toast_ttl: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let mut app = Self {
            state: AppState::new(toast_ttl),
            services,
            device,
            events_tx,
            events_rx,
        };
        app.dispatch(UiAction::Refresh);
        app
    }

    fn dispatch(&mut self, action: UiAction) {
        debug!(?action, "UI action");
        match action {
            UiAction::Refresh => {
                if self.state.begin_refresh() {
                    tasks::spawn_refresh_apps(&self.services, self.events_tx.clone());
                }
            }
            UiAction::Select(package_id) => {
                if self.state.select(&package_id) {
                    tasks::spawn_resolve_detail(&self.services, self.events_tx.clone(), package_id);
                }
            }
            UiAction::CloseDetail => self.state.close_detail(),
            UiAction::Share => {
                if let Some(detail) = self.state.begin_export() {
                    tasks::spawn_export(&self.services, self.events_tx.clone(), detail);
                }
            }
        }
    }
}

/// Egui frame update: applies finished tasks, renders panels, dispatches actions.
impl App for ApkShareApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        set_material_style(ctx);

        // pull completion events (non-blocking)
        let now = Instant::now();
        while let Ok(event) = self.events_rx.try_recv() {
            self.state.apply(event, now);
        }
        self.state.prune_toasts(now);

        let mut actions = Vec::new();
        panels::top::show(ctx, self.device.as_deref());
        panels::bottom::show(ctx, &self.state);
        panels::side::show(ctx, &self.state, &mut actions);
        panels::central::show(ctx, &self.state, &mut actions);

        for action in actions {
            self.dispatch(action);
        }

        // keep polling the channel and ageing toasts
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
