mod config;
mod core;
mod error;
mod export;
mod platform;
mod state;
mod style;
mod types;
mod ui;

use std::sync::Arc;

use eframe::egui;
use tracing_subscriber::EnvFilter;

use config::{Settings, ShareTarget, settings_path};
use export::{Exporter, ShareProvider};
use platform::adb::{Adb, AdbRegistry, DevicePushBroker};
use platform::desktop::FileManagerBroker;
use platform::ShareBroker;
use ui::tasks::Services;

fn main() -> eframe::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();

    tracing::info!("Starting APK Share v{}", env!("CARGO_PKG_VERSION"));

    let settings = load_settings();
    let services = build_services(&settings);
    let device = settings.device_serial.clone();
    let toast_ttl = settings.toast_duration();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([800.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "APK Share",
        native_options,
        Box::new(move |_cc| Ok(Box::new(ui::ApkShareApp::new(services, device, toast_ttl)))),
    )
}

/// `RUST_LOG` wins when set; otherwise this crate logs at debug and the rest at info.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    match rust_log {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new("info,apk_share=debug"),
    }
}

/// Read settings, writing a default file on first run so it can be edited.
fn load_settings() -> Settings {
    let settings = Settings::load();
    if let Some(path) = settings_path() {
        if !path.exists() {
            match settings.save_to(&path) {
                Ok(()) => tracing::info!(path = %path.display(), "Wrote default settings"),
                Err(e) => tracing::warn!("Cannot write default settings: {:#}", e),
            }
        }
    }
    tracing::debug!(?settings, "Settings loaded");
    settings
}

fn build_services(settings: &Settings) -> Services {
    let adb = Adb::new(settings.adb_path.clone(), settings.device_serial.clone());
    let provider = Arc::new(ShareProvider::new(
        settings.share_authority.clone(),
        settings.scratch_dir(),
    ));

    let broker: Arc<dyn ShareBroker> = match settings.share_target {
        ShareTarget::FileManager => Arc::new(FileManagerBroker::new(provider.clone())),
        ShareTarget::DeviceDownloads => Arc::new(DevicePushBroker::new(adb.clone(), provider.clone())),
    };
    tracing::info!(share_target = ?settings.share_target, device = ?adb.serial(), "Share target configured");

    Services {
        registry: Arc::new(AdbRegistry::new(adb, settings.mirror_dir())),
        broker,
        exporter: Arc::new(Exporter::new(provider, settings.chooser_title.clone())),
        min_loading: settings.min_loading(),
    }
}
