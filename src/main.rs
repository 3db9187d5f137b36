//! Chat Replay Viewer - replay a recorded live chat in sync with video playback.

mod core;
mod gui;

use crate::core::config::AppSettings;
use gui::ChatReplayApp;
use tracing_subscriber::EnvFilter;

/// Window size used when no size was saved.
const DEFAULT_WINDOW_SIZE: (f32, f32) = (480.0, 800.0);

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = AppSettings::load();
    let (width, height) = settings.window_size.unwrap_or(DEFAULT_WINDOW_SIZE);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([320.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Chat Replay Viewer",
        options,
        Box::new(|cc| Ok(Box::new(ChatReplayApp::new(cc, settings)))),
    )
}
