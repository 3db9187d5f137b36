//! GUI module for the chat replay viewer.
//!
//! This module contains the egui-based user interface components
//! including the main application window, chat panel, transport controls and dialogs.

mod app;
mod chat_panel;
mod controls;
mod dialogs;

pub use app::ChatReplayApp;
