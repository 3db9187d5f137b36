//! Core module for chat log data structures and replay synchronization.

pub mod chat;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod normalizer;
pub mod parser;
pub mod playback;
pub mod scroll;
pub mod session;
pub mod timestamp;
