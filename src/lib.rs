//! Core library surface for the worship projector TUI.
//!
//! The binary only wires configuration, logging and the database together;
//! everything else lives in these modules so it can be tested without a
//! terminal.
pub mod config;
pub mod db;
pub mod history;
pub mod logging;
pub mod models;
pub mod projection;
pub mod reference;
pub mod slides;
pub mod ui;

/// Persistence entry points used by `main.rs` to open and fill the store.
pub use db::{ensure_schema, open_in_memory, seed_if_empty};

pub use config::AppConfig;
pub use models::{Hymn, Praise, Verse};

/// The interactive application entry point and state container.
pub use ui::{run_app, App, ProjectorSetup};
