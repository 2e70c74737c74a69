//! Ratatui front-end: the control console on the operator's terminal and the
//! write-only projector surface.

mod app;
mod forms;
mod helpers;
mod projector;
mod screens;
mod terminal;

pub use app::App;
pub use projector::{Projector, ProjectorSetup};
pub use terminal::run_app;
