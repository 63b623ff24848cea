//! Ratatui front-end: a single "Reserved Buses" listing with modal dialogs for
//! reserving, editing, and cancelling.

mod app;
mod forms;
mod helpers;
mod listing;
mod terminal;

pub use app::App;
pub use terminal::run_app;
