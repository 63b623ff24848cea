//! Library surface for the bus reservation manager. The binary only wires
//! configuration, logging, and the terminal loop together; everything it
//! needs is re-exported here.
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

pub use config::AppConfig;
pub use controller::ReservationController;
pub use db::{Database, ReservationDao, ReservationStore};
pub use error::{SelectionError, ValidationError};
pub use models::Reservation;
pub use ui::{run_app, App};
