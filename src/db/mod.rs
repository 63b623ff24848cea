//! Persistence module split across logical submodules.

mod connection;
mod reservations;

pub use connection::Database;
pub use reservations::{ReservationDao, ReservationStore};
