//! Domain model that mirrors the `reservations` table. The struct stays a
//! plain data holder so validation lives in the controller and formatting
//! lives in the listing code.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// One bus booking. Every text column is free-form; only `bus_no` and
/// `passenger_count` carry invariants, and the controller enforces them.
pub struct Reservation {
    /// Primary key assigned by SQLite. Zero until the row has been inserted.
    pub id: i64,
    /// Bus number kept as text so leading zeros survive round trips.
    pub bus_no: String,
    pub route: String,
    pub passenger_name: String,
    pub date: String,
    pub time: String,
    pub start_location: String,
    pub end_location: String,
    pub purpose: String,
    pub passenger_count: i64,
    pub vehicle_type: String,
}

impl fmt::Display for Reservation {
    /// Render the single pipe-delimited line shown in the "Reserved Buses"
    /// panel. The leading `ID: n` field is parsed back when the user edits or
    /// cancels, so its shape must not change.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} | Bus No: {} | Route: {} | Name: {} | Date: {} | Time: {} | From: {} | To: {} | Purpose: {} | Passengers: {} | Vehicle: {}",
            self.id,
            self.bus_no,
            self.route,
            self.passenger_name,
            self.date,
            self.time,
            self.start_location,
            self.end_location,
            self.purpose,
            self.passenger_count,
            self.vehicle_type
        )
    }
}
