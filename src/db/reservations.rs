use anyhow::{Context, Result};
use rusqlite::params;
use tracing::{debug, instrument};

use super::connection::Database;
use crate::models::Reservation;

/// The operations the controller needs from persistence. Keeping this as a
/// trait lets the controller be driven by something other than SQLite.
pub trait ReservationStore {
    /// Insert the record and write the generated id back into it. `Ok(false)`
    /// means the statement ran but no row was inserted.
    fn create_reservation(&self, reservation: &mut Reservation) -> Result<bool>;
    fn get_all_reservations(&self) -> Result<Vec<Reservation>>;
    /// Overwrite every data column of the row with `reservation.id`.
    fn update_reservation(&self, reservation: &Reservation) -> Result<bool>;
    fn delete_reservation(&self, id: i64) -> Result<bool>;
}

/// SQLite-backed data access object for the `reservations` table. Each call
/// opens its own connection through [`Database::connect`].
#[derive(Debug, Clone)]
pub struct ReservationDao {
    db: Database,
}

impl ReservationDao {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl ReservationStore for ReservationDao {
    #[instrument(skip_all, fields(bus_no = %reservation.bus_no))]
    fn create_reservation(&self, reservation: &mut Reservation) -> Result<bool> {
        let conn = self.db.connect()?;
        let inserted = conn
            .execute(
                "INSERT INTO reservations (bus_no, route, passenger_name, date, time,
                    start_location, end_location, purpose, passenger_count, vehicle_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    reservation.bus_no,
                    reservation.route,
                    reservation.passenger_name,
                    reservation.date,
                    reservation.time,
                    reservation.start_location,
                    reservation.end_location,
                    reservation.purpose,
                    reservation.passenger_count,
                    reservation.vehicle_type,
                ],
            )
            .context("failed to insert reservation")?;

        if inserted == 0 {
            return Ok(false);
        }

        reservation.id = conn.last_insert_rowid();
        debug!(id = reservation.id, "reservation inserted");
        Ok(true)
    }

    fn get_all_reservations(&self) -> Result<Vec<Reservation>> {
        let conn = self.db.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, bus_no, route, passenger_name, date, time,
                        start_location, end_location, purpose, passenger_count, vehicle_type
                 FROM reservations
                 ORDER BY id",
            )
            .context("failed to prepare reservation query")?;

        let reservations = stmt
            .query_map([], |row| {
                Ok(Reservation {
                    id: row.get(0)?,
                    bus_no: row.get(1)?,
                    route: row.get(2)?,
                    passenger_name: row.get(3)?,
                    date: row.get(4)?,
                    time: row.get(5)?,
                    start_location: row.get(6)?,
                    end_location: row.get(7)?,
                    purpose: row.get(8)?,
                    passenger_count: row.get(9)?,
                    vehicle_type: row.get(10)?,
                })
            })
            .context("failed to load reservations")?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to collect reservations")?;

        Ok(reservations)
    }

    #[instrument(skip_all, fields(id = reservation.id))]
    fn update_reservation(&self, reservation: &Reservation) -> Result<bool> {
        let conn = self.db.connect()?;
        let updated = conn
            .execute(
                "UPDATE reservations SET bus_no = ?1, route = ?2, passenger_name = ?3,
                    date = ?4, time = ?5, start_location = ?6, end_location = ?7,
                    purpose = ?8, passenger_count = ?9, vehicle_type = ?10
                 WHERE id = ?11",
                params![
                    reservation.bus_no,
                    reservation.route,
                    reservation.passenger_name,
                    reservation.date,
                    reservation.time,
                    reservation.start_location,
                    reservation.end_location,
                    reservation.purpose,
                    reservation.passenger_count,
                    reservation.vehicle_type,
                    reservation.id,
                ],
            )
            .context("failed to update reservation")?;

        Ok(updated > 0)
    }

    #[instrument(skip(self))]
    fn delete_reservation(&self, id: i64) -> Result<bool> {
        let conn = self.db.connect()?;
        let deleted = conn
            .execute("DELETE FROM reservations WHERE id = ?1", params![id])
            .context("failed to delete reservation")?;

        Ok(deleted > 0)
    }
}
