//! Validation and orchestration between the UI and the DAO. Every database
//! error stops here: it is logged and turned into a generic string or `false`
//! so the UI never has to reason about SQLite failures.

use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;
use tracing::{error, info};

use crate::db::ReservationStore;
use crate::error::ValidationError;
use crate::models::Reservation;

static DIGITS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("digit pattern is valid"));

/// Thin coordinator over a [`ReservationStore`].
pub struct ReservationController<S> {
    store: S,
}

impl<S: ReservationStore> ReservationController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn is_valid_bus_no(&self, bus_no: &str) -> bool {
        DIGITS_ONLY.is_match(bus_no)
    }

    /// String-level check for a passenger count. The controller validates the
    /// parsed integer instead, so nothing in the create/update path calls this.
    pub fn is_valid_passenger_count(&self, count: &str) -> bool {
        DIGITS_ONLY.is_match(count)
    }

    fn validate(&self, reservation: &Reservation) -> Result<(), ValidationError> {
        if !self.is_valid_bus_no(&reservation.bus_no) {
            return Err(ValidationError::InvalidBusNo);
        }
        if reservation.passenger_count <= 0 {
            return Err(ValidationError::NonPositivePassengerCount);
        }
        Ok(())
    }

    /// Validate and insert. The returned text is meant for a message dialog;
    /// on success `reservation.id` holds the new primary key.
    pub fn create_reservation(&self, reservation: &mut Reservation) -> String {
        if let Err(err) = self.validate(reservation) {
            return err.to_string();
        }

        match self.store.create_reservation(reservation) {
            Ok(true) => {
                info!(id = reservation.id, bus_no = %reservation.bus_no, "reservation created");
                format!(
                    "Reservation #{} successful! Bus No: {}, Route: {}",
                    reservation.id, reservation.bus_no, reservation.route
                )
            }
            Ok(false) => "Reservation failed!".to_string(),
            Err(err) => {
                error!(error = ?err, "failed to create reservation");
                "Reservation failed due to database error.".to_string()
            }
        }
    }

    /// Every stored reservation, or an empty list when the store fails.
    pub fn get_all_reservations(&self) -> Vec<Reservation> {
        self.store.get_all_reservations().unwrap_or_else(|err| {
            error!(error = ?err, "failed to load reservations");
            Vec::new()
        })
    }

    pub fn update_reservation(&self, reservation: &Reservation) -> bool {
        if self.validate(reservation).is_err() {
            return false;
        }

        match self.store.update_reservation(reservation) {
            Ok(updated) => {
                if updated {
                    info!(id = reservation.id, "reservation updated");
                }
                updated
            }
            Err(err) => {
                error!(id = reservation.id, error = ?err, "failed to update reservation");
                false
            }
        }
    }

    pub fn cancel_reservation(&self, id: i64) -> bool {
        match self.store.delete_reservation(id) {
            Ok(deleted) => {
                if deleted {
                    info!(id, "reservation cancelled");
                }
                deleted
            }
            Err(err) => {
                error!(id, error = ?err, "failed to cancel reservation");
                false
            }
        }
    }

    /// Linear scan over the full listing; the table has no other lookup path.
    pub fn find_reservation_by_id(&self, id: i64) -> Option<Reservation> {
        self.get_all_reservations()
            .into_iter()
            .find(|reservation| reservation.id == id)
    }

    /// Today's date as `YYYY-MM-DD`.
    pub fn current_date(&self) -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }

    /// Wall-clock time as `HH:MM:SS`.
    pub fn current_time(&self) -> String {
        Local::now().format("%H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::{anyhow, Result};
    use tempfile::TempDir;

    use super::*;
    use crate::db::{Database, ReservationDao};

    fn sample(bus_no: &str, passengers: i64) -> Reservation {
        Reservation {
            bus_no: bus_no.into(),
            route: "Coastal".into(),
            passenger_name: "Lin".into(),
            date: "2024-05-01".into(),
            time: "09:00:00".into(),
            start_location: "Pier".into(),
            end_location: "Museum".into(),
            purpose: "Tour".into(),
            passenger_count: passengers,
            vehicle_type: "Minibus".into(),
            ..Reservation::default()
        }
    }

    fn sqlite_controller() -> (TempDir, ReservationController<ReservationDao>) {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("reservations.sqlite"));
        db.ensure_schema().unwrap();
        (dir, ReservationController::new(ReservationDao::new(db)))
    }

    /// Records how often it is touched and fails or no-ops on demand.
    #[derive(Default)]
    struct ScriptedStore {
        fail: bool,
        calls: RefCell<usize>,
    }

    impl ScriptedStore {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn touch(&self) -> Result<bool> {
            *self.calls.borrow_mut() += 1;
            if self.fail {
                Err(anyhow!("disk I/O error"))
            } else {
                Ok(false)
            }
        }
    }

    impl ReservationStore for ScriptedStore {
        fn create_reservation(&self, _reservation: &mut Reservation) -> Result<bool> {
            self.touch()
        }

        fn get_all_reservations(&self) -> Result<Vec<Reservation>> {
            self.touch().map(|_| Vec::new())
        }

        fn update_reservation(&self, _reservation: &Reservation) -> Result<bool> {
            self.touch()
        }

        fn delete_reservation(&self, _id: i64) -> Result<bool> {
            self.touch()
        }
    }

    #[test]
    fn bus_numbers_must_be_all_digits() {
        let controller = ReservationController::new(ScriptedStore::default());
        assert!(controller.is_valid_bus_no("12"));
        assert!(controller.is_valid_bus_no("007"));
        for bad in ["", "12A", " 12", "1 2", "-3", "١٢"] {
            assert!(!controller.is_valid_bus_no(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn passenger_count_string_check_uses_digit_pattern() {
        let controller = ReservationController::new(ScriptedStore::default());
        assert!(controller.is_valid_passenger_count("3"));
        assert!(!controller.is_valid_passenger_count("three"));
    }

    #[test]
    fn create_returns_message_with_assigned_id() {
        let (_dir, controller) = sqlite_controller();
        let mut reservation = sample("12", 2);

        let message = controller.create_reservation(&mut reservation);

        assert!(reservation.id > 0);
        assert_eq!(
            message,
            format!(
                "Reservation #{} successful! Bus No: 12, Route: Coastal",
                reservation.id
            )
        );
        assert_eq!(controller.get_all_reservations(), vec![reservation]);
    }

    #[test]
    fn invalid_bus_number_never_reaches_the_store() {
        let store = ScriptedStore::default();
        let controller = ReservationController::new(store);
        let mut reservation = sample("12A", 2);

        let message = controller.create_reservation(&mut reservation);

        assert_eq!(message, "Bus No must contain only numbers.");
        assert_eq!(*controller.store.calls.borrow(), 0);
    }

    #[test]
    fn non_positive_passenger_counts_are_rejected() {
        let (_dir, controller) = sqlite_controller();
        for count in [0, -1] {
            let mut reservation = sample("12", count);
            assert_eq!(
                controller.create_reservation(&mut reservation),
                "Number of passengers must be greater than 0."
            );
        }
        assert!(controller.get_all_reservations().is_empty());
    }

    #[test]
    fn store_reporting_no_insert_yields_generic_failure() {
        let controller = ReservationController::new(ScriptedStore::default());
        let mut reservation = sample("12", 2);
        assert_eq!(
            controller.create_reservation(&mut reservation),
            "Reservation failed!"
        );
    }

    #[test]
    fn database_errors_become_generic_indicators() {
        let controller = ReservationController::new(ScriptedStore::failing());
        let mut reservation = sample("12", 2);

        assert_eq!(
            controller.create_reservation(&mut reservation),
            "Reservation failed due to database error."
        );
        assert!(controller.get_all_reservations().is_empty());
        assert!(!controller.update_reservation(&sample("12", 2)));
        assert!(!controller.cancel_reservation(1));
        // One call each, no retries.
        assert_eq!(*controller.store.calls.borrow(), 4);
    }

    #[test]
    fn update_validates_before_writing() {
        let (_dir, controller) = sqlite_controller();
        let mut reservation = sample("12", 2);
        controller.create_reservation(&mut reservation);

        let bad_bus = Reservation {
            bus_no: "X1".into(),
            ..reservation.clone()
        };
        let bad_count = Reservation {
            passenger_count: 0,
            ..reservation.clone()
        };
        assert!(!controller.update_reservation(&bad_bus));
        assert!(!controller.update_reservation(&bad_count));
        assert_eq!(controller.get_all_reservations(), vec![reservation.clone()]);

        let good = Reservation {
            route: "Inland".into(),
            passenger_count: 5,
            ..reservation
        };
        assert!(controller.update_reservation(&good));
        assert_eq!(controller.find_reservation_by_id(good.id), Some(good));
    }

    #[test]
    fn update_and_cancel_of_missing_ids_fail() {
        let (_dir, controller) = sqlite_controller();
        let ghost = Reservation {
            id: 77,
            ..sample("12", 2)
        };
        assert!(!controller.update_reservation(&ghost));
        assert!(!controller.cancel_reservation(77));
    }

    #[test]
    fn cancel_removes_the_reservation() {
        let (_dir, controller) = sqlite_controller();
        let mut reservation = sample("5", 1);
        controller.create_reservation(&mut reservation);

        assert!(controller.cancel_reservation(reservation.id));
        assert_eq!(controller.find_reservation_by_id(reservation.id), None);
    }

    #[test]
    fn current_date_and_time_have_fixed_shapes() {
        let controller = ReservationController::new(ScriptedStore::default());
        let date = controller.current_date();
        let time = controller.current_time();

        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
        assert_eq!(time.len(), 8);
        assert_eq!(time.matches(':').count(), 2);
    }
}
