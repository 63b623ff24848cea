use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::error::ValidationError;
use crate::models::Reservation;

/// Fields of the reservation form, in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum ReservationField {
    #[default]
    BusNo,
    Route,
    PassengerName,
    Date,
    Time,
    StartLocation,
    EndLocation,
    Purpose,
    PassengerCount,
    VehicleType,
}

impl ReservationField {
    pub(crate) const ALL: [ReservationField; 10] = [
        ReservationField::BusNo,
        ReservationField::Route,
        ReservationField::PassengerName,
        ReservationField::Date,
        ReservationField::Time,
        ReservationField::StartLocation,
        ReservationField::EndLocation,
        ReservationField::Purpose,
        ReservationField::PassengerCount,
        ReservationField::VehicleType,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            ReservationField::BusNo => "Bus No",
            ReservationField::Route => "Route",
            ReservationField::PassengerName => "Reservor Name",
            ReservationField::Date => "Date of Reservation",
            ReservationField::Time => "Time of Reservation",
            ReservationField::StartLocation => "Start Location",
            ReservationField::EndLocation => "End Location",
            ReservationField::Purpose => "Purpose",
            ReservationField::PassengerCount => "No. of Passengers",
            ReservationField::VehicleType => "Vehicle Type",
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Text buffers behind the reserve and edit dialogs. Values are kept raw
/// until [`ReservationForm::parse_inputs`] trims and converts them.
#[derive(Clone, Debug, Default)]
pub(crate) struct ReservationForm {
    values: [String; 10],
    pub(crate) active: ReservationField,
    pub(crate) error: Option<String>,
}

impl ReservationForm {
    /// Blank form with the date and time pre-filled.
    pub(crate) fn new(date: String, time: String) -> Self {
        let mut form = Self::default();
        form.values[ReservationField::Date.index()] = date;
        form.values[ReservationField::Time.index()] = time;
        form
    }

    /// Populate the form from a stored reservation when editing.
    pub(crate) fn from_reservation(reservation: &Reservation) -> Self {
        let mut form = Self::default();
        for field in ReservationField::ALL {
            form.values[field.index()] = match field {
                ReservationField::BusNo => reservation.bus_no.clone(),
                ReservationField::Route => reservation.route.clone(),
                ReservationField::PassengerName => reservation.passenger_name.clone(),
                ReservationField::Date => reservation.date.clone(),
                ReservationField::Time => reservation.time.clone(),
                ReservationField::StartLocation => reservation.start_location.clone(),
                ReservationField::EndLocation => reservation.end_location.clone(),
                ReservationField::Purpose => reservation.purpose.clone(),
                ReservationField::PassengerCount => reservation.passenger_count.to_string(),
                ReservationField::VehicleType => reservation.vehicle_type.clone(),
            };
        }
        form
    }

    pub(crate) fn value(&self, field: ReservationField) -> &str {
        &self.values[field.index()]
    }

    pub(crate) fn focus(&mut self, field: ReservationField) {
        self.active = field;
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    /// Append a character to the active field. Control characters are ignored.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.values[self.active.index()].push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.values[self.active.index()].pop();
    }

    /// Trim every field and parse the passenger count. Only a count that is
    /// not an integer fails here; range checks belong to the controller.
    pub(crate) fn parse_inputs(&self, id: i64) -> Result<Reservation, ValidationError> {
        let text = |field: ReservationField| self.value(field).trim().to_string();
        let passenger_count = self
            .value(ReservationField::PassengerCount)
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidPassengerCount)?;

        Ok(Reservation {
            id,
            bus_no: text(ReservationField::BusNo),
            route: text(ReservationField::Route),
            passenger_name: text(ReservationField::PassengerName),
            date: text(ReservationField::Date),
            time: text(ReservationField::Time),
            start_location: text(ReservationField::StartLocation),
            end_location: text(ReservationField::EndLocation),
            purpose: text(ReservationField::Purpose),
            passenger_count,
            vehicle_type: text(ReservationField::VehicleType),
        })
    }

    /// Render a single `Label: value` line, highlighting the focused field.
    pub(crate) fn build_line(&self, field: ReservationField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<empty>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Character count of the requested field, used to place the cursor.
    pub(crate) fn value_len(&self, field: ReservationField) -> usize {
        self.value(field).chars().count()
    }
}

/// State for the cancel confirmation dialog.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmCancel {
    pub(crate) id: i64,
}

/// Free-text prompt standing in for a mouse selection in the listing.
#[derive(Clone, Debug)]
pub(crate) struct SelectionPrompt {
    pub(crate) query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(form: &mut ReservationForm, field: ReservationField, text: &str) {
        form.focus(field);
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn new_form_prefills_date_and_time() {
        let form = ReservationForm::new("2024-05-01".into(), "08:00:00".into());
        assert_eq!(form.value(ReservationField::Date), "2024-05-01");
        assert_eq!(form.value(ReservationField::Time), "08:00:00");
        assert_eq!(form.value(ReservationField::BusNo), "");
        assert_eq!(form.active, ReservationField::BusNo);
    }

    #[test]
    fn parse_trims_fields_and_reads_count() {
        let mut form = ReservationForm::new("2024-05-01".into(), "08:00:00".into());
        type_into(&mut form, ReservationField::BusNo, " 12 ");
        type_into(&mut form, ReservationField::Route, "  Ring road");
        type_into(&mut form, ReservationField::PassengerCount, " 4 ");

        let reservation = form.parse_inputs(0).unwrap();
        assert_eq!(reservation.bus_no, "12");
        assert_eq!(reservation.route, "Ring road");
        assert_eq!(reservation.passenger_count, 4);
        assert_eq!(reservation.id, 0);
    }

    #[test]
    fn non_numeric_count_is_rejected_before_validation() {
        let mut form = ReservationForm::default();
        type_into(&mut form, ReservationField::PassengerCount, "four");
        assert_eq!(
            form.parse_inputs(0),
            Err(ValidationError::InvalidPassengerCount)
        );

        let empty = ReservationForm::default();
        assert_eq!(
            empty.parse_inputs(0),
            Err(ValidationError::InvalidPassengerCount)
        );
    }

    #[test]
    fn negative_count_parses_and_is_left_to_the_controller() {
        let mut form = ReservationForm::default();
        type_into(&mut form, ReservationField::PassengerCount, "-2");
        assert_eq!(form.parse_inputs(0).unwrap().passenger_count, -2);
    }

    #[test]
    fn from_reservation_round_trips_through_parse() {
        let original = Reservation {
            id: 8,
            bus_no: "3".into(),
            route: "Hill".into(),
            passenger_name: "Kim".into(),
            date: "2024-01-02".into(),
            time: "07:00:00".into(),
            start_location: "X".into(),
            end_location: "Y".into(),
            purpose: "Errand".into(),
            passenger_count: 6,
            vehicle_type: "Bus".into(),
        };
        let form = ReservationForm::from_reservation(&original);
        assert_eq!(form.parse_inputs(8).unwrap(), original);
    }

    #[test]
    fn focus_cycles_in_both_directions() {
        let mut form = ReservationForm::default();
        form.previous_field();
        assert_eq!(form.active, ReservationField::VehicleType);
        form.next_field();
        assert_eq!(form.active, ReservationField::BusNo);
        form.next_field();
        assert_eq!(form.active, ReservationField::Route);
    }

    #[test]
    fn backspace_edits_only_active_field() {
        let mut form = ReservationForm::default();
        type_into(&mut form, ReservationField::Route, "Ab");
        type_into(&mut form, ReservationField::Purpose, "Cd");
        form.backspace();
        assert_eq!(form.value(ReservationField::Purpose), "C");
        assert_eq!(form.value(ReservationField::Route), "Ab");
        assert!(!form.push_char('\u{7}'));
    }
}
