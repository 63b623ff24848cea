//! The "Reserved Buses" panel is plain text: one line per reservation. Edit
//! and cancel work backwards from that text, so the helpers here both render
//! the lines and recover an id from a selected fragment.

use crate::error::SelectionError;
use crate::models::Reservation;

/// Render every reservation as its own newline-terminated line.
pub(crate) fn render_listing(reservations: &[Reservation]) -> String {
    let mut text = String::new();
    for reservation in reservations {
        text.push_str(&reservation.to_string());
        text.push('\n');
    }
    text
}

/// Return the index and text of the first line containing `selection`. A
/// fragment that also appears in an earlier line resolves to that line.
pub(crate) fn locate_line<'a>(text: &'a str, selection: &str) -> Option<(usize, &'a str)> {
    text.split('\n')
        .enumerate()
        .find(|(_, line)| line.contains(selection))
}

/// Read the id out of the leading `ID: n` field of a rendered line.
pub(crate) fn parse_reservation_id(line: &str) -> Result<i64, SelectionError> {
    let first_field = line.split('|').next().unwrap_or_default();
    let raw = first_field
        .split(':')
        .nth(1)
        .ok_or(SelectionError::UnreadableId)?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| SelectionError::UnreadableId)
}

/// Full selection contract: find the containing line, then parse its id.
pub(crate) fn resolve_selection(text: &str, selection: &str) -> Result<i64, SelectionError> {
    if selection.is_empty() {
        return Err(SelectionError::Empty);
    }
    let (_, line) = locate_line(text, selection).ok_or(SelectionError::NoMatchingLine)?;
    parse_reservation_id(line)
}
