//! Error types whose messages are shown to the user as-is.

use thiserror::Error;

/// Input problems reported back to the user. The `Display` text is shown
/// verbatim, so keep it phrased for people rather than logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Bus No must contain only numbers.")]
    InvalidBusNo,
    #[error("Number of passengers must be greater than 0.")]
    NonPositivePassengerCount,
    /// Raised by the form before anything reaches the controller.
    #[error("No. of Passengers must be a valid number.")]
    InvalidPassengerCount,
}

/// Why a text selection in the listing could not be turned into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Nothing is selected.")]
    Empty,
    #[error("Could not find selected reservation")]
    NoMatchingLine,
    #[error("Could not read reservation ID")]
    UnreadableId,
}
