use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::debug;

use crate::controller::ReservationController;
use crate::db::ReservationStore;
use crate::error::SelectionError;
use crate::models::Reservation;

use super::forms::{ConfirmCancel, ReservationField, ReservationForm, SelectionPrompt};
use super::helpers::{centered_rect, step_index};
use super::listing::{locate_line, render_listing, resolve_selection};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp / PageDown in the listing.
const PAGE_STEP: isize = 10;

/// Modal state layered over the listing.
enum Mode {
    Normal,
    Reserving(ReservationForm),
    Editing { id: i64, form: ReservationForm },
    ConfirmCancel(ConfirmCancel),
    Selecting(SelectionPrompt),
}

/// Which button the selection is feeding, used only for wording.
#[derive(Copy, Clone)]
enum SelectionAction {
    Edit,
    Cancel,
}

impl SelectionAction {
    fn verb(self) -> &'static str {
        match self {
            SelectionAction::Edit => "edit",
            SelectionAction::Cancel => "cancel",
        }
    }
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state for the reservation screen.
pub struct App<S> {
    controller: ReservationController<S>,
    reservations: Vec<Reservation>,
    /// Text of the "Reserved Buses" panel exactly as rendered.
    listing: String,
    /// Highlighted line in the listing.
    selected: usize,
    /// Fragment typed through the selection prompt. Takes precedence over the
    /// highlighted line until the cursor moves.
    typed_selection: Option<String>,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl<S: ReservationStore> App<S> {
    pub fn new(controller: ReservationController<S>) -> Self {
        let mut app = Self {
            controller,
            reservations: Vec::new(),
            listing: String::new(),
            selected: 0,
            typed_selection: None,
            mode: Mode::Normal,
            status: None,
        };
        app.refresh_reservations(None);
        app
    }

    /// Dispatch a key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Reserving(form) => self.handle_reserve(code, form),
            Mode::Editing { id, form } => self.handle_edit(code, id, form),
            Mode::ConfirmCancel(confirm) => self.handle_confirm_cancel(code, confirm),
            Mode::Selecting(prompt) => self.handle_selecting(code, prompt),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.typed_selection.take().is_some() {
                    self.set_status("Selection cleared.", StatusKind::Info);
                } else {
                    *exit = true;
                }
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.move_selection(isize::MIN / 2),
            KeyCode::End => self.move_selection(isize::MAX / 2),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('+') => {
                self.clear_status();
                return Mode::Reserving(self.blank_form());
            }
            KeyCode::Char('e') | KeyCode::Char('E') => return self.begin_edit(),
            KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Char('-') => {
                return self.begin_cancel()
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.refresh_reservations(None);
                self.set_status("Reservations refreshed.", StatusKind::Info);
            }
            KeyCode::Char('/') => {
                self.clear_status();
                return Mode::Selecting(SelectionPrompt {
                    query: String::new(),
                });
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_reserve(&mut self, code: KeyCode, mut form: ReservationForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Reservation discarded.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Enter => return self.submit_reservation(form),
            code => edit_form(&mut form, code),
        }
        Mode::Reserving(form)
    }

    /// Parse the form, hand it to the controller, and report the outcome. The
    /// form is cleared whatever the controller says; it only stays open when
    /// the reservation was not stored.
    fn submit_reservation(&mut self, mut form: ReservationForm) -> Mode {
        let mut reservation = match form.parse_inputs(0) {
            Ok(reservation) => reservation,
            Err(err) => {
                let message = err.to_string();
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                return Mode::Reserving(form);
            }
        };

        let message = self.controller.create_reservation(&mut reservation);
        let stored = reservation.id > 0;
        self.refresh_reservations(stored.then_some(reservation.id));

        if stored {
            self.set_status(message, StatusKind::Info);
            Mode::Normal
        } else {
            let mut fresh = self.blank_form();
            fresh.error = Some(message.clone());
            self.set_status(message, StatusKind::Error);
            Mode::Reserving(fresh)
        }
    }

    fn handle_edit(&mut self, code: KeyCode, id: i64, mut form: ReservationForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Enter => match form.parse_inputs(id) {
                Ok(reservation) => {
                    if self.controller.update_reservation(&reservation) {
                        self.refresh_reservations(Some(id));
                        self.set_status("Reservation updated successfully!", StatusKind::Info);
                        return Mode::Normal;
                    }
                    form.error = Some("Failed to update reservation".to_string());
                    self.set_status("Failed to update reservation", StatusKind::Error);
                }
                Err(err) => {
                    let message = err.to_string();
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            code => edit_form(&mut form, code),
        }
        Mode::Editing { id, form }
    }

    fn handle_confirm_cancel(&mut self, code: KeyCode, confirm: ConfirmCancel) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if self.controller.cancel_reservation(confirm.id) {
                    self.refresh_reservations(None);
                    self.set_status("Reservation cancelled successfully!", StatusKind::Info);
                } else {
                    self.set_status("Failed to cancel reservation", StatusKind::Error);
                }
                Mode::Normal
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Reservation kept.", StatusKind::Info);
                Mode::Normal
            }
            _ => Mode::ConfirmCancel(confirm),
        }
    }

    fn handle_selecting(&mut self, code: KeyCode, mut prompt: SelectionPrompt) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Enter => {
                self.apply_typed_selection(prompt.query);
                return Mode::Normal;
            }
            KeyCode::Backspace => {
                prompt.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => prompt.query.push(ch),
            _ => {}
        }
        Mode::Selecting(prompt)
    }

    /// Store a typed fragment as the active selection and move the highlight
    /// to the line it resolves to.
    fn apply_typed_selection(&mut self, query: String) {
        if query.is_empty() {
            self.typed_selection = None;
            self.clear_status();
            return;
        }
        let found = locate_line(&self.listing, &query).map(|(index, _)| index);
        match found {
            Some(index) if index < self.reservations.len() => {
                self.selected = index;
                self.set_status(format!("Selected \"{query}\"."), StatusKind::Info);
            }
            _ => self.set_status(
                format!("\"{query}\" does not appear in the list."),
                StatusKind::Warning,
            ),
        }
        self.typed_selection = Some(query);
    }

    /// The text that edit/cancel act on: a typed fragment if there is one,
    /// otherwise the highlighted line.
    fn current_selection(&self) -> Option<String> {
        if let Some(query) = &self.typed_selection {
            return Some(query.clone());
        }
        self.listing
            .lines()
            .nth(self.selected)
            .map(|line| line.to_string())
    }

    fn selected_id(&mut self, action: SelectionAction) -> Option<i64> {
        let selection = self.current_selection().unwrap_or_default();
        match resolve_selection(&self.listing, &selection) {
            Ok(id) => Some(id),
            Err(SelectionError::Empty) => {
                self.set_status(
                    format!("Please select a reservation to {}", action.verb()),
                    StatusKind::Warning,
                );
                None
            }
            Err(err) => {
                debug!(%selection, error = %err, "selection did not resolve");
                self.set_status(err.to_string(), StatusKind::Error);
                None
            }
        }
    }

    fn begin_edit(&mut self) -> Mode {
        let Some(id) = self.selected_id(SelectionAction::Edit) else {
            return Mode::Normal;
        };
        match self.controller.find_reservation_by_id(id) {
            Some(reservation) => {
                self.clear_status();
                Mode::Editing {
                    id,
                    form: ReservationForm::from_reservation(&reservation),
                }
            }
            None => {
                self.set_status("Reservation not found in database", StatusKind::Error);
                Mode::Normal
            }
        }
    }

    fn begin_cancel(&mut self) -> Mode {
        match self.selected_id(SelectionAction::Cancel) {
            Some(id) => {
                self.clear_status();
                Mode::ConfirmCancel(ConfirmCancel { id })
            }
            None => Mode::Normal,
        }
    }

    fn blank_form(&self) -> ReservationForm {
        ReservationForm::new(self.controller.current_date(), self.controller.current_time())
    }

    /// Reload from the controller and re-render the listing text. When
    /// `focus_id` is present the highlight jumps to that reservation.
    fn refresh_reservations(&mut self, focus_id: Option<i64>) {
        self.reservations = self.controller.get_all_reservations();
        self.listing = render_listing(&self.reservations);
        self.typed_selection = None;

        if let Some(id) = focus_id {
            if let Some(index) = self.reservations.iter().position(|r| r.id == id) {
                self.selected = index;
                return;
            }
        }
        self.selected = step_index(self.selected, 0, self.reservations.len());
    }

    fn move_selection(&mut self, offset: isize) {
        self.typed_selection = None;
        self.selected = step_index(self.selected, offset, self.reservations.len());
    }

    fn set_status<T: Into<String>>(&mut self, text: T, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_listing(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Reserving(form) => self.draw_form(frame, area, "Reserve Bus", form),
            Mode::Editing { id, form } => {
                self.draw_form(frame, area, &format!("Edit Reservation #{id}"), form)
            }
            Mode::ConfirmCancel(confirm) => self.draw_confirm_cancel(frame, area, confirm),
            Mode::Selecting(prompt) => self.draw_selection_prompt(frame, area, prompt),
            Mode::Normal => {}
        }
    }

    fn draw_listing(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Reserved Buses")
            .borders(Borders::ALL);

        if self.reservations.is_empty() {
            let message = Paragraph::new("No reservations yet. Press 'n' to reserve a bus.")
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let fragment = self.typed_selection.as_deref();
        let items: Vec<ListItem> = self
            .listing
            .lines()
            .map(|line| match fragment {
                Some(fragment) if !fragment.is_empty() && line.contains(fragment) => {
                    ListItem::new(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::Cyan),
                    )))
                }
                _ => ListItem::new(line.to_string()),
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::Reserving(_) | Mode::Editing { .. } => Line::from(vec![
                Span::styled("[Tab/↑↓]", key_style),
                Span::raw(" Field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Close"),
            ]),
            Mode::ConfirmCancel(_) => Line::from(vec![
                Span::styled("[Y]", key_style),
                Span::raw(" Cancel reservation   "),
                Span::styled("[N/Esc]", key_style),
                Span::raw(" Keep"),
            ]),
            Mode::Selecting(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back"),
            ]),
            Mode::Normal => Line::from(vec![
                Span::styled("[n]", key_style),
                Span::raw(" Reserve Bus   "),
                Span::styled("[e]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[c]", key_style),
                Span::raw(" Cancel   "),
                Span::styled("[r]", key_style),
                Span::raw(" Refresh   "),
                Span::styled("[/]", key_style),
                Span::raw(" Select text   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &ReservationForm) {
        let popup_area = centered_rect(70, 70, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = ReservationField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, inner);

        let row = ReservationField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = format!("{}: ", form.active.label()).chars().count();
        let cursor_x = cursor_column(inner, prefix + form.value_len(form.active));
        let cursor_y = inner.y.saturating_add(row);
        if cursor_y < inner.bottom() {
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }

    fn draw_confirm_cancel(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmCancel) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Cancellation")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Are you sure you want to cancel reservation #{}?",
                confirm.id
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to keep it.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_selection_prompt(&self, frame: &mut Frame, area: Rect, prompt: &SelectionPrompt) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Select Text");
        let paragraph = Paragraph::new(Span::raw(format!("Select: {}", prompt.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = cursor_column(inner, "Select: ".len() + prompt.query.chars().count());
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

/// Column for a cursor `offset` characters into `inner`, pinned to its last
/// cell when the text runs past the edge.
fn cursor_column(inner: Rect, offset: usize) -> u16 {
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    inner
        .x
        .saturating_add(offset)
        .min(inner.right().saturating_sub(1))
}

/// Keys shared by the reserve and edit dialogs.
fn edit_form(form: &mut ReservationForm, code: KeyCode) {
    match code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.previous_field(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(ch) => {
            if form.push_char(ch) {
                form.error = None;
            }
        }
        _ => {}
    }
}
