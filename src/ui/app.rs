use std::mem;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use crossterm::event::KeyCode;
use log::{error, warn};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::loans::{borrow_book, return_book};
use crate::storage::save_all;
use crate::store::EntityStore;

use super::forms::{ActionForm, FormKind, Request};
use super::helpers::{centered_rect, columns};
use super::screens::ListScreen;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Menu entries in display order; the number typed is the position plus one.
const MENU_ITEMS: [&str; 8] = [
    "Add Book",
    "List Books",
    "Register Member",
    "List Members",
    "Borrow Book",
    "Return Book",
    "Search Book",
    "Save & Exit",
];
const PROMPT: &str = "Choose an option (1-8): ";

/// What the user is looking at.
enum Screen {
    Menu,
    List(ListScreen),
}

/// Modal state layered over the current screen.
enum Mode {
    Normal,
    Form(ActionForm),
    /// Saving failed; ask before leaving without it.
    ConfirmDiscard,
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Saved,
    Discarded,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state: the catalogue plus whatever the menu is doing
/// with it.
pub struct App {
    store: EntityStore,
    /// Where Save & Exit writes the three resource files.
    data_dir: PathBuf,
    screen: Screen,
    mode: Mode,
    /// Characters typed at the menu prompt, not yet submitted.
    prompt: String,
    status: Option<StatusMessage>,
    outcome: Option<Outcome>,
}

impl App {
    pub fn new(store: EntityStore, data_dir: PathBuf) -> Self {
        Self {
            store,
            data_dir,
            screen: Screen::Menu,
            mode: Mode::Normal,
            prompt: String::new(),
            status: None,
            outcome: None,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Set once the loop has ended.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Top-level key dispatcher. Each mode handler returns the next mode; the
    /// boolean result tells the outer loop whether to stop.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Form(form) => self.handle_form(code, form),
            Mode::ConfirmDiscard => self.handle_confirm_discard(code, &mut exit),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        if matches!(self.screen, Screen::List(_)) {
            self.handle_list_key(code);
            return Mode::Normal;
        }

        match code {
            KeyCode::Enter => {
                let input = mem::take(&mut self.prompt);
                self.clear_status();
                return self.submit_choice(input.trim(), exit);
            }
            KeyCode::Backspace => {
                self.prompt.pop();
            }
            KeyCode::Esc => self.prompt.clear(),
            KeyCode::Char(ch) if !ch.is_control() => self.prompt.push(ch),
            _ => {}
        }
        Mode::Normal
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            self.screen = Screen::Menu;
            return;
        }
        let Screen::List(list) = &mut self.screen else {
            return;
        };
        match code {
            KeyCode::Up => list.move_selection(-1),
            KeyCode::Down => list.move_selection(1),
            KeyCode::PageUp => list.move_selection(-10),
            KeyCode::PageDown => list.move_selection(10),
            KeyCode::Home => list.select_first(),
            KeyCode::End => list.select_last(),
            _ => {}
        }
    }

    /// Route a submitted menu selection.
    fn submit_choice(&mut self, input: &str, exit: &mut bool) -> Mode {
        let choice = match input.parse::<i64>() {
            Ok(choice) => choice,
            Err(_) => {
                self.set_status("Please enter a number.", StatusKind::Error);
                return Mode::Normal;
            }
        };

        let mode = match choice {
            1 => Mode::Form(ActionForm::new(FormKind::AddBook)),
            2 => {
                self.open_book_list();
                Mode::Normal
            }
            3 => Mode::Form(ActionForm::new(FormKind::RegisterMember)),
            4 => {
                self.open_member_list();
                Mode::Normal
            }
            5 => Mode::Form(ActionForm::new(FormKind::BorrowBook)),
            6 => Mode::Form(ActionForm::new(FormKind::ReturnBook)),
            7 => Mode::Form(ActionForm::new(FormKind::SearchBook)),
            8 => self.save_and_exit(exit),
            _ => {
                self.set_status("Invalid option. Choose 1-8.", StatusKind::Error);
                Mode::Normal
            }
        };
        mode
    }

    fn handle_form(&mut self, code: KeyCode, mut form: ActionForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status(format!("{} cancelled.", form.kind.title()), StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter if !form.is_last_field() => form.next_field(),
            KeyCode::Enter => match self.submit_form(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = err.to_string();
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::Form(form)
        } else {
            Mode::Normal
        }
    }

    /// Run the action behind a completed form. Any error leaves the form open
    /// so the user can correct it.
    fn submit_form(&mut self, form: &ActionForm) -> Result<()> {
        match form.parse_inputs()? {
            Request::AddBook {
                book_id,
                title,
                author,
            } => {
                self.store.add_book(book_id, &title, &author)?;
                self.set_status("Book added successfully!", StatusKind::Info);
            }
            Request::RegisterMember { member_id, name } => {
                self.store.add_member(member_id, &name)?;
                self.set_status("Member registered successfully!", StatusKind::Info);
            }
            Request::BorrowBook { member_id, book_id } => {
                let today = Local::now().date_naive();
                let loan = borrow_book(&mut self.store, member_id, book_id, today)?;
                self.set_status(
                    format!("Book borrowed successfully! (loan {})", loan.loan_id),
                    StatusKind::Info,
                );
            }
            Request::ReturnBook { book_id } => {
                return_book(&mut self.store, book_id)?;
                self.set_status("Book returned successfully!", StatusKind::Info);
            }
            Request::SearchBook { keyword } => {
                let results = self.store.search_books(&keyword)?;
                if results.is_empty() {
                    self.set_status("No matching books found.", StatusKind::Info);
                } else {
                    let count = results.len();
                    self.screen = Screen::List(ListScreen::books("Search Results", results));
                    self.set_status(
                        format!("{count} matching book(s) for \"{}\".", keyword.trim()),
                        StatusKind::Info,
                    );
                }
            }
        }
        Ok(())
    }

    fn handle_confirm_discard(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                warn!("exiting without saving");
                self.outcome = Some(Outcome::Discarded);
                *exit = true;
                Mode::Normal
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status(
                    "Changes kept in memory. Choose 8 to try saving again.",
                    StatusKind::Info,
                );
                Mode::Normal
            }
            _ => Mode::ConfirmDiscard,
        }
    }

    fn save_and_exit(&mut self, exit: &mut bool) -> Mode {
        match save_all(&self.data_dir, &self.store) {
            Ok(()) => {
                self.outcome = Some(Outcome::Saved);
                *exit = true;
                Mode::Normal
            }
            Err(err) => {
                error!("{err}");
                self.set_status(err.to_string(), StatusKind::Error);
                Mode::ConfirmDiscard
            }
        }
    }

    fn open_book_list(&mut self) {
        if self.store.books().is_empty() {
            self.set_status("No books found.", StatusKind::Info);
        } else {
            self.screen = Screen::List(ListScreen::books("Books List", self.store.books()));
        }
    }

    fn open_member_list(&mut self) {
        if self.store.members().is_empty() {
            self.set_status("No members found.", StatusKind::Info);
        } else {
            self.screen = Screen::List(ListScreen::members("Members List", self.store.members()));
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
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

        match &self.screen {
            Screen::Menu => self.draw_menu(frame, content_area),
            Screen::List(list) => self.draw_list(frame, content_area, list),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Form(form) => self.draw_form(frame, area, form),
            Mode::ConfirmDiscard => self.draw_confirm_discard(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Mini Library System")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let number_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut lines: Vec<Line> = MENU_ITEMS
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                Line::from(vec![
                    Span::styled(format!("{})", idx + 1), number_style),
                    Span::raw(format!(" {label}")),
                ])
            })
            .collect();

        let on_loan = self.store.loans().len();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "{} books ({} on loan) | {} members",
                self.store.books().len(),
                on_loan,
                self.store.members().len()
            ),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
        let prompt_row = lines.len();
        lines.push(Line::from(vec![
            Span::raw(PROMPT),
            Span::styled(self.prompt.clone(), Style::default().fg(Color::Yellow)),
        ]));

        frame.render_widget(Paragraph::new(lines), inner);

        if matches!(self.mode, Mode::Normal) && inner.height > columns(prompt_row) {
            let cursor_x = inner.x + columns(PROMPT.len() + self.prompt.chars().count());
            frame.set_cursor_position((cursor_x, inner.y + columns(prompt_row)));
        }
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect, list: &ListScreen) {
        let items: Vec<ListItem> = list
            .rows
            .iter()
            .map(|row| ListItem::new(row.clone()))
            .collect();
        let widget = List::new(items)
            .block(
                Block::default()
                    .title(format!("{} ({})", list.title, list.rows.len()))
                    .borders(Borders::ALL),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        state.select(Some(list.selected));
        frame.render_stateful_widget(widget, area, &mut state);
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

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::Form(_)) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Next/Submit   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::ConfirmDiscard) => Line::from(vec![
                Span::styled("[y]", key_style),
                Span::raw(" Exit without saving   "),
                Span::styled("[n]", key_style),
                Span::raw(" Back to menu"),
            ]),
            (Screen::List(_), _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Scroll   "),
                Span::styled("[Enter/Esc]", key_style),
                Span::raw(" Back to menu"),
            ]),
            (Screen::Menu, _) => Line::from(vec![
                Span::styled("[1-8]", key_style),
                Span::raw(" Type an option   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Select"),
            ]),
        }
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &ActionForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(form.kind.title())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = (0..form.values.len())
            .map(|index| form.build_line(index))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            let hint = if form.is_last_field() {
                "Enter to submit • Tab to switch • Esc to cancel"
            } else {
                "Enter for next field • Tab to switch • Esc to cancel"
            };
            lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let cursor_x = inner.x + columns(form.cursor_offset());
        let cursor_y = inner.y + columns(form.active);
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_confirm_discard(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Save failed")
            .borders(Borders::ALL);
        let text = vec![
            Line::from("The catalogue could not be saved."),
            Line::from(""),
            Line::from("Exit without saving? (y/n)"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::models::BookStatus;

    fn new_app() -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let app = App::new(EntityStore::new(), dir.path().join("data"));
        (app, dir)
    }

    fn type_text(app: &mut App, text: &str) -> bool {
        let mut exit = false;
        for ch in text.chars() {
            exit |= app.handle_key(KeyCode::Char(ch));
        }
        exit
    }

    fn enter(app: &mut App) -> bool {
        app.handle_key(KeyCode::Enter)
    }

    /// Pick a menu option and fill every field of the form it opens.
    fn run_action(app: &mut App, choice: &str, fields: &[&str]) -> bool {
        type_text(app, choice);
        let mut exit = enter(app);
        for field in fields {
            type_text(app, field);
            exit |= enter(app);
        }
        exit
    }

    fn status(app: &App) -> Option<&str> {
        app.status.as_ref().map(|status| status.text.as_str())
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn non_numeric_choice_reprompts() {
        let (mut app, _dir) = new_app();
        assert!(!run_action(&mut app, "abc", &[]));
        assert_eq!(status(&app), Some("Please enter a number."));
        assert!(matches!(app.screen, Screen::Menu));
        assert!(matches!(app.mode, Mode::Normal));
        assert!(app.prompt.is_empty());
    }

    #[test]
    fn out_of_range_choice_is_invalid() {
        let (mut app, _dir) = new_app();
        run_action(&mut app, "9", &[]);
        assert_eq!(status(&app), Some("Invalid option. Choose 1-8."));
        run_action(&mut app, "0", &[]);
        assert_eq!(status(&app), Some("Invalid option. Choose 1-8."));
    }

    #[test]
    fn add_book_through_the_form() {
        let (mut app, _dir) = new_app();
        run_action(&mut app, "1", &["1", "Dune", "Herbert"]);

        assert_eq!(status(&app), Some("Book added successfully!"));
        assert!(matches!(app.mode, Mode::Normal));
        let book = app.store().find_book(1).unwrap();
        assert_eq!(book.status(), BookStatus::Available);
    }

    #[test]
    fn domain_errors_keep_the_form_open() {
        let (mut app, _dir) = new_app();
        run_action(&mut app, "1", &["1", "Dune", "Herbert"]);
        run_action(&mut app, "1", &["1", "Emma", "Austen"]);

        assert_eq!(status(&app), Some("Book ID 1 already exists."));
        match &app.mode {
            Mode::Form(form) => {
                assert_eq!(form.kind, FormKind::AddBook);
                assert_eq!(form.error.as_deref(), Some("Book ID 1 already exists."));
            }
            _ => panic!("form should stay open"),
        }

        app.handle_key(KeyCode::Esc);
        assert_eq!(status(&app), Some("Add Book cancelled."));
        assert_eq!(app.store().books().len(), 1);
    }

    #[test]
    fn bad_number_in_a_form_is_reported() {
        let (mut app, _dir) = new_app();
        run_action(&mut app, "6", &["six"]);
        assert_eq!(status(&app), Some("Book id must be a number."));
        assert!(matches!(app.mode, Mode::Form(_)));
    }

    #[test]
    fn borrow_and_return_cycle() {
        let (mut app, _dir) = new_app();
        run_action(&mut app, "1", &["1", "Dune", "Herbert"]);
        run_action(&mut app, "3", &["1", "Alice"]);
        assert_eq!(status(&app), Some("Member registered successfully!"));

        run_action(&mut app, "5", &["1", "1"]);
        assert_eq!(status(&app), Some("Book borrowed successfully! (loan 1)"));
        assert!(!app.store().find_book(1).unwrap().is_available);
        assert_eq!(app.store().loans()[0].date, Local::now().date_naive());

        app.handle_key(KeyCode::Esc);
        run_action(&mut app, "5", &["1", "1"]);
        assert_eq!(status(&app), Some("Book 1 is already borrowed."));
        app.handle_key(KeyCode::Esc);

        run_action(&mut app, "6", &["1"]);
        assert_eq!(status(&app), Some("Book returned successfully!"));
        assert!(app.store().loans().is_empty());

        run_action(&mut app, "6", &["1"]);
        assert_eq!(status(&app), Some("Book 1 is not currently borrowed."));
    }

    #[test]
    fn listing_empty_collections_reports_it() {
        let (mut app, _dir) = new_app();
        run_action(&mut app, "2", &[]);
        assert_eq!(status(&app), Some("No books found."));
        run_action(&mut app, "4", &[]);
        assert_eq!(status(&app), Some("No members found."));
        assert!(matches!(app.screen, Screen::Menu));
    }

    #[test]
    fn list_view_shows_rows_and_returns_to_menu() {
        let (mut app, _dir) = new_app();
        run_action(&mut app, "1", &["1", "Dune", "Herbert"]);
        run_action(&mut app, "2", &[]);

        let screen = render(&app);
        assert!(screen.contains("Books List (1)"));
        assert!(screen.contains("ID: 1 | Title: Dune | Author: Herbert | Status: Available"));

        app.handle_key(KeyCode::Esc);
        assert!(matches!(app.screen, Screen::Menu));
    }

    #[test]
    fn search_opens_results_or_reports_none() {
        let (mut app, _dir) = new_app();
        run_action(&mut app, "1", &["1", "Dune", "Herbert"]);

        run_action(&mut app, "7", &["dune"]);
        match &app.screen {
            Screen::List(list) => {
                assert_eq!(list.title, "Search Results");
                assert_eq!(list.rows.len(), 1);
            }
            Screen::Menu => panic!("expected search results"),
        }
        enter(&mut app);

        run_action(&mut app, "7", &["tolstoy"]);
        assert_eq!(status(&app), Some("No matching books found."));

        run_action(&mut app, "7", &["  "]);
        assert_eq!(status(&app), Some("Keyword cannot be empty."));
    }

    #[test]
    fn save_and_exit_writes_the_catalogue() {
        let (mut app, _dir) = new_app();
        run_action(&mut app, "1", &["1", "Dune", "Herbert"]);

        assert!(run_action(&mut app, "8", &[]));
        assert_eq!(app.outcome(), Some(Outcome::Saved));
        let books = fs::read_to_string(app.data_dir.join("books.json")).unwrap();
        assert!(books.contains("\"title\": \"Dune\""));
    }

    #[test]
    fn failed_save_asks_before_discarding() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let mut app = App::new(EntityStore::new(), blocker);

        assert!(!run_action(&mut app, "8", &[]));
        assert!(matches!(app.mode, Mode::ConfirmDiscard));
        assert!(render(&app).contains("Exit without saving? (y/n)"));

        app.handle_key(KeyCode::Char('n'));
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.outcome(), None);

        run_action(&mut app, "8", &[]);
        assert!(app.handle_key(KeyCode::Char('y')));
        assert_eq!(app.outcome(), Some(Outcome::Discarded));
    }

    #[test]
    fn menu_lists_all_actions() {
        let (mut app, _dir) = new_app();
        type_text(&mut app, "4");
        let screen = render(&app);
        assert!(screen.contains("Mini Library System"));
        for label in MENU_ITEMS {
            assert!(screen.contains(label), "missing {label}");
        }
        assert!(screen.contains("Choose an option (1-8): 4"));
    }
}
