use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// The menu actions that need input before they can run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormKind {
    AddBook,
    RegisterMember,
    BorrowBook,
    ReturnBook,
    SearchBook,
}

/// Static description of one input field.
pub(crate) struct FieldSpec {
    pub(crate) label: &'static str,
    pub(crate) numeric: bool,
}

const fn text(label: &'static str) -> FieldSpec {
    FieldSpec {
        label,
        numeric: false,
    }
}

const fn number(label: &'static str) -> FieldSpec {
    FieldSpec {
        label,
        numeric: true,
    }
}

const ADD_BOOK_FIELDS: &[FieldSpec] = &[number("Book id"), text("Title"), text("Author")];
const REGISTER_MEMBER_FIELDS: &[FieldSpec] = &[number("Member id"), text("Name")];
const BORROW_FIELDS: &[FieldSpec] = &[number("Member id"), number("Book id")];
const RETURN_FIELDS: &[FieldSpec] = &[number("Book id")];
const SEARCH_FIELDS: &[FieldSpec] = &[text("Keyword")];

impl FormKind {
    pub(crate) fn title(self) -> &'static str {
        match self {
            FormKind::AddBook => "Add Book",
            FormKind::RegisterMember => "Register Member",
            FormKind::BorrowBook => "Borrow Book",
            FormKind::ReturnBook => "Return Book",
            FormKind::SearchBook => "Search Book",
        }
    }

    pub(crate) fn fields(self) -> &'static [FieldSpec] {
        match self {
            FormKind::AddBook => ADD_BOOK_FIELDS,
            FormKind::RegisterMember => REGISTER_MEMBER_FIELDS,
            FormKind::BorrowBook => BORROW_FIELDS,
            FormKind::ReturnBook => RETURN_FIELDS,
            FormKind::SearchBook => SEARCH_FIELDS,
        }
    }
}

/// A parsed form, ready to hand to the store or the loan engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Request {
    AddBook {
        book_id: i64,
        title: String,
        author: String,
    },
    RegisterMember {
        member_id: i64,
        name: String,
    },
    BorrowBook {
        member_id: i64,
        book_id: i64,
    },
    ReturnBook {
        book_id: i64,
    },
    SearchBook {
        keyword: String,
    },
}

/// Input state for whichever action is being filled in.
#[derive(Clone)]
pub(crate) struct ActionForm {
    pub(crate) kind: FormKind,
    pub(crate) values: Vec<String>,
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl ActionForm {
    pub(crate) fn new(kind: FormKind) -> Self {
        Self {
            kind,
            values: vec![String::new(); kind.fields().len()],
            active: 0,
            error: None,
        }
    }

    pub(crate) fn is_last_field(&self) -> bool {
        self.active + 1 >= self.values.len()
    }

    pub(crate) fn next_field(&mut self) {
        self.active = (self.active + 1) % self.values.len();
    }

    pub(crate) fn prev_field(&mut self) {
        self.active = (self.active + self.values.len() - 1) % self.values.len();
    }

    /// Append a character to the active field. Numeric fields accept anything
    /// printable too; bad numbers are reported on submit so the user sees why.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.values.get_mut(self.active) {
            Some(value) => {
                value.push(ch);
                true
            }
            None => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(value) = self.values.get_mut(self.active) {
            value.pop();
        }
    }

    fn raw(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    fn integer(&self, index: usize) -> Result<i64> {
        let label = self
            .kind
            .fields()
            .get(index)
            .map(|field| field.label)
            .unwrap_or("Value");
        self.raw(index)
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow!("{label} must be a number."))
    }

    /// Turn the raw text into a typed request. Only numbers are checked here;
    /// emptiness of text fields is the store's call.
    pub(crate) fn parse_inputs(&self) -> Result<Request> {
        let request = match self.kind {
            FormKind::AddBook => Request::AddBook {
                book_id: self.integer(0)?,
                title: self.raw(1).to_string(),
                author: self.raw(2).to_string(),
            },
            FormKind::RegisterMember => Request::RegisterMember {
                member_id: self.integer(0)?,
                name: self.raw(1).to_string(),
            },
            FormKind::BorrowBook => Request::BorrowBook {
                member_id: self.integer(0)?,
                book_id: self.integer(1)?,
            },
            FormKind::ReturnBook => Request::ReturnBook {
                book_id: self.integer(0)?,
            },
            FormKind::SearchBook => Request::SearchBook {
                keyword: self.raw(0).to_string(),
            },
        };
        Ok(request)
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, index: usize) -> Line<'static> {
        let label = self
            .kind
            .fields()
            .get(index)
            .map(|field| field.label)
            .unwrap_or("");
        let value = self.raw(index);
        let is_active = self.active == index;

        let display = if value.is_empty() {
            "<required>".to_string()
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
            Span::raw(format!("{label}: ")),
            Span::styled(display, style),
        ])
    }

    /// Column offset of the cursor on the active line.
    pub(crate) fn cursor_offset(&self) -> usize {
        let label = self
            .kind
            .fields()
            .get(self.active)
            .map(|field| field.label)
            .unwrap_or("");
        label.chars().count() + 2 + self.raw(self.active).chars().count()
    }
}
