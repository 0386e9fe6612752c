use crate::models::{Book, Member};

/// A read-only, scrollable list of pre-formatted rows (books, members or
/// search hits).
pub(crate) struct ListScreen {
    pub(crate) title: String,
    pub(crate) rows: Vec<String>,
    pub(crate) selected: usize,
}

impl ListScreen {
    pub(crate) fn new(title: impl Into<String>, rows: Vec<String>) -> Self {
        Self {
            title: title.into(),
            rows,
            selected: 0,
        }
    }

    pub(crate) fn books<'a>(title: &str, books: impl IntoIterator<Item = &'a Book>) -> Self {
        Self::new(title, books.into_iter().map(Book::to_string).collect())
    }

    pub(crate) fn members<'a>(title: &str, members: impl IntoIterator<Item = &'a Member>) -> Self {
        Self::new(title, members.into_iter().map(Member::to_string).collect())
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.rows.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.rows.len() - 1;
        self.selected = self.selected.saturating_add_signed(offset).min(last);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }
}
