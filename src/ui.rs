//! Ratatui front-end: a numbered menu, one input form per action, and list
//! views for books, members and search results. All catalogue changes go
//! through the store and the loan engine; this layer only collects input and
//! reports outcomes.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::{App, Outcome};
pub use terminal::run_app;
