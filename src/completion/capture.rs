use chrono::NaiveDate;

use crate::{
    models::{Book, NewReadingCompletion},
    timer::{TimerState, TimerStatus},
};

pub const NOTE_MAX_CHARS: usize = 500;

/// Note draft and book for a finished session, waiting to be saved or skipped.
#[derive(Debug, Clone)]
pub struct CompletionCapture {
    session_id: String,
    duration_minutes: u32,
    book: Option<Book>,
    note: String,
    saving: bool,
}

impl CompletionCapture {
    /// `None` unless the timer has reached `Completed`.
    pub fn open(state: &TimerState, book: Option<Book>) -> Option<Self> {
        if state.status != TimerStatus::Completed {
            return None;
        }
        Some(Self {
            session_id: state.session_id.clone().unwrap_or_default(),
            duration_minutes: state.selected_minutes().max(1),
            book,
            note: String::new(),
            saving: false,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn book(&self) -> Option<&Book> {
        self.book.as_ref()
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Replaces the draft, keeping at most [`NOTE_MAX_CHARS`] characters.
    /// Returns true if the input was cut.
    pub fn set_note(&mut self, text: &str) -> bool {
        match text.char_indices().nth(NOTE_MAX_CHARS) {
            Some((cut, _)) => {
                self.note = text[..cut].to_string();
                true
            }
            None => {
                self.note = text.to_string();
                false
            }
        }
    }

    pub(crate) fn set_book(&mut self, book: Option<Book>) {
        self.book = book;
    }

    pub(crate) fn mark_saving(&mut self, saving: bool) {
        self.saving = saving;
    }

    pub fn to_request(&self, date: NaiveDate) -> NewReadingCompletion {
        let note = self.note.trim();
        NewReadingCompletion {
            date,
            duration_minutes: self.duration_minutes,
            book_id: self.book.as_ref().map(|book| book.id),
            note: (!note.is_empty()).then(|| note.to_string()),
        }
    }
}
