pub mod capture;
pub mod error;

pub use capture::{CompletionCapture, NOTE_MAX_CHARS};
pub use error::CompletionError;
