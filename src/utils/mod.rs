pub mod format;
pub mod logging;

pub use format::{format_clock, format_duration};
