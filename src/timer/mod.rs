pub mod controller;
pub mod state;

pub use controller::{TimerController, TimerEvent, TimerSnapshot};
pub use state::{TickOutcome, TimerState, TimerStatus, DEFAULT_MINUTES, PRESET_MINUTES};
