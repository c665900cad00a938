use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SECS_PER_MINUTE: u64 = 60;
pub const DEFAULT_MINUTES: u32 = 10;
/// Minute choices the shell offers on the selection screen.
pub const PRESET_MINUTES: [u32; 4] = [5, 10, 15, 30];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

/// Result of applying one tick to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Skipped,
    Counted { remaining_secs: u64 },
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub session_id: Option<String>,
    pub selected_secs: u64,
    pub remaining_secs: u64,
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            status: TimerStatus::Idle,
            session_id: None,
            selected_secs: u64::from(DEFAULT_MINUTES) * SECS_PER_MINUTE,
            remaining_secs: 0,
            started_at: None,
        }
    }
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_minutes(&self) -> u32 {
        (self.selected_secs / SECS_PER_MINUTE) as u32
    }

    /// Percentage of the selected duration already read.
    pub fn progress(&self) -> f64 {
        if self.selected_secs == 0 {
            return 0.0;
        }
        let elapsed = self.selected_secs.saturating_sub(self.remaining_secs);
        elapsed as f64 / self.selected_secs as f64 * 100.0
    }

    /// Returns false unless idle and `minutes > 0`.
    pub fn select_duration(&mut self, minutes: u32) -> bool {
        if self.status != TimerStatus::Idle || minutes == 0 {
            return false;
        }
        self.selected_secs = u64::from(minutes) * SECS_PER_MINUTE;
        true
    }

    pub fn begin_session(&mut self, session_id: String, started_at: DateTime<Utc>) -> bool {
        if self.status != TimerStatus::Idle || self.selected_secs == 0 {
            return false;
        }
        self.status = TimerStatus::Running;
        self.session_id = Some(session_id);
        self.remaining_secs = self.selected_secs;
        self.started_at = Some(started_at);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.status != TimerStatus::Running {
            return false;
        }
        self.status = TimerStatus::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.status != TimerStatus::Paused {
            return false;
        }
        self.status = TimerStatus::Running;
        true
    }

    /// Back to idle from any state. The selected duration survives.
    pub fn reset(&mut self) {
        *self = Self {
            selected_secs: self.selected_secs,
            ..Self::default()
        };
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.status != TimerStatus::Running {
            return TickOutcome::Skipped;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.status = TimerStatus::Completed;
            TickOutcome::Completed
        } else {
            TickOutcome::Counted {
                remaining_secs: self.remaining_secs,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(minutes: u32) -> TimerState {
        let mut state = TimerState::new();
        assert!(state.select_duration(minutes));
        assert!(state.begin_session("s-1".into(), Utc::now()));
        state
    }

    #[test]
    fn select_converts_minutes_to_seconds() {
        let mut state = TimerState::new();
        assert!(state.select_duration(5));
        assert_eq!(state.selected_secs, 300);
        assert_eq!(state.selected_minutes(), 5);
    }

    #[test]
    fn select_rejected_outside_idle_or_for_zero() {
        let mut state = TimerState::new();
        assert!(!state.select_duration(0));

        let mut state = running(5);
        assert!(!state.select_duration(15));
        assert_eq!(state.selected_secs, 300);
    }

    #[test]
    fn begin_fills_remaining_from_selection() {
        let state = running(10);
        assert_eq!(state.status, TimerStatus::Running);
        assert_eq!(state.remaining_secs, 600);
        assert!(state.session_id.is_some());
    }

    #[test]
    fn ticking_down_completes_once() {
        let mut state = running(1);
        let mut last = state.remaining_secs;
        let mut completions = 0;

        for _ in 0..60 {
            match state.tick() {
                TickOutcome::Counted { remaining_secs } => {
                    assert!(remaining_secs < last);
                    last = remaining_secs;
                }
                TickOutcome::Completed => completions += 1,
                TickOutcome::Skipped => panic!("running timer skipped a tick"),
            }
        }

        assert_eq!(completions, 1);
        assert_eq!(state.remaining_secs, 0);
        assert_eq!(state.status, TimerStatus::Completed);
        assert_eq!(state.tick(), TickOutcome::Skipped);
    }

    #[test]
    fn paused_ticks_do_not_count() {
        let mut state = running(10);
        state.tick();
        assert!(state.pause());
        assert_eq!(state.tick(), TickOutcome::Skipped);
        assert_eq!(state.remaining_secs, 599);
        assert!(state.resume());
        assert_eq!(state.remaining_secs, 599);
        assert_eq!(state.tick(), TickOutcome::Counted { remaining_secs: 598 });
    }

    #[test]
    fn pause_and_resume_only_from_their_source_states() {
        let mut state = TimerState::new();
        assert!(!state.pause());
        assert!(!state.resume());

        let mut state = running(5);
        assert!(!state.resume());
        assert!(state.pause());
        assert!(!state.pause());
    }

    #[test]
    fn reset_from_every_state_returns_to_idle() {
        let mut idle = TimerState::new();
        let mut run = running(5);
        let mut paused = running(5);
        paused.pause();
        let mut done = running(1);
        for _ in 0..60 {
            done.tick();
        }

        for state in [&mut idle, &mut run, &mut paused, &mut done] {
            state.reset();
            assert_eq!(state.status, TimerStatus::Idle);
            assert_eq!(state.remaining_secs, 0);
            assert!(state.session_id.is_none());
        }
        assert_eq!(run.selected_secs, 300);
    }

    #[test]
    fn progress_spans_zero_to_hundred() {
        let mut state = running(5);
        assert_eq!(state.progress(), 0.0);

        for _ in 0..150 {
            state.tick();
        }
        assert!((state.progress() - 50.0).abs() < f64::EPSILON);

        for _ in 0..150 {
            state.tick();
        }
        assert_eq!(state.progress(), 100.0);
    }

    #[test]
    fn progress_is_zero_without_selection() {
        let state = TimerState {
            selected_secs: 0,
            ..TimerState::default()
        };
        assert_eq!(state.progress(), 0.0);
    }
}
