use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{TickOutcome, TimerState, TimerStatus};
use crate::utils::format_clock;

const ENABLE_LOGS: bool = true;
use crate::{log_debug, log_info};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub progress: f64,
    pub clock: String,
}

impl From<&TimerState> for TimerSnapshot {
    fn from(state: &TimerState) -> Self {
        Self {
            progress: state.progress(),
            clock: format_clock(state.remaining_secs),
            state: state.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TimerEvent {
    StateChanged(TimerSnapshot),
    Tick(TimerSnapshot),
    /// Sent once when the countdown reaches zero.
    Completed(TimerSnapshot),
}

/// The running tick task. Dropping it stops the task.
struct Ticker {
    handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl Ticker {
    async fn stop(mut self) -> Result<()> {
        self.cancel_token.cancel();
        match self.handle.take() {
            Some(handle) => handle.await.context("ticker task failed to join"),
            None => Ok(()),
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    events: broadcast::Sender<TimerEvent>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    tick_interval: Duration,
    heartbeat_every_ticks: u64,
}

impl Default for TimerController {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerController {
    pub fn new() -> Self {
        let debug_mode = std::env::var("READTRACK_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            state: Arc::new(Mutex::new(TimerState::new())),
            events,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            heartbeat_every_ticks: if debug_mode { 1 } else { 10 },
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub async fn get_state(&self) -> TimerState {
        self.state.lock().await.clone()
    }

    pub async fn get_snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::from(&*self.state.lock().await)
    }

    pub async fn select_duration(&self, minutes: u32) -> Result<TimerState> {
        let state = {
            let mut state = self.state.lock().await;
            if state.status != TimerStatus::Idle {
                return Err(anyhow!("duration can only be changed while idle"));
            }
            if !state.select_duration(minutes) {
                return Err(anyhow!("duration must be at least one minute"));
            }
            state.clone()
        };
        self.emit_state_changed(&state);
        Ok(state)
    }

    pub async fn start_timer(&self) -> Result<TimerState> {
        let state = {
            let mut state = self.state.lock().await;
            if state.status != TimerStatus::Idle {
                return Err(anyhow!("timer already active"));
            }
            let session_id = Uuid::new_v4().to_string();
            if !state.begin_session(session_id, Utc::now()) {
                return Err(anyhow!("no duration selected"));
            }
            state.clone()
        };

        self.spawn_ticker().await;

        log_info!(
            "reading session {} started for {} minutes",
            state.session_id.as_deref().unwrap_or_default(),
            state.selected_minutes()
        );
        self.emit_state_changed(&state);
        Ok(state)
    }

    /// Stops the ticker; remaining time is kept until resume.
    pub async fn pause_timer(&self) -> Result<TimerState> {
        let state = {
            let mut state = self.state.lock().await;
            if !state.pause() {
                return Err(anyhow!("timer is not running"));
            }
            state.clone()
        };
        self.cancel_ticker().await?;
        self.emit_state_changed(&state);
        Ok(state)
    }

    /// Re-arms the ticker, so the next decrement lands a full interval later.
    pub async fn resume_timer(&self) -> Result<TimerState> {
        let state = {
            let mut state = self.state.lock().await;
            if !state.resume() {
                return Err(anyhow!("timer is not paused"));
            }
            state.clone()
        };
        self.spawn_ticker().await;
        self.emit_state_changed(&state);
        Ok(state)
    }

    /// Abort path. Stops the ticker and returns to idle without completion.
    pub async fn reset_timer(&self) -> Result<TimerState> {
        self.cancel_ticker().await?;

        let state = {
            let mut state = self.state.lock().await;
            if state.status != TimerStatus::Idle {
                log_info!(
                    "reading session {} reset with {}s remaining",
                    state.session_id.as_deref().unwrap_or_default(),
                    state.remaining_secs
                );
            }
            state.reset();
            state.clone()
        };
        self.emit_state_changed(&state);
        Ok(state)
    }

    /// Returns a completed session to idle, but only if `session_id` is still
    /// the current one. `None` means a newer session took its place.
    ///
    /// The ticker has already exited at completion, so it is left alone; a
    /// session started right after this returns replaces it on spawn.
    pub async fn finish_session(&self, session_id: &str) -> Option<TimerState> {
        let state = {
            let mut state = self.state.lock().await;
            if state.status != TimerStatus::Completed
                || state.session_id.as_deref() != Some(session_id)
            {
                return None;
            }
            state.reset();
            state.clone()
        };
        log_info!("reading session {session_id} finished");
        self.emit_state_changed(&state);
        Some(state)
    }

    /// Stops any live ticker. Call when the timer view goes away.
    pub async fn shutdown(&self) -> Result<()> {
        self.cancel_ticker().await
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        // Dropping the previous ticker cancels it.
        drop(ticker_guard.take());

        let state = self.state.clone();
        let events = self.events.clone();
        let tick_interval = self.tick_interval;
        let heartbeat_every = self.heartbeat_every_ticks;
        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + tick_interval, tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks: u64 = 0;

            loop {
                tokio::select! {
                    _ = token_clone.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let (outcome, snapshot) = {
                    let mut guard = state.lock().await;
                    if token_clone.is_cancelled() {
                        break;
                    }
                    match guard.status {
                        TimerStatus::Idle | TimerStatus::Completed => break,
                        TimerStatus::Paused => continue,
                        TimerStatus::Running => {}
                    }
                    let outcome = guard.tick();
                    (outcome, TimerSnapshot::from(&*guard))
                };

                match outcome {
                    TickOutcome::Skipped => continue,
                    TickOutcome::Counted { remaining_secs } => {
                        ticks = ticks.wrapping_add(1);
                        if ticks % heartbeat_every == 0 {
                            log_debug!(
                                "session {} heartbeat: {}s remaining",
                                snapshot.state.session_id.as_deref().unwrap_or_default(),
                                remaining_secs
                            );
                        }
                        let _ = events.send(TimerEvent::Tick(snapshot));
                    }
                    TickOutcome::Completed => {
                        log_info!(
                            "reading session {} completed",
                            snapshot.state.session_id.as_deref().unwrap_or_default()
                        );
                        let _ = events.send(TimerEvent::Tick(snapshot.clone()));
                        let _ = events.send(TimerEvent::Completed(snapshot));
                        break;
                    }
                }
            }
        });

        *ticker_guard = Some(Ticker {
            handle: Some(handle),
            cancel_token,
        });
    }

    async fn cancel_ticker(&self) -> Result<()> {
        let ticker = self.ticker.lock().await.take();
        match ticker {
            Some(ticker) => ticker.stop().await,
            None => Ok(()),
        }
    }

    fn emit_state_changed(&self, state: &TimerState) {
        let _ = self
            .events
            .send(TimerEvent::StateChanged(TimerSnapshot::from(state)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    async fn started(minutes: u32) -> TimerController {
        let controller = TimerController::new();
        controller.select_duration(minutes).await.unwrap();
        controller.start_timer().await.unwrap();
        controller
    }

    #[tokio::test(start_paused = true)]
    async fn runs_down_to_completion_exactly_once() {
        let controller = TimerController::new();
        controller.select_duration(5).await.unwrap();
        let mut events = controller.subscribe();
        controller.start_timer().await.unwrap();

        let mut last_remaining = u64::MAX;
        let mut completions = 0;
        loop {
            match events.recv().await.unwrap() {
                TimerEvent::Tick(snapshot) => {
                    assert!(snapshot.state.remaining_secs < last_remaining);
                    last_remaining = snapshot.state.remaining_secs;
                }
                TimerEvent::Completed(snapshot) => {
                    completions += 1;
                    assert_eq!(snapshot.state.remaining_secs, 0);
                    break;
                }
                TimerEvent::StateChanged(_) => {}
            }
        }

        time::sleep(Duration::from_secs(30)).await;
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(completions, 1);
        assert_eq!(last_remaining, 0);

        let state = controller.get_state().await;
        assert_eq!(state.status, TimerStatus::Completed);
        assert_eq!(state.remaining_secs, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn three_hundred_ticks_complete_five_minutes() {
        let controller = started(5).await;

        time::sleep(Duration::from_millis(299_500)).await;
        let state = controller.get_state().await;
        assert_eq!(state.status, TimerStatus::Running);
        assert_eq!(state.remaining_secs, 1);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(controller.get_state().await.status, TimerStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_continues_from_paused_remaining() {
        let controller = started(10).await;

        time::sleep(Duration::from_millis(50_500)).await;
        let paused = controller.pause_timer().await.unwrap();
        assert_eq!(paused.remaining_secs, 550);

        time::sleep(Duration::from_secs(100)).await;
        assert_eq!(controller.get_state().await.remaining_secs, 550);

        controller.resume_timer().await.unwrap();
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(controller.get_state().await.remaining_secs, 549);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_waits_a_full_second_before_next_tick() {
        let controller = started(10).await;
        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(controller.pause_timer().await.unwrap().remaining_secs, 597);
        assert!(controller.ticker.lock().await.is_none());

        time::sleep(Duration::from_millis(800)).await;
        controller.resume_timer().await.unwrap();

        time::sleep(Duration::from_millis(900)).await;
        assert_eq!(controller.get_state().await.remaining_secs, 597);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(controller.get_state().await.remaining_secs, 596);
    }

    #[tokio::test(start_paused = true)]
    async fn finish_session_ignores_stale_ids() {
        let controller = started(1).await;
        time::sleep(Duration::from_secs(61)).await;
        let finished = controller.get_state().await;
        assert_eq!(finished.status, TimerStatus::Completed);
        let old_id = finished.session_id.unwrap();

        assert!(controller.finish_session("someone-else").await.is_none());
        let state = controller.finish_session(&old_id).await.unwrap();
        assert_eq!(state.status, TimerStatus::Idle);

        controller.start_timer().await.unwrap();
        assert!(controller.finish_session(&old_id).await.is_none());
        assert_eq!(controller.get_state().await.status, TimerStatus::Running);
        controller.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_pause_resume_loses_no_time() {
        let controller = started(10).await;
        time::sleep(Duration::from_millis(3_500)).await;

        let before = controller.get_state().await.remaining_secs;
        controller.pause_timer().await.unwrap();
        let after = controller.resume_timer().await.unwrap();

        assert_eq!(before, after.remaining_secs);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_ticker() {
        let controller = started(10).await;
        time::sleep(Duration::from_millis(5_500)).await;

        let state = controller.reset_timer().await.unwrap();
        assert_eq!(state.status, TimerStatus::Idle);
        assert_eq!(state.remaining_secs, 0);
        assert!(controller.ticker.lock().await.is_none());

        time::sleep(Duration::from_secs(30)).await;
        let state = controller.get_state().await;
        assert_eq!(state.status, TimerStatus::Idle);
        assert_eq!(state.remaining_secs, 0);
        assert_eq!(state.selected_secs, 600);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_reset_counts_from_full_duration() {
        let controller = started(5).await;
        time::sleep(Duration::from_millis(10_500)).await;
        controller.reset_timer().await.unwrap();

        controller.start_timer().await.unwrap();
        time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(controller.get_state().await.remaining_secs, 298);
    }

    #[tokio::test]
    async fn invalid_transitions_leave_state_untouched() {
        let controller = TimerController::new();
        assert!(controller.pause_timer().await.is_err());
        assert!(controller.resume_timer().await.is_err());
        assert!(controller.select_duration(0).await.is_err());

        controller.start_timer().await.unwrap();
        assert!(controller.start_timer().await.is_err());
        assert!(controller.select_duration(30).await.is_err());
        assert!(controller.resume_timer().await.is_err());

        let state = controller.get_state().await;
        assert_eq!(state.status, TimerStatus::Running);
        assert_eq!(state.selected_secs, 600);
        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn snapshot_formats_clock() {
        let controller = TimerController::new();
        controller.select_duration(15).await.unwrap();
        controller.start_timer().await.unwrap();

        let snapshot = controller.get_snapshot().await;
        assert_eq!(snapshot.clock, "15:00");
        assert_eq!(snapshot.progress, 0.0);
        controller.shutdown().await.unwrap();
    }
}
