//! Timer plus completion capture: one reading session from start to record.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tokio::sync::Mutex;

use crate::{
    api::CompletionStore,
    completion::{CompletionCapture, CompletionError},
    models::{Book, CompletionReceipt},
    timer::{TimerController, TimerState, TimerStatus},
};

const ENABLE_LOGS: bool = true;
use crate::{log_error, log_info};

type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Clone)]
pub struct ReadingFlow {
    timer: TimerController,
    completions: Arc<dyn CompletionStore>,
    book: Arc<Mutex<Option<Book>>>,
    capture: Arc<Mutex<Option<CompletionCapture>>>,
    today: Today,
}

impl ReadingFlow {
    pub fn new(timer: TimerController, completions: Arc<dyn CompletionStore>) -> Self {
        Self {
            timer,
            completions,
            book: Arc::new(Mutex::new(None)),
            capture: Arc::new(Mutex::new(None)),
            today: Arc::new(|| Local::now().date_naive()),
        }
    }

    /// Overrides the calendar day stamped on saved completions.
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    pub fn timer(&self) -> &TimerController {
        &self.timer
    }

    /// Book attached to the next completion. `None` records a session without one.
    pub async fn select_book(&self, book: Option<Book>) {
        *self.book.lock().await = book;
    }

    /// Current capture, opened on first access once the timer has completed.
    pub async fn capture(&self) -> Option<CompletionCapture> {
        let state = self.timer.get_state().await;
        let mut slot = self.capture.lock().await;
        self.sync_capture(&state, &mut slot).await;
        slot.clone()
    }

    pub async fn is_capture_open(&self) -> bool {
        self.capture().await.is_some()
    }

    /// Returns true if the note had to be shortened.
    pub async fn edit_note(&self, text: &str) -> Result<bool, CompletionError> {
        let state = self.timer.get_state().await;
        let mut slot = self.capture.lock().await;
        self.sync_capture(&state, &mut slot).await;
        let capture = slot.as_mut().ok_or(CompletionError::NotCompleted)?;
        if capture.is_saving() {
            return Err(CompletionError::SaveInProgress);
        }
        Ok(capture.set_note(text))
    }

    /// Sends the completion once, with whichever book is selected at that
    /// moment. On failure the capture and timer stay as they were so the user
    /// can press save again. If the session was reset while the request was in
    /// flight, the newer session is left untouched.
    pub async fn save(&self) -> Result<CompletionReceipt, CompletionError> {
        let state = self.timer.get_state().await;
        let (request, session_id) = {
            let mut slot = self.capture.lock().await;
            self.sync_capture(&state, &mut slot).await;
            let capture = slot.as_mut().ok_or(CompletionError::NotCompleted)?;
            if capture.is_saving() {
                return Err(CompletionError::SaveInProgress);
            }
            capture.mark_saving(true);
            (
                capture.to_request((self.today)()),
                capture.session_id().to_string(),
            )
        };

        match self.completions.create(&request).await {
            Ok(receipt) => {
                {
                    let mut slot = self.capture.lock().await;
                    if slot.as_ref().is_some_and(|c| c.session_id() == session_id) {
                        slot.take();
                    }
                }
                if self.timer.finish_session(&session_id).await.is_none() {
                    log_info!("session {session_id} was replaced while saving; timer left as is");
                }
                log_info!(
                    "saved completion {} for session {} ({} min)",
                    receipt.id,
                    session_id,
                    request.duration_minutes
                );
                Ok(receipt)
            }
            Err(err) => {
                log_error!("saving completion for session {session_id} failed: {err}");
                let mut slot = self.capture.lock().await;
                if let Some(capture) = slot.as_mut().filter(|c| c.session_id() == session_id) {
                    capture.mark_saving(false);
                }
                Err(CompletionError::SaveFailed(err))
            }
        }
    }

    /// Drops the capture without recording anything.
    pub async fn skip(&self) -> Result<TimerState> {
        let state = self.timer.get_state().await;
        {
            let mut slot = self.capture.lock().await;
            self.sync_capture(&state, &mut slot).await;
            if let Some(capture) = slot.take() {
                log_info!("skipped recording session {}", capture.session_id());
            }
        }
        self.timer.reset_timer().await
    }

    /// Cancels the session from any state; an open capture is discarded.
    pub async fn reset(&self) -> Result<TimerState> {
        self.capture.lock().await.take();
        self.timer.reset_timer().await
    }

    async fn sync_capture(&self, state: &TimerState, slot: &mut Option<CompletionCapture>) {
        if state.status != TimerStatus::Completed {
            return;
        }
        let same_session = slot
            .as_ref()
            .is_some_and(|capture| Some(capture.session_id()) == state.session_id.as_deref());
        let book = self.book.lock().await.clone();
        if !same_session {
            *slot = CompletionCapture::open(state, book);
        } else if let Some(capture) = slot.as_mut().filter(|c| !c.is_saving()) {
            capture.set_book(book);
        }
    }
}
