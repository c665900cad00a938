use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use readtrack_lib::{
    api::{ApiError, CompletionStore},
    completion::CompletionError,
    flow::ReadingFlow,
    models::{CompletionReceipt, NewReadingCompletion, ReadingCompletion},
    timer::{TimerController, TimerStatus},
};
use tokio::time;

/// Records every create call; fails while `offline` is set.
#[derive(Default)]
struct MemoryStore {
    calls: Mutex<Vec<NewReadingCompletion>>,
    saved: Mutex<Vec<ReadingCompletion>>,
    offline: Mutex<bool>,
}

impl MemoryStore {
    fn calls(&self) -> Vec<NewReadingCompletion> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionStore for MemoryStore {
    async fn create(&self, completion: &NewReadingCompletion) -> Result<CompletionReceipt, ApiError> {
        self.calls.lock().unwrap().push(completion.clone());
        if *self.offline.lock().unwrap() {
            return Err(ApiError::Status {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        let mut saved = self.saved.lock().unwrap();
        let id = saved.len() as i64 + 1;
        saved.push(ReadingCompletion {
            id,
            date: completion.date,
            duration_minutes: completion.duration_minutes,
            book_id: completion.book_id,
            note: completion.note.clone(),
        });
        Ok(CompletionReceipt { id })
    }

    async fn list_by_month(&self, year: i32, month: u32) -> Result<Vec<ReadingCompletion>, ApiError> {
        use chrono::Datelike;
        Ok(self
            .saved
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.date.year() == year && c.date.month() == month)
            .cloned()
            .collect())
    }
}

#[tokio::test(start_paused = true)]
async fn five_minute_session_saved_with_note() {
    let store = Arc::new(MemoryStore::default());
    let flow = ReadingFlow::new(TimerController::new(), store.clone());

    flow.timer().select_duration(5).await.unwrap();
    flow.timer().start_timer().await.unwrap();
    time::sleep(Duration::from_millis(300_500)).await;
    assert_eq!(flow.timer().get_state().await.status, TimerStatus::Completed);

    flow.edit_note("hello").await.unwrap();
    flow.save().await.unwrap();

    let today = Local::now().date_naive();
    assert_eq!(
        store.calls(),
        vec![NewReadingCompletion {
            date: today,
            duration_minutes: 5,
            book_id: None,
            note: Some("hello".into()),
        }]
    );
    assert_eq!(flow.timer().get_state().await.status, TimerStatus::Idle);

    let month = store
        .list_by_month(chrono::Datelike::year(&today), chrono::Datelike::month(&today))
        .await
        .unwrap();
    assert_eq!(month.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_save_is_not_retried_automatically() {
    let store = Arc::new(MemoryStore::default());
    *store.offline.lock().unwrap() = true;
    let flow = ReadingFlow::new(TimerController::new(), store.clone())
        .with_today(|| NaiveDate::from_ymd_opt(2024, 11, 3).unwrap());

    flow.timer().select_duration(5).await.unwrap();
    flow.timer().start_timer().await.unwrap();
    time::sleep(Duration::from_secs(301)).await;

    let err = flow.save().await.unwrap_err();
    assert!(matches!(err, CompletionError::SaveFailed(ApiError::Status { status: 502, .. })));

    time::sleep(Duration::from_secs(120)).await;
    assert_eq!(store.calls().len(), 1);
    assert!(flow.is_capture_open().await);
    let state = flow.timer().get_state().await;
    assert_eq!(state.status, TimerStatus::Completed);
    assert_eq!(state.remaining_secs, 0);
}

#[tokio::test(start_paused = true)]
async fn paused_ten_minute_session_resumes_from_550() {
    let store = Arc::new(MemoryStore::default());
    let flow = ReadingFlow::new(TimerController::new(), store.clone());

    flow.timer().select_duration(10).await.unwrap();
    flow.timer().start_timer().await.unwrap();
    time::sleep(Duration::from_millis(50_500)).await;
    assert_eq!(flow.timer().pause_timer().await.unwrap().remaining_secs, 550);

    time::sleep(Duration::from_secs(45)).await;
    flow.timer().resume_timer().await.unwrap();
    time::sleep(Duration::from_secs(10)).await;

    let remaining = flow.timer().get_state().await.remaining_secs;
    assert!(remaining < 550 && remaining >= 539, "remaining was {remaining}");
}

#[tokio::test(start_paused = true)]
async fn reset_from_each_state_creates_nothing() {
    let store = Arc::new(MemoryStore::default());
    let flow = ReadingFlow::new(TimerController::new(), store.clone());
    let timer = flow.timer();

    // idle
    let state = flow.reset().await.unwrap();
    assert_eq!((state.status, state.remaining_secs), (TimerStatus::Idle, 0));

    // running
    timer.select_duration(1).await.unwrap();
    timer.start_timer().await.unwrap();
    time::sleep(Duration::from_secs(10)).await;
    let state = flow.reset().await.unwrap();
    assert_eq!((state.status, state.remaining_secs), (TimerStatus::Idle, 0));

    // paused
    timer.start_timer().await.unwrap();
    timer.pause_timer().await.unwrap();
    let state = flow.reset().await.unwrap();
    assert_eq!((state.status, state.remaining_secs), (TimerStatus::Idle, 0));

    // completed
    timer.start_timer().await.unwrap();
    time::sleep(Duration::from_secs(61)).await;
    assert!(flow.is_capture_open().await);
    let state = flow.reset().await.unwrap();
    assert_eq!((state.status, state.remaining_secs), (TimerStatus::Idle, 0));

    time::sleep(Duration::from_secs(120)).await;
    assert!(store.calls().is_empty());
    assert!(!flow.is_capture_open().await);
}
