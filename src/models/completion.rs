use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::BookId;

/// A completion record as the API returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingCompletion {
    pub id: i64,
    pub date: NaiveDate,
    /// Minutes read.
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<BookId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Payload for `POST /reading-completions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewReadingCompletion {
    pub date: NaiveDate,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<BookId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionReceipt {
    pub id: i64,
}
