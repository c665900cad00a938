use serde::{Deserialize, Serialize};

use super::BookId;

pub type RecordId = i64;

/// A book on the user's reading shelf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRecord {
    pub id: RecordId,
    pub book_title: String,
    pub book_author: String,
    /// Date the book was shelved, as the API formats it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

/// Payload for `POST /reading-records`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewReadingRecord {
    pub book_id: BookId,
}
