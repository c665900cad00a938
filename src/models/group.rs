use serde::{Deserialize, Serialize};

/// A shared reading group built around one book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingGroup {
    pub id: i64,
    pub book_title: String,
    pub book_author: String,
    #[serde(default)]
    pub description: String,
}
