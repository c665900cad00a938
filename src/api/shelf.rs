use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use super::{ApiClient, ApiError};
use crate::models::{BookId, NewReadingRecord, ReadingRecord, RecordId};

/// The user's personal shelf of books.
#[async_trait]
pub trait ShelfStore: Send + Sync {
    async fn records(&self) -> Result<Vec<ReadingRecord>, ApiError>;
    async fn shelve(&self, book_id: BookId) -> Result<RecordId, ApiError>;
    async fn remove(&self, id: RecordId) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct Created {
    id: RecordId,
}

fn record_path(id: RecordId) -> String {
    format!("reading-records/{id}")
}

#[async_trait]
impl ShelfStore for ApiClient {
    async fn records(&self) -> Result<Vec<ReadingRecord>, ApiError> {
        self.send_json(self.request(Method::GET, "reading-records"))
            .await
    }

    async fn shelve(&self, book_id: BookId) -> Result<RecordId, ApiError> {
        let request = self
            .request(Method::POST, "reading-records")
            .json(&NewReadingRecord { book_id });
        let created: Created = self.send_json(request).await?;
        Ok(created.id)
    }

    async fn remove(&self, id: RecordId) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, &record_path(id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiSession;

    #[test]
    fn remove_targets_the_record() {
        let client = ApiClient::new(ApiSession::new("http://books.test/api", None)).unwrap();
        let request = client
            .request(Method::DELETE, &record_path(31))
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.url().as_str(), "http://books.test/api/reading-records/31");
    }

    #[test]
    fn shelve_posts_book_id() {
        let client = ApiClient::new(ApiSession::new("http://books.test/api", None)).unwrap();
        let request = client
            .request(Method::POST, "reading-records")
            .json(&NewReadingRecord { book_id: 8 })
            .build()
            .unwrap();

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"bookId":8}"#);
    }
}
