use async_trait::async_trait;
use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::{CompletionReceipt, NewReadingCompletion, ReadingCompletion};

/// Persistence boundary for reading completions.
#[async_trait]
pub trait CompletionStore: Send + Sync {
    async fn create(&self, completion: &NewReadingCompletion)
        -> Result<CompletionReceipt, ApiError>;

    /// `month` is 1-based.
    async fn list_by_month(&self, year: i32, month: u32)
        -> Result<Vec<ReadingCompletion>, ApiError>;
}

#[async_trait]
impl CompletionStore for ApiClient {
    async fn create(
        &self,
        completion: &NewReadingCompletion,
    ) -> Result<CompletionReceipt, ApiError> {
        let request = self
            .request(Method::POST, "reading-completions")
            .json(completion);
        self.send_json(request).await
    }

    async fn list_by_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<ReadingCompletion>, ApiError> {
        let request = self
            .request(Method::GET, "reading-completions")
            .query(&[("year", year.to_string()), ("month", month.to_string())]);
        self.send_json(request).await
    }
}
