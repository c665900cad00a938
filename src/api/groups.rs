use async_trait::async_trait;
use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::ReadingGroup;

#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn list(&self) -> Result<Vec<ReadingGroup>, ApiError>;
}

#[async_trait]
impl GroupDirectory for ApiClient {
    async fn list(&self) -> Result<Vec<ReadingGroup>, ApiError> {
        self.send_json(self.request(Method::GET, "reading-groups"))
            .await
    }
}
