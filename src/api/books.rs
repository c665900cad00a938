use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use super::{ApiClient, ApiError};
use crate::models::{Book, BookDetail, BookId, NewBook};

/// Read access to the book catalogue, plus adding missing titles.
#[async_trait]
pub trait BookCatalog: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Book>, ApiError>;
    async fn detail(&self, id: BookId) -> Result<BookDetail, ApiError>;
    async fn popular(&self) -> Result<Vec<Book>, ApiError>;
    async fn add(&self, book: &NewBook) -> Result<BookId, ApiError>;
}

#[derive(Deserialize)]
struct Created {
    id: BookId,
}

#[async_trait]
impl BookCatalog for ApiClient {
    async fn search(&self, query: &str) -> Result<Vec<Book>, ApiError> {
        let request = self
            .request(Method::GET, "books/search")
            .query(&[("q", query)]);
        self.send_json(request).await
    }

    async fn detail(&self, id: BookId) -> Result<BookDetail, ApiError> {
        self.send_json(self.request(Method::GET, &format!("books/{id}")))
            .await
    }

    async fn popular(&self) -> Result<Vec<Book>, ApiError> {
        self.send_json(self.request(Method::GET, "books/popular"))
            .await
    }

    async fn add(&self, book: &NewBook) -> Result<BookId, ApiError> {
        let created: Created = self
            .send_json(self.request(Method::POST, "books").json(book))
            .await?;
        Ok(created.id)
    }
}
