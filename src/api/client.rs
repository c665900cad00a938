use log::warn;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::{ApiError, ApiSession};

/// Thin JSON transport over reqwest carrying an explicit [`ApiSession`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    session: ApiSession,
}

impl ApiClient {
    pub fn new(session: ApiSession) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("readtrack/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, session })
    }

    pub fn session(&self) -> &ApiSession {
        &self.session
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.session.endpoint(path))
            .header(header::ACCEPT, "application/json");
        match &self.session.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send_checked(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// For endpoints that answer with an empty body.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send_checked(builder).await.map(drop)
    }

    async fn send_checked(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("api rejected the configured token; update it with `readtrack config set --token`");
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attaches_bearer_token_when_present() {
        let client = ApiClient::new(ApiSession::new("http://books.test/api", Some("t0k".into())))
            .unwrap();
        let request = client.request(Method::GET, "books/popular").build().unwrap();

        assert_eq!(request.url().as_str(), "http://books.test/api/books/popular");
        assert_eq!(
            request.headers().get(header::AUTHORIZATION).unwrap(),
            "Bearer t0k"
        );
    }

    #[test]
    fn anonymous_session_sends_no_authorization() {
        let client = ApiClient::new(ApiSession::new("http://books.test/api", None)).unwrap();
        let request = client.request(Method::GET, "books/popular").build().unwrap();

        assert!(request.headers().get(header::AUTHORIZATION).is_none());
    }
}
