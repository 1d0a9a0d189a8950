//! HTTP transport seam
//!
//! The client never talks to reqwest directly: every request goes through a
//! [`Transport`], so tests can script responses without a live instance.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// Request/response plumbing used by [`Api`](crate::api::Api).
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// GET `url` and decode the body as JSON.
    async fn get(&self, url: &str) -> Result<Value, TransportError>;

    /// POST `body` as JSON to `url` and decode the response body as JSON.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, url: &str) -> Result<Value, TransportError> {
        (**self).get(url).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        (**self).post_json(url, body).await
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use super::*;
    use crate::config::ClientConfig;

    /// Transport backed by `reqwest::Client` with HTTP basic auth
    #[derive(Clone)]
    pub struct HttpTransport {
        client: reqwest::Client,
        username: Option<String>,
        password: Option<String>,
    }

    impl HttpTransport {
        pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = config.timeout {
                builder = builder.timeout(timeout);
            }
            Ok(Self {
                client: builder.build()?,
                username: config.username.clone(),
                password: config.password.clone(),
            })
        }

        fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
            match &self.username {
                Some(user) => request.basic_auth(user, self.password.as_ref()),
                None => request,
            }
        }

        async fn decode(response: reqwest::Response) -> Result<Value, TransportError> {
            if !response.status().is_success() {
                let code = response.status().as_u16();
                let body = response.text().await.unwrap_or_else(|e| {
                    log::trace!("Failed to read body of {} response: {}", code, e);
                    String::new()
                });
                return Err(TransportError::Status { code, body });
            }
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn get(&self, url: &str) -> Result<Value, TransportError> {
            log::debug!("GET {}", url);
            let response = self.authorize(self.client.get(url)).send().await?;
            Self::decode(response).await
        }

        async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
            log::debug!("POST {}", url);
            let response = self
                .authorize(self.client.post(url))
                .json(body)
                .send()
                .await?;
            Self::decode(response).await
        }
    }

}
