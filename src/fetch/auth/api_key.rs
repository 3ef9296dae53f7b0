use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue, InvalidHeaderValue};

/// An [`HttpClient`] wrapper that injects a credential as an HTTP header.
///
/// The header value is validated once at construction so requests never
/// fail on a bad token.
#[derive(Clone)]
pub struct ApiKey<C> {
    pub inner: C,
    pub header_name: HeaderName,
    pub key: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Sends `Authorization: Bearer <token>`. A token that already carries the
    /// `Bearer ` prefix is used as is.
    pub fn bearer(inner: C, token: &str) -> Result<Self, InvalidHeaderValue> {
        let token = token.trim();
        let value = if token.starts_with("Bearer ") {
            token.to_string()
        } else {
            format!("Bearer {token}")
        };

        let mut key = HeaderValue::from_str(&value)?;
        key.set_sensitive(true);

        Ok(Self {
            inner,
            header_name: AUTHORIZATION,
            key,
        })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.key.clone());
        self.inner.execute(req).await
    }
}
