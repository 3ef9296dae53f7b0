mod basic;
mod client;
pub mod auth;

pub use auth::ApiKey;
pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::PortalError;

/// Downloads `url` with a GET request and returns the body bytes.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>, PortalError> {
    let url = url
        .parse()
        .map_err(|e| PortalError::InvalidRequest(format!("{url}: {e}")))?;
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Executes `req` and decodes a successful JSON body.
///
/// Non-success statuses are translated: 401 into
/// [`PortalError::Unauthorized`], 404 into [`PortalError::NotFound`], and
/// anything else into [`PortalError::Upstream`] carrying the response text.
pub async fn fetch_json<C: HttpClient, T: DeserializeOwned>(
    client: &C,
    req: reqwest::Request,
) -> Result<T, PortalError> {
    let method = req.method().clone();
    let url = req.url().path().to_string();

    let resp = client.execute(req).await?;
    let status = resp.status();
    debug!(%method, path = %url, status = status.as_u16(), "Upstream response");

    if !status.is_success() {
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "No error details".to_string());
        error!(%method, path = %url, status = status.as_u16(), body = %body, "Upstream API error");

        return Err(match status {
            StatusCode::UNAUTHORIZED => PortalError::Unauthorized,
            StatusCode::NOT_FOUND => PortalError::NotFound,
            _ => PortalError::Upstream {
                status: status.as_u16(),
                body,
            },
        });
    }

    Ok(resp.json().await?)
}
