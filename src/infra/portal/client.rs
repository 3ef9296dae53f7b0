use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use reqwest::{Method, Request, Url};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::config::Config;
use crate::error::PortalError;
use crate::fetch::{ApiKey, BasicClient, HttpClient, fetch_json};
use crate::services::portal_api::{Credentials, PortalApi};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";

/// Client for the upstream student records API.
///
/// Authentication is carried by the wrapped [`HttpClient`]; use
/// [`PortalClient::authorized`] to get a client that sends a bearer token.
pub struct PortalClient<C> {
    http: C,
    base_url: Url,
    origin: String,
}

impl PortalClient<BasicClient> {
    /// Builds an unauthenticated client from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = BasicClient::with_timeouts(config.timeout, config.connect_timeout)?;
        Self::new(http, &config.api_url, &config.origin)
    }
}

impl<C: HttpClient + Clone> PortalClient<C> {
    /// Same endpoint, with every request carrying `Authorization: Bearer <token>`.
    pub fn authorized(&self, token: &str) -> Result<PortalClient<ApiKey<C>>, PortalError> {
        let http =
            ApiKey::bearer(self.http.clone(), token).map_err(|_| PortalError::Unauthorized)?;
        Ok(PortalClient {
            http,
            base_url: self.base_url.clone(),
            origin: self.origin.clone(),
        })
    }
}

impl<C: HttpClient> PortalClient<C> {
    pub fn new(http: C, base_url: &str, origin: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url,
            origin: origin.trim_end_matches('/').to_string(),
        })
    }

    /// Builds a request for the path formed by `segments` under the base URL.
    /// Segments are percent-encoded, so ids cannot escape their path slot.
    fn request(&self, method: Method, segments: &[&str]) -> Result<Request, PortalError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PortalError::InvalidRequest("base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(segments);

        let mut req = Request::new(method, url);
        *req.headers_mut() = self.browser_headers();
        Ok(req)
    }

    fn json_request(
        &self,
        method: Method,
        segments: &[&str],
        body: &impl Serialize,
    ) -> Result<Request, PortalError> {
        let mut req = self.request(method, segments)?;
        let bytes =
            serde_json::to_vec(body).map_err(|e| PortalError::InvalidRequest(e.to_string()))?;
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *req.body_mut() = Some(bytes.into());
        Ok(req)
    }

    /// The upstream rejects requests that do not look like its own web app.
    fn browser_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        if let Ok(origin) = HeaderValue::from_str(&self.origin) {
            headers.insert(ORIGIN, origin);
        }
        if let Ok(referer) = HeaderValue::from_str(&format!("{}/", self.origin)) {
            headers.insert(REFERER, referer);
        }
        headers
    }
}

#[async_trait]
impl<C: HttpClient> PortalApi for PortalClient<C> {
    #[tracing::instrument(skip_all, fields(username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> Result<Value, PortalError> {
        info!("Login attempt");
        let req = self.json_request(Method::POST, &["v1", "auth", "login"], credentials)?;
        fetch_json(&self.http, req).await
    }

    #[tracing::instrument(skip(self))]
    async fn student_info(&self, uin: &str) -> Result<Value, PortalError> {
        info!("Fetching student info");
        let req = self.json_request(
            Method::POST,
            &["v1", "auth", "studentuin", ""],
            &json!({ "id": uin }),
        )?;
        fetch_json(&self.http, req).await
    }

    #[tracing::instrument(skip(self))]
    async fn student_results(&self, student_id: &str) -> Result<Value, PortalError> {
        info!("Fetching student results");
        let mut req = self.json_request(
            Method::POST,
            &["v1", "studentResult", "student"],
            &json!([]),
        )?;
        req.url_mut()
            .query_pairs_mut()
            .append_pair("StudentID", student_id);
        fetch_json(&self.http, req).await
    }

    #[tracing::instrument(skip(self))]
    async fn department(&self, department_id: &str) -> Result<Value, PortalError> {
        info!("Fetching department");
        let req = self.request(Method::GET, &["v1", "department", "by", department_id])?;
        fetch_json(&self.http, req).await
    }

    #[tracing::instrument(skip(self))]
    async fn faculty(&self, faculty_id: &str) -> Result<Value, PortalError> {
        info!("Fetching faculty");
        let req = self.request(Method::GET, &["v1", "faculty", "by", faculty_id])?;
        fetch_json(&self.http, req).await
    }
}
