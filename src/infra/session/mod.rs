//! Bearer-token storage.
//!
//! [`Session`] is what a successful login leaves behind.
//! [`TokenStore`] is the async trait for persisting and reloading it.
//! [`FileTokenStore`] implements [`TokenStore`] with a JSON file on disk.

mod file;

pub use file::FileTokenStore;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tokens and user record returned by the portal login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// The upstream `user` object (UIN, StudentID, FacultyID, DepartmentID, ...).
    #[serde(default)]
    pub user: Value,
    pub saved_at: DateTime<Utc>,
}

impl Session {
    /// Extracts a session from a login response shaped like
    /// `{ "payload": { "token": { "access_token", "refresh_token" }, "user": {...} } }`.
    pub fn from_login_response(response: &Value, now: DateTime<Utc>) -> Option<Self> {
        let payload = response.get("payload")?;
        let token = payload.get("token")?;

        Some(Self {
            access_token: token.get("access_token")?.as_str()?.to_string(),
            refresh_token: token
                .get("refresh_token")
                .and_then(Value::as_str)
                .map(str::to_string),
            user: payload.get("user").cloned().unwrap_or(Value::Null),
            saved_at: now,
        })
    }

    /// Reads an id field from the stored user record, as text.
    pub fn user_field(&self, key: &str) -> Option<String> {
        match self.user.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    async fn save(&self, session: &Session) -> Result<()>;

    /// Returns `None` when nobody has logged in yet.
    async fn load(&self) -> Result<Option<Session>>;

    async fn clear(&self) -> Result<()>;
}
