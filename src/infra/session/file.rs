use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

use super::{Session, TokenStore};

/// Stores the session as a JSON file:
/// ```json
/// {
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "user": { "UIN": "...", "id": 42 },
///   "saved_at": "2026-10-17T12:00:00Z"
/// }
/// ```
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl TokenStore for FileTokenStore {
    async fn save(&self, session: &Session) -> Result<()> {
        let content = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("failed to write session to {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read session from {}", self.path.display()));
            }
        };
        let session = serde_json::from_slice(&content)
            .with_context(|| format!("corrupt session file {}", self.path.display()))?;
        Ok(Some(session))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use std::env;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[tokio::test]
    async fn test_load_without_file() {
        let store = FileTokenStore::new(temp_path("student_portal_test_missing.json"));
        let _ = store.clear().await;
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = FileTokenStore::new(temp_path("student_portal_test_session.json"));
        let session = Session {
            access_token: "abc".to_string(),
            refresh_token: None,
            user: json!({ "UIN": "U1" }),
            saved_at: Utc::now(),
        };

        store.save(&session).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, session);

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
