//! Trait and types for talking to the student records portal.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PortalError;
use crate::parser::payload_from_value;
use crate::results::{DedupPolicy, clean_results, types::CleanResults};

/// Username/password pair accepted by the portal login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Abstraction over the upstream portal API.
///
/// Every call returns the upstream JSON untouched so that proxy routes can
/// pass it through; only [`PortalApi::clean_results`] interprets a body.
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// Exchanges credentials for a token envelope.
    async fn login(&self, credentials: &Credentials) -> Result<Value, PortalError>;

    /// Profile record (including the photo buffer) for a student UIN.
    async fn student_info(&self, uin: &str) -> Result<Value, PortalError>;

    /// Raw results payload: `studentResult`, `courseReg`, `levels`, `sessions`.
    async fn student_results(&self, student_id: &str) -> Result<Value, PortalError>;

    async fn department(&self, department_id: &str) -> Result<Value, PortalError>;

    async fn faculty(&self, faculty_id: &str) -> Result<Value, PortalError>;

    /// Fetches the raw results and runs them through the GPA pipeline.
    async fn clean_results(
        &self,
        student_id: &str,
        policy: DedupPolicy,
    ) -> Result<CleanResults, PortalError> {
        let raw = self.student_results(student_id).await?;
        let payload = payload_from_value(raw)?;
        Ok(clean_results(&payload, policy))
    }
}
