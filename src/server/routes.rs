use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, header::AUTHORIZATION},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::PortalError;
use crate::fetch::{ApiKey, HttpClient};
use crate::infra::portal::client::PortalClient;
use crate::results::{DedupPolicy, types::CleanResults};
use crate::services::portal_api::{Credentials, PortalApi};

use super::state::AppState;

/// An id that may arrive as a JSON string or number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Text(String),
    Number(i64),
}

impl Id {
    fn into_string(self) -> Option<String> {
        match self {
            Id::Text(s) if s.trim().is_empty() => None,
            Id::Text(s) => Some(s.trim().to_string()),
            Id::Number(0) => None,
            Id::Number(n) => Some(n.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InfoRequest {
    id: Option<Id>,
}

#[derive(Debug, Deserialize)]
pub struct ResultsRequest {
    #[serde(rename = "studentId")]
    student_id: Option<Id>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    id: Option<String>,
}

fn required(id: Option<Id>, field: &'static str) -> Result<String, PortalError> {
    id.and_then(Id::into_string)
        .ok_or(PortalError::MissingField(field))
}

fn required_query(query: IdQuery, field: &'static str) -> Result<String, PortalError> {
    required(query.id.map(Id::Text), field)
}

/// Client that forwards the caller's Authorization header upstream.
fn authorized<C: HttpClient + Clone>(
    state: &AppState<C>,
    headers: &HeaderMap,
) -> Result<PortalClient<ApiKey<C>>, PortalError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or(PortalError::MissingAuthorization)?;
    state.portal.authorized(token)
}

pub async fn login_handler<C: HttpClient + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Value>, PortalError> {
    Ok(Json(state.portal.login(&credentials).await?))
}

pub async fn student_info_handler<C: HttpClient + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    headers: HeaderMap,
    Json(body): Json<InfoRequest>,
) -> Result<Json<Value>, PortalError> {
    let portal = authorized(&state, &headers)?;
    let uin = required(body.id, "Student UIN")?;
    Ok(Json(portal.student_info(&uin).await?))
}

pub async fn student_results_handler<C: HttpClient + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    headers: HeaderMap,
    Json(body): Json<ResultsRequest>,
) -> Result<Json<Value>, PortalError> {
    let portal = authorized(&state, &headers)?;
    let student_id = required(body.student_id, "Student ID")?;
    Ok(Json(portal.student_results(&student_id).await?))
}

pub async fn clean_results_handler<C: HttpClient + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    headers: HeaderMap,
    Json(body): Json<ResultsRequest>,
) -> Result<Json<CleanResults>, PortalError> {
    results_with_policy(&state, &headers, body, DedupPolicy::LatestAttempt).await
}

pub async fn simple_results_handler<C: HttpClient + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    headers: HeaderMap,
    Json(body): Json<ResultsRequest>,
) -> Result<Json<CleanResults>, PortalError> {
    results_with_policy(&state, &headers, body, DedupPolicy::AllAttempts).await
}

async fn results_with_policy<C: HttpClient + Clone>(
    state: &AppState<C>,
    headers: &HeaderMap,
    body: ResultsRequest,
    policy: DedupPolicy,
) -> Result<Json<CleanResults>, PortalError> {
    let portal = authorized(state, headers)?;
    let student_id = required(body.student_id, "Student ID")?;
    info!(%student_id, ?policy, "Cleaning student results");
    Ok(Json(portal.clean_results(&student_id, policy).await?))
}

pub async fn department_query_handler<C: HttpClient + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    headers: HeaderMap,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, PortalError> {
    let portal = authorized(&state, &headers)?;
    let id = required_query(query, "Department ID")?;
    Ok(Json(portal.department(&id).await?))
}

pub async fn department_path_handler<C: HttpClient + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, PortalError> {
    let portal = authorized(&state, &headers)?;
    Ok(Json(portal.department(&id).await?))
}

pub async fn faculty_handler<C: HttpClient + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    headers: HeaderMap,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, PortalError> {
    let portal = authorized(&state, &headers)?;
    let id = required_query(query, "Faculty ID")?;
    Ok(Json(portal.faculty(&id).await?))
}
