//! Data types used by the results pipeline.
//!
//! Upstream types keep the portal's PascalCase field names; everything the
//! pipeline produces is serialized in camelCase.

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::results::grade::GradeClass;

/// The raw payload returned by `studentResult/student`.
///
/// Only the shape of `studentResult` is checked strictly (see
/// [`crate::parser`]). Rows and fields inside the payload are read leniently:
/// a `null`, a numeric string or a value of the wrong type never fails the
/// whole transcript.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPayload {
    #[serde(rename = "studentResult", deserialize_with = "rows")]
    pub student_result: Vec<RawResultRecord>,
    #[serde(rename = "courseReg", default, deserialize_with = "rows")]
    pub course_reg: Vec<CourseInfo>,
    #[serde(default, deserialize_with = "table")]
    pub levels: Table<LevelInfo>,
    #[serde(default, deserialize_with = "table")]
    pub sessions: Table<SessionInfo>,
}

/// Reference tables arrive wrapped as `{ "data": [...] }`.
#[derive(Debug, Clone)]
pub struct Table<T> {
    pub data: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

/// One exam attempt as stored upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResultRecord {
    /// `None` when absent or unparsable; such a record cannot be resolved.
    #[serde(rename = "CourseID", default, deserialize_with = "lenient")]
    pub course_id: Option<i64>,
    #[serde(rename = "Grade", default, deserialize_with = "lenient")]
    pub grade: Option<String>,
    #[serde(rename = "TotalScores", default, deserialize_with = "lenient")]
    pub total_scores: Option<f64>,
    #[serde(rename = "SessionName", default, deserialize_with = "lenient")]
    pub session_name: Option<String>,
    #[serde(rename = "SessionID", default, deserialize_with = "lenient")]
    pub session_id: Option<i64>,
    #[serde(rename = "SemesterID", default, deserialize_with = "lenient_or_default")]
    pub semester_id: i64,
    #[serde(rename = "LevelID", default, deserialize_with = "lenient_or_default")]
    pub level_id: i64,
    #[serde(rename = "FinalApprovalStatus", default)]
    pub final_approval_status: Value,
    #[serde(rename = "StudentID", default, deserialize_with = "lenient")]
    pub student_id: Option<i64>,
    #[serde(rename = "MatNo", default, deserialize_with = "lenient")]
    pub mat_no: Option<String>,
}

/// Course reference row. Rows without an id or a code are ignored when
/// resolving results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseInfo {
    #[serde(rename = "CourseID", default, deserialize_with = "lenient")]
    pub course_id: Option<i64>,
    #[serde(rename = "CourseCode", default, deserialize_with = "lenient_or_default")]
    pub code: String,
    #[serde(rename = "CourseRegistrationName", default, deserialize_with = "lenient_or_default")]
    pub name: String,
    #[serde(rename = "CreditUnit", default, deserialize_with = "lenient_or_default")]
    pub credit_unit: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LevelInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(rename = "LevelName", default, deserialize_with = "lenient_or_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(rename = "SessionName", default, deserialize_with = "lenient_or_default")]
    pub name: String,
}

/// Reads a scalar that may be `null`, a number, or a string holding either.
/// Anything that does not parse as `T` becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let parsed = match Value::deserialize(deserializer)? {
        Value::String(s) => s.parse().ok().or_else(|| s.trim().parse().ok()),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    };
    Ok(parsed)
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Reads an array of rows, skipping entries that are not objects of the
/// expected shape. A `null` or non-array value reads as empty.
fn rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(rows_from_value(Value::deserialize(deserializer)?))
}

fn table<'de, D, T>(deserializer: D) -> Result<Table<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let data = match Value::deserialize(deserializer)? {
        Value::Object(mut map) => map.remove("data").map(rows_from_value).unwrap_or_default(),
        _ => Vec::new(),
    };
    Ok(Table { data })
}

fn rows_from_value<T: DeserializeOwned>(value: Value) -> Vec<T> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(row) => Some(row),
            Err(e) => {
                warn!(index, error = %e, "Skipping unreadable row");
                None
            }
        })
        .collect()
}

/// A de-duplicated, enriched course result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub course_code: String,
    pub course_name: String,
    pub grade: String,
    pub grade_point: u32,
    pub credit_unit: u32,
    pub total_score: f64,
    pub semester: String,
    pub session: String,
    pub level: String,
    pub status: Value,
}

impl NormalizedResult {
    /// Grade points weighted by credit units.
    pub fn weighted_points(&self) -> u32 {
        self.grade_point * self.credit_unit
    }

    pub fn is_failed(&self) -> bool {
        self.grade == "F" || self.grade_point == 0
    }
}

/// All results for one (session, semester) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterSummary {
    pub semester: String,
    pub session: String,
    pub level: String,
    pub total_credits: u32,
    pub total_grade_points: u32,
    pub gpa: f64,
    pub courses: Vec<NormalizedResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    pub total_credits: u32,
    pub total_grade_points: u32,
    pub cgpa: f64,
    pub grade_class: GradeClass,
}

/// Complete cleaned transcript for one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanResults {
    pub student_id: i64,
    pub matric_number: String,
    pub overall: OverallSummary,
    pub semesters: Vec<SemesterSummary>,
    pub all_results: Vec<NormalizedResult>,
    /// Course ids that had no matching course row and were dropped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved_course_ids: Vec<i64>,
}

impl CleanResults {
    /// Results with an `F` grade or no grade points (carry-overs).
    pub fn failed_courses(&self) -> Vec<&NormalizedResult> {
        self.all_results.iter().filter(|r| r.is_failed()).collect()
    }

    /// `true` when some records were dropped for missing course metadata.
    pub fn is_partial(&self) -> bool {
        !self.unresolved_course_ids.is_empty()
    }
}
