use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::results::grade::grade_point;
use crate::results::types::{CourseInfo, NormalizedResult, RawPayload, RawResultRecord};

/// How repeated attempts at the same course are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// Keep only the last attempt (by record order) for each course code.
    #[default]
    LatestAttempt,
    /// Keep every attempt, in record order.
    AllAttempts,
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// Oldest first.
    pub results: Vec<NormalizedResult>,
    /// Distinct course ids with no course row, in order of first sighting.
    pub unresolved_course_ids: Vec<i64>,
}

/// Resolves raw records against the reference tables and collapses repeat
/// attempts according to `policy`.
///
/// Records whose course id is missing or not in `courseReg` are dropped.
/// Unknown grade letters score 0 and a missing score becomes 0.
pub fn normalize(payload: &RawPayload, policy: DedupPolicy) -> Normalized {
    let courses: HashMap<i64, &CourseInfo> = payload
        .course_reg
        .iter()
        .filter(|c| !c.code.is_empty())
        .filter_map(|c| Some((c.course_id?, c)))
        .collect();
    let levels: HashMap<i64, &str> = payload
        .levels
        .data
        .iter()
        .filter_map(|l| Some((l.id?, l.name.as_str())))
        .collect();
    let sessions: HashMap<i64, &str> = payload
        .sessions
        .data
        .iter()
        .filter_map(|s| Some((s.id?, s.name.as_str())))
        .collect();

    let records = &payload.student_result;

    // Course for each record position, resolved once.
    let resolved: Vec<Option<&CourseInfo>> = records
        .iter()
        .map(|r| r.course_id.and_then(|id| courses.get(&id).copied()))
        .collect();

    let mut unresolved_course_ids = Vec::new();
    let mut seen_unresolved = HashSet::new();
    let mut last_occurrence: HashMap<&str, usize> = HashMap::new();

    for (index, (record, course)) in records.iter().zip(&resolved).enumerate() {
        match course {
            Some(course) => {
                last_occurrence.insert(course.code.as_str(), index);
            }
            None => match record.course_id {
                Some(id) => {
                    if seen_unresolved.insert(id) {
                        warn!(course_id = id, "Course info not found, dropping result");
                        unresolved_course_ids.push(id);
                    }
                }
                None => warn!(index, "Result has no usable course id, dropping it"),
            },
        }
    }

    let build = |record: &RawResultRecord, course: &CourseInfo| {
        clean_result(record, course, &levels, &sessions)
    };

    let results = match policy {
        DedupPolicy::AllAttempts => records
            .iter()
            .zip(&resolved)
            .filter_map(|(record, course)| course.map(|c| build(record, c)))
            .collect(),
        DedupPolicy::LatestAttempt => {
            let mut emitted: HashSet<&str> = HashSet::new();
            let mut latest = Vec::with_capacity(last_occurrence.len());

            for index in (0..records.len()).rev() {
                let Some(course) = resolved[index] else {
                    continue;
                };
                let code = course.code.as_str();
                if !emitted.contains(code) && last_occurrence.get(code) == Some(&index) {
                    latest.push(build(&records[index], course));
                    emitted.insert(code);
                }
            }

            latest.reverse();
            latest
        }
    };

    debug!(
        records = records.len(),
        kept = results.len(),
        unresolved = unresolved_course_ids.len(),
        ?policy,
        "Results normalized"
    );

    Normalized {
        results,
        unresolved_course_ids,
    }
}

fn clean_result(
    record: &RawResultRecord,
    course: &CourseInfo,
    levels: &HashMap<i64, &str>,
    sessions: &HashMap<i64, &str>,
) -> NormalizedResult {
    let grade = record.grade.clone().unwrap_or_default();
    let level = levels
        .get(&record.level_id)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Level {}", record.level_id));

    NormalizedResult {
        course_code: course.code.clone(),
        course_name: course.name.clone(),
        grade_point: grade_point(&grade),
        grade,
        credit_unit: course.credit_unit,
        total_score: record.total_scores.unwrap_or(0.0),
        semester: format!("Semester {}", record.semester_id),
        session: session_label(record, sessions),
        level,
        status: record.final_approval_status.clone(),
    }
}

fn session_label(record: &RawResultRecord, sessions: &HashMap<i64, &str>) -> String {
    if let Some(name) = &record.session_name {
        return name.clone();
    }
    match record.session_id {
        Some(id) => sessions
            .get(&id)
            .map(|name| name.to_string())
            .unwrap_or_else(|| format!("Session {id}")),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::types::{LevelInfo, SessionInfo, Table};

    fn course(id: i64, code: &str, credits: u32) -> CourseInfo {
        CourseInfo {
            course_id: Some(id),
            code: code.to_string(),
            name: format!("{code} title"),
            credit_unit: credits,
        }
    }

    fn record(course_id: i64, grade: &str) -> RawResultRecord {
        RawResultRecord {
            course_id: Some(course_id),
            grade: Some(grade.to_string()),
            total_scores: Some(55.0),
            session_name: Some("2022/2023".to_string()),
            semester_id: 1,
            level_id: 1,
            ..Default::default()
        }
    }

    fn payload(records: Vec<RawResultRecord>, courses: Vec<CourseInfo>) -> RawPayload {
        RawPayload {
            student_result: records,
            course_reg: courses,
            levels: Table {
                data: vec![LevelInfo {
                    id: Some(1),
                    name: "100 Level".to_string(),
                }],
            },
            sessions: Table::default(),
        }
    }

    #[test]
    fn test_latest_attempt_wins() {
        let p = payload(
            vec![record(10, "F"), record(10, "A")],
            vec![course(10, "CSC101", 3)],
        );

        let out = normalize(&p, DedupPolicy::LatestAttempt);

        assert_eq!(out.results.len(), 1);
        assert_eq!(out.results[0].grade, "A");
        assert_eq!(out.results[0].grade_point, 5);
        assert_eq!(out.results[0].credit_unit, 3);
    }

    #[test]
    fn test_keeps_chronological_order() {
        let p = payload(
            vec![record(1, "C"), record(2, "B"), record(1, "A"), record(3, "D")],
            vec![course(1, "MTH101", 3), course(2, "PHY101", 2), course(3, "CHM101", 1)],
        );

        let out = normalize(&p, DedupPolicy::LatestAttempt);
        let codes: Vec<_> = out.results.iter().map(|r| r.course_code.as_str()).collect();

        assert_eq!(codes, vec!["PHY101", "MTH101", "CHM101"]);
        assert_eq!(out.results[1].grade, "A");
    }

    #[test]
    fn test_dedup_is_by_course_code() {
        // Two ids sharing one code collapse to the later record.
        let p = payload(
            vec![record(1, "E"), record(2, "B")],
            vec![course(1, "GST101", 2), course(2, "GST101", 2)],
        );

        let out = normalize(&p, DedupPolicy::LatestAttempt);

        assert_eq!(out.results.len(), 1);
        assert_eq!(out.results[0].grade, "B");
    }

    #[test]
    fn test_all_attempts_keeps_repeats() {
        let p = payload(
            vec![record(10, "F"), record(10, "A")],
            vec![course(10, "CSC101", 3)],
        );

        let out = normalize(&p, DedupPolicy::AllAttempts);
        let grades: Vec<_> = out.results.iter().map(|r| r.grade.as_str()).collect();

        assert_eq!(grades, vec!["F", "A"]);
    }

    #[test]
    fn test_unresolved_course_is_dropped() {
        let p = payload(
            vec![record(1, "A"), record(99, "A"), record(99, "B")],
            vec![course(1, "CSC101", 3)],
        );

        let out = normalize(&p, DedupPolicy::LatestAttempt);

        assert_eq!(out.results.len(), 1);
        assert_eq!(out.results[0].course_code, "CSC101");
        assert_eq!(out.unresolved_course_ids, vec![99]);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let mut r = record(1, "Q");
        r.total_scores = None;
        r.level_id = 4;
        r.semester_id = 2;

        let out = normalize(&payload(vec![r], vec![course(1, "CSC401", 2)]), DedupPolicy::default());
        let result = &out.results[0];

        assert_eq!(result.grade_point, 0);
        assert_eq!(result.total_score, 0.0);
        assert_eq!(result.level, "Level 4");
        assert_eq!(result.semester, "Semester 2");
    }

    #[test]
    fn test_level_and_session_labels() {
        let mut from_table = record(1, "A");
        from_table.session_name = None;
        from_table.session_id = Some(7);
        let mut unknown = record(2, "A");
        unknown.session_name = None;
        unknown.session_id = Some(8);

        let mut p = payload(
            vec![from_table, unknown],
            vec![course(1, "CSC101", 3), course(2, "CSC102", 3)],
        );
        p.sessions = Table {
            data: vec![SessionInfo {
                id: Some(7),
                name: "2021/2022".to_string(),
            }],
        };

        let out = normalize(&p, DedupPolicy::LatestAttempt);

        assert_eq!(out.results[0].level, "100 Level");
        assert_eq!(out.results[0].session, "2021/2022");
        assert_eq!(out.results[1].session, "Session 8");
    }

    #[test]
    fn test_empty_payload() {
        let out = normalize(&RawPayload::default(), DedupPolicy::LatestAttempt);
        assert!(out.results.is_empty());
        assert!(out.unresolved_course_ids.is_empty());
    }

    #[test]
    fn test_record_without_course_id_is_dropped() {
        let mut orphan = record(1, "A");
        orphan.course_id = None;

        let out = normalize(
            &payload(vec![orphan, record(1, "B")], vec![course(1, "CSC101", 3)]),
            DedupPolicy::AllAttempts,
        );

        assert_eq!(out.results.len(), 1);
        assert_eq!(out.results[0].grade, "B");
        assert!(out.unresolved_course_ids.is_empty());
    }

    #[test]
    fn test_course_rows_without_id_or_code_are_ignored() {
        let no_code = course(2, "", 3);
        let mut no_id = course(3, "PHY101", 3);
        no_id.course_id = None;

        let out = normalize(
            &payload(
                vec![record(1, "A"), record(2, "A")],
                vec![course(1, "CSC101", 3), no_code, no_id],
            ),
            DedupPolicy::LatestAttempt,
        );

        assert_eq!(out.results.len(), 1);
        assert_eq!(out.results[0].course_code, "CSC101");
        assert_eq!(out.unresolved_course_ids, vec![2]);
    }
}
