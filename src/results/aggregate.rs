use std::collections::HashMap;

use tracing::info;

use crate::results::grade::GradeClass;
use crate::results::normalize::{DedupPolicy, normalize};
use crate::results::types::{
    CleanResults, NormalizedResult, OverallSummary, RawPayload, SemesterSummary,
};
use crate::results::utility::weighted_gpa;

/// Groups results by (session, semester) and computes a GPA per group.
///
/// Groups are returned most recent first: session label descending, then
/// semester label descending.
pub fn summarize_semesters(results: &[NormalizedResult]) -> Vec<SemesterSummary> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<SemesterSummary> = Vec::new();

    for result in results {
        let key = (result.session.as_str(), result.semester.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(SemesterSummary {
                semester: result.semester.clone(),
                session: result.session.clone(),
                level: result.level.clone(),
                total_credits: 0,
                total_grade_points: 0,
                gpa: 0.0,
                courses: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.total_credits += result.credit_unit;
        group.total_grade_points += result.weighted_points();
        group.courses.push(result.clone());
    }

    for group in &mut groups {
        group.gpa = weighted_gpa(group.total_grade_points, group.total_credits);
    }

    groups.sort_by(|a, b| {
        b.session
            .cmp(&a.session)
            .then_with(|| b.semester.cmp(&a.semester))
    });
    groups
}

/// Folds semester totals into the cumulative summary.
pub fn summarize_overall(semesters: &[SemesterSummary]) -> OverallSummary {
    let total_credits = semesters.iter().map(|s| s.total_credits).sum();
    let total_grade_points = semesters.iter().map(|s| s.total_grade_points).sum();
    let cgpa = weighted_gpa(total_grade_points, total_credits);

    OverallSummary {
        total_credits,
        total_grade_points,
        cgpa,
        grade_class: GradeClass::from_cgpa(cgpa),
    }
}

/// Runs the whole pipeline: normalize, group by semester, accumulate CGPA.
pub fn clean_results(payload: &RawPayload, policy: DedupPolicy) -> CleanResults {
    let normalized = normalize(payload, policy);
    let semesters = summarize_semesters(&normalized.results);
    let overall = summarize_overall(&semesters);

    let first = payload.student_result.first();
    let student_id = first.and_then(|r| r.student_id).unwrap_or(0);
    let matric_number = first.and_then(|r| r.mat_no.clone()).unwrap_or_default();

    info!(
        student_id,
        semesters = semesters.len(),
        courses = normalized.results.len(),
        cgpa = overall.cgpa,
        class = %overall.grade_class,
        "Results aggregated"
    );

    CleanResults {
        student_id,
        matric_number,
        overall,
        semesters,
        all_results: normalized.results,
        unresolved_course_ids: normalized.unresolved_course_ids,
    }
}
