//! Output formatting and persistence for cleaned results.
//!
//! Supports debug logging, a text transcript, and CSV export.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::results::types::CleanResults;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One CSV row per semester.
#[derive(Debug, Serialize)]
pub struct SemesterRow<'a> {
    pub student_id: i64,
    pub matric_number: &'a str,
    pub session: &'a str,
    pub semester: &'a str,
    pub level: &'a str,
    pub courses: usize,
    pub total_credits: u32,
    pub total_grade_points: u32,
    pub gpa: f64,
}

/// One CSV row per course result.
#[derive(Debug, Serialize)]
pub struct CourseRow<'a> {
    pub matric_number: &'a str,
    pub session: &'a str,
    pub semester: &'a str,
    pub course_code: &'a str,
    pub course_name: &'a str,
    pub credit_unit: u32,
    pub total_score: f64,
    pub grade: &'a str,
    pub grade_point: u32,
}

/// Logs results using Rust's debug pretty-print format.
pub fn print_pretty(results: &CleanResults) {
    debug!("{:#?}", results);
}

/// Renders a plain-text transcript: one block per semester, newest first,
/// followed by the cumulative line and any carry-overs.
pub fn render_transcript(results: &CleanResults) -> String {
    let mut out = format!(
        "Matric number: {}\nStudent ID: {}\n",
        results.matric_number, results.student_id
    );

    for semester in &results.semesters {
        out.push_str(&format!(
            "\n{} | {} | {}\n",
            semester.session, semester.semester, semester.level
        ));
        for course in &semester.courses {
            out.push_str(&format!(
                "  {:<10} {:<40} {:>2} units  {:>5.1}  {}\n",
                course.course_code,
                course.course_name,
                course.credit_unit,
                course.total_score,
                course.grade
            ));
        }
        out.push_str(&format!(
            "  GPA {:.2} ({} credits, {} points)\n",
            semester.gpa, semester.total_credits, semester.total_grade_points
        ));
    }

    let overall = &results.overall;
    out.push_str(&format!(
        "\nCGPA {:.2} - {} ({} credits, {} points)\n",
        overall.cgpa, overall.grade_class, overall.total_credits, overall.total_grade_points
    ));

    let failed = results.failed_courses();
    if !failed.is_empty() {
        out.push_str("\nCarry-overs:\n");
        for course in failed {
            out.push_str(&format!(
                "  {} {} ({}, {})\n",
                course.course_code, course.course_name, course.session, course.semester
            ));
        }
    }

    if results.is_partial() {
        out.push_str(&format!(
            "\nWarning: results for course ids {:?} were skipped (no course record)\n",
            results.unresolved_course_ids
        ));
    }

    out
}

/// Appends one row per semester to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_semesters(path: &str, results: &CleanResults) -> Result<()> {
    let rows = results.semesters.iter().map(|s| SemesterRow {
        student_id: results.student_id,
        matric_number: &results.matric_number,
        session: &s.session,
        semester: &s.semester,
        level: &s.level,
        courses: s.courses.len(),
        total_credits: s.total_credits,
        total_grade_points: s.total_grade_points,
        gpa: s.gpa,
    });
    append_rows(path, rows)
}

/// Appends one row per course result to a CSV file.
pub fn append_courses(path: &str, results: &CleanResults) -> Result<()> {
    let rows = results.all_results.iter().map(|r| CourseRow {
        matric_number: &results.matric_number,
        session: &r.session,
        semester: &r.semester,
        course_code: &r.course_code,
        course_name: &r.course_name,
        credit_unit: r.credit_unit,
        total_score: r.total_score,
        grade: &r.grade,
        grade_point: r.grade_point,
    });
    append_rows(path, rows)
}

fn append_rows<T: Serialize>(path: &str, rows: impl Iterator<Item = T>) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
