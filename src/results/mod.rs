//! Student results cleaning and GPA computation.
//!
//! Raw upstream records are resolved against the course and level tables,
//! repeat attempts are collapsed, and the survivors are grouped per semester
//! to produce GPA, CGPA and a degree classification.

pub mod aggregate;
pub mod grade;
pub mod normalize;
pub mod types;
pub mod utility;

pub use aggregate::clean_results;
pub use grade::GradeClass;
pub use normalize::DedupPolicy;
