use garde::Validate;

use crate::{
    ingest::columns::CandidateRecord,
    models::student::NewStudent,
};

/// A rejected row. `row_index` is zero-based; `message` already names the
/// row the way users count them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row_index: usize,
    pub message: String,
}

impl RowError {
    fn new(row_index: usize, reason: &str) -> Self {
        Self {
            row_index,
            message: format!("Row {}: {}", row_index + 1, reason),
        }
    }
}

/// Validates one normalized row.
///
/// # Arguments
///
/// * `candidate` - The normalized row.
/// * `row_index` - Zero-based position of the row among the data rows.
///
/// # Returns
///
/// The record ready for persistence, or the row's error message.
pub fn validate(candidate: CandidateRecord, row_index: usize) -> Result<NewStudent, RowError> {
    if candidate.name.trim().is_empty() {
        return Err(RowError::new(row_index, "Name is required"));
    }

    let student = NewStudent {
        name: candidate.name,
        email: candidate.email,
        course: candidate.course,
        batch: candidate.batch,
        image_url: candidate.image_url,
        linkedin_url: candidate.linkedin_url,
    };

    if let Err(report) = student.validate() {
        tracing::debug!("Row {} failed shape check: {}", row_index + 1, report);
        return Err(RowError::new(row_index, "Invalid data format"));
    }

    Ok(student)
}
