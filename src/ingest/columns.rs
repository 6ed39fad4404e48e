//! Mapping of arbitrary spreadsheet headers onto the student record shape.

use crate::ingest::tabular::RawRow;

/// Header spellings tried for each field, in priority order.
pub const NAME_HEADERS: &[&str] = &["name", "Name", "student_name", "Student Name"];
pub const EMAIL_HEADERS: &[&str] = &["email", "Email", "student_email", "Student Email"];
pub const COURSE_HEADERS: &[&str] = &["course", "Course", "program", "Program", "branch", "Branch"];
pub const BATCH_HEADERS: &[&str] = &["batch", "Batch", "year", "Year", "cohort", "Cohort"];
pub const IMAGE_URL_HEADERS: &[&str] = &["imageUrl", "image_url", "photo", "Photo"];
pub const LINKEDIN_URL_HEADERS: &[&str] = &[
    "linkedinUrl",
    "linkedin_url",
    "linkedin",
    "LinkedIn",
    "profile",
    "Profile",
];

/// Domain used for synthesized email addresses.
const FALLBACK_EMAIL_DOMAIN: &str = "university.edu";

/// Values used when a row has no course or batch column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDefaults {
    pub course: String,
    pub batch: String,
}

/// A normalized row that has not been validated yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub name: String,
    pub email: String,
    pub course: String,
    pub batch: String,
    pub image_url: String,
    pub linkedin_url: String,
}

/// Returns the first non-empty cell among `headers`.
fn first_present<'a>(row: &'a RawRow, headers: &[&str]) -> Option<&'a str> {
    headers
        .iter()
        .filter_map(|header| row.get(header))
        .find(|value| !value.is_empty())
}

/// `"Jane  Doe"` → `"jane.doe@university.edu"`.
fn synthesize_email(name: &str) -> String {
    let local = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".")
        .to_lowercase();
    format!("{}@{}", local, FALLBACK_EMAIL_DOMAIN)
}

/// Maps one raw row onto the canonical fields. Never fails; rejecting rows
/// is the validator's job.
pub fn normalize(row: &RawRow, defaults: &ImportDefaults) -> CandidateRecord {
    let name = first_present(row, NAME_HEADERS).unwrap_or_default().to_string();

    let email = match first_present(row, EMAIL_HEADERS) {
        Some(email) => email.to_string(),
        None if !name.trim().is_empty() => synthesize_email(&name),
        None => String::new(),
    };

    CandidateRecord {
        email,
        course: first_present(row, COURSE_HEADERS)
            .map(str::to_string)
            .unwrap_or_else(|| defaults.course.clone()),
        batch: first_present(row, BATCH_HEADERS)
            .map(str::to_string)
            .unwrap_or_else(|| defaults.batch.clone()),
        image_url: first_present(row, IMAGE_URL_HEADERS)
            .unwrap_or_default()
            .to_string(),
        linkedin_url: first_present(row, LINKEDIN_URL_HEADERS)
            .unwrap_or_default()
            .to_string(),
        name,
    }
}
