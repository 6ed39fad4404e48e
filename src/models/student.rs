use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a student in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// The unique identifier for the student.
    pub id: Uuid,
    /// The student's full name. Never empty.
    pub name: String,
    /// The student's email address.
    pub email: String,
    /// The course or program the student is enrolled in.
    pub course: String,
    /// The batch (cohort years) the student belongs to.
    pub batch: String,
    /// URL of the profile photo, possibly empty.
    pub image_url: String,
    /// URL of the LinkedIn profile, possibly empty.
    pub linkedin_url: String,
}

/// A student that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    #[garde(length(min = 1, max = 256))]
    pub name: String,
    #[garde(length(max = 2048))]
    pub email: String,
    #[garde(length(max = 2048))]
    pub course: String,
    #[garde(length(max = 2048))]
    pub batch: String,
    #[serde(default)]
    #[garde(length(max = 2048))]
    pub image_url: String,
    #[serde(default)]
    #[garde(length(max = 2048))]
    pub linkedin_url: String,
}

impl NewStudent {
    /// Turns the pending record into a stored one under the given id.
    pub fn into_student(self, id: Uuid) -> Student {
        Student {
            id,
            name: self.name,
            email: self.email,
            course: self.course,
            batch: self.batch,
            image_url: self.image_url,
            linkedin_url: self.linkedin_url,
        }
    }
}

/// Column a student listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Batch,
    Course,
}

impl SortKey {
    /// Parses the `sort` query value. Unrecognised values yield `None`.
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim() {
            "name" => Some(SortKey::Name),
            "batch" => Some(SortKey::Batch),
            "course" => Some(SortKey::Course),
            _ => None,
        }
    }
}

/// Query parameters accepted by the listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentQuery {
    pub search: Option<String>,
    pub batch: Option<String>,
    pub course: Option<String>,
    /// Kept as text so an unknown column leaves the listing unsorted.
    pub sort: Option<String>,
}

impl StudentQuery {
    /// The requested sort column, if it names one.
    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort.as_deref().and_then(SortKey::from_param)
    }
}
