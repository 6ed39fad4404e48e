use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        student::{NewStudent, Student},
        user::AdminUser,
    },
};

/// The record store behind the directory: students plus the admin accounts
/// allowed to manage them.
///
/// Implementations are injected into `AppState` as `Arc<dyn DirectoryStore>`
/// so the import pipeline works the same against memory or PostgreSQL.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Returns every student in insertion order.
    async fn get_all(&self) -> Result<Vec<Student>>;

    /// Finds a student by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Student>>;

    /// Persists one student under a freshly assigned id.
    async fn create(&self, student: NewStudent) -> Result<Student>;

    /// Case-insensitive substring match against name, email, course and batch.
    async fn search(&self, needle: &str) -> Result<Vec<Student>>;

    /// Exact match on batch and/or course; `None` means "any".
    async fn filter(&self, batch: Option<&str>, course: Option<&str>) -> Result<Vec<Student>>;

    /// Removes every student.
    async fn clear_all(&self) -> Result<()>;

    /// Persists a batch of students, preserving order, each under a new id.
    async fn bulk_insert(&self, students: Vec<NewStudent>) -> Result<Vec<Student>>;

    /// Clears the collection and inserts `students` in its place.
    ///
    /// Must be atomic: no reader observes the cleared but not yet refilled
    /// collection, and a failed insert leaves the old collection intact.
    async fn replace_all(&self, students: Vec<NewStudent>) -> Result<Vec<Student>>;

    /// Finds an admin account by its exact username.
    async fn find_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>>;

    /// Creates an admin account.
    async fn create_admin(&self, username: &str, password: &str) -> Result<AdminUser>;
}

/// Returns `true` when `student` contains `needle_lower` (already lowercased)
/// in any of the searchable fields.
pub(crate) fn matches_search(student: &Student, needle_lower: &str) -> bool {
    [&student.name, &student.email, &student.course, &student.batch]
        .iter()
        .any(|field| field.to_lowercase().contains(needle_lower))
}

/// Returns `true` when `student` satisfies both optional exact-match filters.
pub(crate) fn matches_filter(student: &Student, batch: Option<&str>, course: Option<&str>) -> bool {
    batch.is_none_or(|b| student.batch == b) && course.is_none_or(|c| student.course == c)
}
