use garde::Validate;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::student::{NewStudent, SortKey, Student, StudentQuery},
    repositories::store::{DirectoryStore, matches_filter},
};

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Lists students for the public directory.
///
/// A search narrows by substring; batch and course filters are applied on
/// top of it when both are given.
pub async fn list(store: &dyn DirectoryStore, query: &StudentQuery) -> Result<Vec<Student>> {
    let search = non_blank(&query.search);
    let batch = non_blank(&query.batch);
    let course = non_blank(&query.course);

    let mut students = match search {
        Some(needle) => {
            let mut found = store.search(needle).await?;
            found.retain(|s| matches_filter(s, batch, course));
            found
        }
        None if batch.is_some() || course.is_some() => store.filter(batch, course).await?,
        None => store.get_all().await?,
    };

    if let Some(key) = query.sort_key() {
        sort_students(&mut students, key);
    }

    Ok(students)
}

/// Stable, case-insensitive sort on one column.
pub fn sort_students(students: &mut [Student], key: SortKey) {
    let column = |s: &Student| -> String {
        match key {
            SortKey::Name => s.name.to_lowercase(),
            SortKey::Batch => s.batch.to_lowercase(),
            SortKey::Course => s.course.to_lowercase(),
        }
    };
    students.sort_by_cached_key(column);
}

/// Fetches one student by the id string from the URL.
pub async fn get(store: &dyn DirectoryStore, id: &str) -> Result<Student> {
    let id = Uuid::parse_str(id).map_err(|_| AppError::NotFound("Student"))?;
    store.get_by_id(id).await?.ok_or(AppError::NotFound("Student"))
}

/// Creates a single student from a validated payload.
pub async fn create(store: &dyn DirectoryStore, student: NewStudent) -> Result<Student> {
    if student.name.trim().is_empty() || student.validate().is_err() {
        return Err(AppError::Validation("Invalid student data".to_string()));
    }

    let created = store.create(student).await?;
    tracing::info!("✅ Student created: {}", created.id);
    Ok(created)
}
