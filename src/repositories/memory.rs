use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        student::{NewStudent, Student},
        user::AdminUser,
    },
    repositories::store::{DirectoryStore, matches_filter, matches_search},
};

#[derive(Default)]
struct Tables {
    students: Vec<Student>,
    admins: Vec<AdminUser>,
}

/// A process-local `DirectoryStore`.
///
/// Students are kept in insertion order; every mutation takes the write lock
/// once, which makes `replace_all` atomic with respect to other requests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the sample roster.
    pub fn with_sample_roster() -> Self {
        let students = sample_roster()
            .into_iter()
            .map(|s| s.into_student(Uuid::new_v4()))
            .collect();

        Self {
            tables: RwLock::new(Tables {
                students,
                admins: Vec::new(),
            }),
        }
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn get_all(&self) -> Result<Vec<Student>> {
        Ok(self.tables.read().await.students.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Student>> {
        let tables = self.tables.read().await;
        Ok(tables.students.iter().find(|s| s.id == id).cloned())
    }

    async fn create(&self, student: NewStudent) -> Result<Student> {
        let student = student.into_student(Uuid::new_v4());
        self.tables.write().await.students.push(student.clone());
        Ok(student)
    }

    async fn search(&self, needle: &str) -> Result<Vec<Student>> {
        let needle = needle.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .iter()
            .filter(|s| matches_search(s, &needle))
            .cloned()
            .collect())
    }

    async fn filter(&self, batch: Option<&str>, course: Option<&str>) -> Result<Vec<Student>> {
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .iter()
            .filter(|s| matches_filter(s, batch, course))
            .cloned()
            .collect())
    }

    async fn clear_all(&self) -> Result<()> {
        self.tables.write().await.students.clear();
        Ok(())
    }

    async fn bulk_insert(&self, students: Vec<NewStudent>) -> Result<Vec<Student>> {
        let inserted: Vec<Student> = students
            .into_iter()
            .map(|s| s.into_student(Uuid::new_v4()))
            .collect();

        self.tables.write().await.students.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn replace_all(&self, students: Vec<NewStudent>) -> Result<Vec<Student>> {
        let inserted: Vec<Student> = students
            .into_iter()
            .map(|s| s.into_student(Uuid::new_v4()))
            .collect();

        let mut tables = self.tables.write().await;
        tables.students.clear();
        tables.students.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        let tables = self.tables.read().await;
        Ok(tables.admins.iter().find(|a| a.username == username).cloned())
    }

    async fn create_admin(&self, username: &str, password: &str) -> Result<AdminUser> {
        let mut tables = self.tables.write().await;
        if tables.admins.iter().any(|a| a.username == username) {
            return Err(AppError::Validation(format!(
                "Admin '{}' already exists",
                username
            )));
        }

        let admin = AdminUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password: password.to_string(),
        };
        tables.admins.push(admin.clone());
        Ok(admin)
    }
}

fn sample(name: &str, course: &str, batch: &str, photo: &str) -> NewStudent {
    let slug = name.to_lowercase().replace(' ', "-");
    NewStudent {
        name: name.to_string(),
        email: format!("{}@university.edu", name.to_lowercase().replace(' ', ".")),
        course: course.to_string(),
        batch: batch.to_string(),
        image_url: format!(
            "https://images.unsplash.com/photo-{}?ixlib=rb-4.0.3&auto=format&fit=crop&w=300&h=300",
            photo
        ),
        linkedin_url: format!("https://linkedin.com/in/{}", slug),
    }
}

/// The demo roster shown by a fresh in-memory deployment.
pub fn sample_roster() -> Vec<NewStudent> {
    vec![
        sample("Arjun Sharma", "MCA", "2024-2026", "1507003211169-0a1dd7228f2d"),
        sample("Priya Patel", "MCA", "2024-2026", "1494790108755-2616c5e04c47"),
        sample("Rajesh Kumar", "MCA", "2024-2026", "1472099645785-5658abf4ff4e"),
        sample("Sneha Gupta", "MCA", "2024-2026", "1438761681033-6461ffad8d80"),
        sample("Vikash Singh", "MCA", "2024-2026", "1500648767791-00dcc994a43e"),
        sample("Anita Desai", "MCA", "2024-2026", "1487412720507-e7ab37603c6f"),
        sample("Rohit Verma", "MCA", "2024-2026", "1506794778202-cad84cf45f1d"),
        sample("Kavya Sharma", "MCA", "2024-2026", "1544005313-94ddf0286df2"),
        sample("Amit Jain", "MCA", "2023-2025", "1519345182560-3f2917c472ef"),
        sample("Pooja Mehta", "MCA", "2023-2025", "1517841905240-472988babdf9"),
        sample("Ravi Agarwal", "MBA", "2024-2026", "1520813792240-56fc4a3765a7"),
        sample("Neha Kapoor", "M.Tech", "2024-2026", "1508214751196-bcfd4ca60f91"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_student(name: &str, course: &str, batch: &str) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            email: String::new(),
            course: course.to_string(),
            batch: batch.to_string(),
            image_url: String::new(),
            linkedin_url: String::new(),
        }
    }

    #[tokio::test]
    async fn bulk_insert_assigns_unique_ids_in_order() {
        let store = MemoryStore::new();
        let inserted = store
            .bulk_insert(vec![
                new_student("Asha", "MBA", "2024-2026"),
                new_student("Ravi", "MCA", "2023-2025"),
            ])
            .await
            .unwrap();

        assert_eq!(inserted.len(), 2);
        assert_ne!(inserted[0].id, inserted[1].id);

        let all = store.get_all().await.unwrap();
        assert_eq!(all, inserted);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_fields() {
        let store = MemoryStore::new();
        store
            .bulk_insert(vec![
                new_student("Asha Rao", "MBA", "2024-2026"),
                new_student("Ravi", "MCA", "2023-2025"),
            ])
            .await
            .unwrap();

        let by_name = store.search("ASHA").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Asha Rao");

        let by_batch = store.search("2023").await.unwrap();
        assert_eq!(by_batch.len(), 1);
        assert_eq!(by_batch[0].name, "Ravi");
    }

    #[tokio::test]
    async fn filter_combines_batch_and_course() {
        let store = MemoryStore::new();
        store
            .bulk_insert(vec![
                new_student("A", "MCA", "2024-2026"),
                new_student("B", "MBA", "2024-2026"),
                new_student("C", "MCA", "2023-2025"),
            ])
            .await
            .unwrap();

        let mca = store.filter(None, Some("MCA")).await.unwrap();
        assert_eq!(mca.len(), 2);

        let both = store.filter(Some("2024-2026"), Some("MCA")).await.unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].name, "A");

        let any = store.filter(None, None).await.unwrap();
        assert_eq!(any.len(), 3);
    }

    #[tokio::test]
    async fn replace_all_swaps_the_collection() {
        let store = MemoryStore::with_sample_roster();
        assert_eq!(store.get_all().await.unwrap().len(), 12);

        let replaced = store
            .replace_all(vec![new_student("Only", "MCA", "2024-2026")])
            .await
            .unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all, replaced);
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_admin_is_rejected() {
        let store = MemoryStore::new();
        store.create_admin("admin", "admin123").await.unwrap();

        assert!(store.create_admin("admin", "other").await.is_err());
        let admin = store.find_admin_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.password, "admin123");
        assert!(store.find_admin_by_username("Admin").await.unwrap().is_none());
    }
}
