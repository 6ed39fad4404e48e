use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        student::{NewStudent, Student},
        user::AdminUser,
    },
    repositories::store::DirectoryStore,
};

const STUDENT_COLUMNS: &str = "id, name, email, course, batch, image_url, linkedin_url";

const INSERT_STUDENT: &str = r#"
    INSERT INTO students (id, name, email, course, batch, image_url, linkedin_url)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id, name, email, course, batch, image_url, linkedin_url
"#;

/// A `DirectoryStore` backed by PostgreSQL through a deadpool connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Wraps an existing pool. The schema must already exist (see `db::ensure_schema`).
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn select_students(
        &self,
        where_clause: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Student>> {
        let client = self.pool.get().await?;
        let query = format!(
            "SELECT {} FROM students {} ORDER BY seq",
            STUDENT_COLUMNS, where_clause
        );
        let stmt = client.prepare_cached(&query).await?;
        let rows = client.query(&stmt, params).await?;
        rows.iter().map(row_to_student).collect()
    }

    async fn insert_batch(&self, students: Vec<NewStudent>, clear_first: bool) -> Result<Vec<Student>> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        if clear_first {
            let deleted = tx.execute("DELETE FROM students", &[]).await?;
            tracing::debug!("🧹 Removed {} students before replace", deleted);
        }

        let stmt = tx.prepare_cached(INSERT_STUDENT).await?;
        let mut inserted = Vec::with_capacity(students.len());
        for student in students {
            let row = tx
                .query_one(
                    &stmt,
                    &[
                        &Uuid::new_v4(),
                        &student.name,
                        &student.email,
                        &student.course,
                        &student.batch,
                        &student.image_url,
                        &student.linkedin_url,
                    ],
                )
                .await?;
            inserted.push(row_to_student(&row)?);
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

/// Maps a `tokio_postgres::Row` to a `Student`.
fn row_to_student(row: &Row) -> Result<Student> {
    Ok(Student {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        course: row.try_get("course")?,
        batch: row.try_get("batch")?,
        image_url: row.try_get("image_url")?,
        linkedin_url: row.try_get("linkedin_url")?,
    })
}

/// Maps a `tokio_postgres::Row` to an `AdminUser`.
fn row_to_admin(row: &Row) -> Result<AdminUser> {
    Ok(AdminUser {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
    })
}

/// Escapes `LIKE` metacharacters so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl DirectoryStore for PgStore {
    async fn get_all(&self) -> Result<Vec<Student>> {
        self.select_students("", &[]).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Student>> {
        let client = self.pool.get().await?;
        let query = format!("SELECT {} FROM students WHERE id = $1", STUDENT_COLUMNS);
        let stmt = client.prepare_cached(&query).await?;
        let row = client.query_opt(&stmt, &[&id]).await?;
        row.as_ref().map(row_to_student).transpose()
    }

    async fn create(&self, student: NewStudent) -> Result<Student> {
        let mut inserted = self.insert_batch(vec![student], false).await?;
        inserted
            .pop()
            .ok_or_else(|| crate::error::AppError::Internal("Insert returned no row".to_string()))
    }

    async fn search(&self, needle: &str) -> Result<Vec<Student>> {
        let pattern = format!("%{}%", escape_like(needle));
        self.select_students(
            "WHERE name ILIKE $1 OR email ILIKE $1 OR course ILIKE $1 OR batch ILIKE $1",
            &[&pattern],
        )
        .await
    }

    async fn filter(&self, batch: Option<&str>, course: Option<&str>) -> Result<Vec<Student>> {
        self.select_students(
            "WHERE ($1::TEXT IS NULL OR batch = $1) AND ($2::TEXT IS NULL OR course = $2)",
            &[&batch, &course],
        )
        .await
    }

    async fn clear_all(&self) -> Result<()> {
        let client = self.pool.get().await?;
        let deleted = client.execute("DELETE FROM students", &[]).await?;
        tracing::info!("🧹 Cleared {} students", deleted);
        Ok(())
    }

    async fn bulk_insert(&self, students: Vec<NewStudent>) -> Result<Vec<Student>> {
        self.insert_batch(students, false).await
    }

    async fn replace_all(&self, students: Vec<NewStudent>) -> Result<Vec<Student>> {
        self.insert_batch(students, true).await
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, username, password
                FROM admin_users
                WHERE username = $1
                "#,
                &[&username],
            )
            .await?;
        row.as_ref().map(row_to_admin).transpose()
    }

    async fn create_admin(&self, username: &str, password: &str) -> Result<AdminUser> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                r#"
                INSERT INTO admin_users (id, username, password)
                VALUES ($1, $2, $3)
                RETURNING id, username, password
                "#,
                &[&Uuid::new_v4(), &username, &password],
            )
            .await?;
        row_to_admin(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
