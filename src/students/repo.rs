use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use time::OffsetDateTime;

use crate::students::forms::Course;
use crate::students::password;

/// Postgres SQLSTATE for a unique-constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a student with that email address already exists")]
    Conflict,
    #[error("student not found")]
    NotFound,
    #[error(transparent)]
    Unhandled(anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::Conflict
            }
            _ => StoreError::Unhandled(e.into()),
        }
    }
}

/// Student record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub course: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 hash, never rendered or exposed
    pub created_at: OffsetDateTime,
}

/// Fields for a new record. Text is expected pre-normalized by the form
/// layer; the plaintext password is hashed here and dropped.
#[derive(Debug)]
pub struct NewStudent<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub address: &'a str,
    pub course: Course,
    pub password: &'a str,
}

/// Mutable fields for an existing record. The password and id are
/// immutable after creation.
#[derive(Debug)]
pub struct StudentChanges<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub address: &'a str,
    pub course: Course,
}

const STUDENT_COLUMNS: &str = "id, name, email, address, course, password_hash, created_at";

impl Student {
    /// Inserts a new student. The UNIQUE index on email makes the
    /// existence check and the insert one atomic step, so two concurrent
    /// creates with the same email cannot both succeed.
    pub async fn create(db: &PgPool, new: NewStudent<'_>) -> Result<Student, StoreError> {
        let hash = password::hash_password(new.password).map_err(StoreError::Unhandled)?;
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (name, email, address, course, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, address, course, password_hash, created_at
            "#,
        )
        .bind(new.name)
        .bind(new.email)
        .bind(new.address)
        .bind(new.course.as_str())
        .bind(&hash)
        .fetch_one(db)
        .await?;
        Ok(student)
    }

    pub async fn get_by_id(db: &PgPool, id: i64) -> Result<Student, StoreError> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(StoreError::NotFound)?;
        Ok(student)
    }

    /// All students in creation order; id breaks ties between rows
    /// created in the same instant.
    pub async fn list_all(db: &PgPool) -> Result<Vec<Student>, StoreError> {
        let rows = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Updates name/email/address/course in place. A single UPDATE, so a
    /// constraint failure rolls the whole effect back; the unchanged row
    /// never conflicts with its own email.
    pub async fn update(
        db: &PgPool,
        id: i64,
        changes: StudentChanges<'_>,
    ) -> Result<Student, StoreError> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            UPDATE students
            SET name = $2, email = $3, address = $4, course = $5
            WHERE id = $1
            RETURNING id, name, email, address, course, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.address)
        .bind(changes.course.as_str())
        .fetch_optional(db)
        .await?
        .ok_or(StoreError::NotFound)?;
        Ok(student)
    }

    pub async fn delete(db: &PgPool, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// One-way password check. There is no accessor for the plaintext;
    /// the hash stays inside the store boundary.
    pub fn verify_password(&self, candidate: &str) -> anyhow::Result<bool> {
        password::verify_password(candidate, &self.password_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_student_hides_the_password_hash() {
        let student = Student {
            id: 1,
            name: "Ada Lovelace".into(),
            email: "Ada@x.com".into(),
            address: "10 Street".into(),
            course: "Python".into(),
            password_hash: "$argon2id$fake".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&student).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(json.contains("Ada@x.com"));
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn other_sqlx_errors_stay_unhandled() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StoreError::Unhandled(_)));
    }
}
