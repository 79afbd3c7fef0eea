//! Roster repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the roster read path the recorder validates identities
//!   against, plus the admin CRUD surface.
//!
//! # Invariants
//! - `usn` is unique; duplicate enrollment surfaces as `Conflict`.
//! - Lookups normalize the USN the same way writes do.

use crate::model::student::{normalize_usn, Student, StudentId};
use crate::repo::{is_constraint_violation, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const STUDENT_SELECT_SQL: &str = "SELECT uuid, usn, name, course FROM students";

/// Repository interface for roster access.
pub trait StudentRepository {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId>;
    fn find_by_usn(&self, usn: &str) -> RepoResult<Option<Student>>;
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    fn delete_student(&self, usn: &str) -> RepoResult<()>;
}

/// SQLite-backed roster repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId> {
        student.validate()?;

        let result = self.conn.execute(
            "INSERT INTO students (uuid, usn, name, course) VALUES (?1, ?2, ?3, ?4);",
            params![
                student.id.to_string(),
                student.usn.as_str(),
                student.name.as_str(),
                student.course.as_str(),
            ],
        );

        match result {
            Ok(_) => Ok(student.id),
            Err(err) if is_constraint_violation(&err) => Err(RepoError::Conflict),
            Err(err) => Err(err.into()),
        }
    }

    fn find_by_usn(&self, usn: &str) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE usn = ?1;"))?;

        let mut rows = stmt.query(params![normalize_usn(usn)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY usn ASC;"))?;

        let mut students = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn delete_student(&self, usn: &str) -> RepoResult<()> {
        let normalized = normalize_usn(usn);
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE usn = ?1;", params![normalized])?;

        if changed == 0 {
            return Err(RepoError::NotFound(format!("student {normalized}")));
        }

        Ok(())
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let raw_uuid: String = row.get(0)?;
    let id = Uuid::parse_str(&raw_uuid)
        .map_err(|err| RepoError::InvalidData(format!("student uuid `{raw_uuid}`: {err}")))?;

    Ok(Student {
        id,
        usn: row.get(1)?,
        name: row.get(2)?,
        course: row.get(3)?,
    })
}
