use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use std::fmt;

/// Account role. Fixed at registration, drives authorization on protected routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Role> {
        match s {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted user record. The password hash never leaves this layer; wire-facing
/// representations are built from the other fields.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub grade: Option<String>,
    pub section: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role_str: String = row.try_get("role")?;
        let role = Role::from_str(&role_str).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "role".into(),
            source: format!("unknown role `{}`", role_str).into(),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            role,
            grade: row.try_get("grade")?,
            section: row.try_get("section")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Insert payload for the users table. `password_hash` is already bcrypt output.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub grade: Option<String>,
    pub section: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    pub id: i32,
    pub name: String,
    pub subject: String,
    pub grade: String,
    pub teacher_id: i32,
    pub class_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A teacher's classroom with its enrollment count.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomSummary {
    pub id: i32,
    pub name: String,
    pub subject: String,
    pub grade: String,
    pub class_code: String,
    pub created_at: DateTime<Utc>,
    pub student_count: i64,
}

/// A classroom as seen by an enrolled student.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentClassroom {
    pub id: i32,
    pub name: String,
    pub subject: String,
    pub grade: String,
    pub class_code: String,
    pub teacher_name: String,
    pub joined_at: DateTime<Utc>,
    pub student_count: i64,
}

/// An assignment in one of the student's classrooms, joined with the student's
/// own submission state when present.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentAssignment {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub classroom_id: i32,
    pub classroom_name: String,
    pub due_date: DateTime<Utc>,
    pub max_points: i32,
    pub submitted: bool,
    pub submission_status: Option<String>,
    pub grade: Option<i32>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherStats {
    pub classrooms: i64,
    pub assignments: i64,
    pub pending_grading: i64,
    pub new_messages: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub classrooms: i64,
    pub new_assignments: i64,
    pub submitted_assignments: i64,
    pub new_messages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("principal"), None);
        assert_eq!(Role::from_str("Student"), None);
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"teacher\"");
        let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }
}
