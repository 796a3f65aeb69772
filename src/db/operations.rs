use crate::db::models::{
    Classroom, ClassroomSummary, NewUser, Role, StudentAssignment, StudentClassroom, StudentStats,
    TeacherStats, User,
};
use crate::error::{AppError, DatabaseError};
use sqlx::PgPool;
use std::sync::Arc;

/// Data access layer over the shared connection pool. Cheap to clone; every
/// worker holds the same pool.
#[derive(Clone)]
pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Inserts a new user. The UNIQUE constraint on `username` is the sole
    /// arbiter for concurrent duplicate registrations: exactly one insert wins,
    /// the rest surface as `DuplicateUsername`.
    pub async fn create_user(&self, new: &NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, username, password_hash, role, grade, section)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, full_name, username, password_hash, role, grade, section, is_active, created_at
            "#,
        )
        .bind(&new.full_name)
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .bind(&new.grade)
        .bind(&new.section)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Database(DatabaseError::Duplicate) => AppError::DuplicateUsername,
            other => other,
        })?;

        Ok(user)
    }

    /// Role is part of the lookup key: a username never authenticates under a
    /// role it was not registered with.
    pub async fn find_user_by_username_and_role(
        &self,
        username: &str,
        role: Role,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, full_name, username, password_hash, role, grade, section, is_active, created_at
             FROM users WHERE username = $1 AND role = $2",
        )
        .bind(username)
        .bind(role.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    pub async fn create_classroom(
        &self,
        teacher_id: i32,
        name: &str,
        subject: &str,
        grade: &str,
        class_code: &str,
    ) -> Result<Classroom, AppError> {
        let classroom = sqlx::query_as::<_, Classroom>(
            r#"
            INSERT INTO classrooms (name, subject, grade, teacher_id, class_code)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, subject, grade, teacher_id, class_code, is_active, created_at
            "#,
        )
        .bind(name)
        .bind(subject)
        .bind(grade)
        .bind(teacher_id)
        .bind(class_code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(classroom)
    }

    pub async fn classrooms_for_teacher(
        &self,
        teacher_id: i32,
    ) -> Result<Vec<ClassroomSummary>, AppError> {
        let classrooms = sqlx::query_as::<_, ClassroomSummary>(
            r#"
            SELECT c.id, c.name, c.subject, c.grade, c.class_code, c.created_at,
                   COUNT(cm.user_id) AS student_count
            FROM classrooms c
            LEFT JOIN class_members cm ON c.id = cm.classroom_id
            WHERE c.teacher_id = $1
            GROUP BY c.id
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(teacher_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(classrooms)
    }

    pub async fn find_classroom_by_code(
        &self,
        class_code: &str,
    ) -> Result<Option<Classroom>, AppError> {
        let classroom = sqlx::query_as::<_, Classroom>(
            "SELECT id, name, subject, grade, teacher_id, class_code, is_active, created_at
             FROM classrooms WHERE class_code = $1",
        )
        .bind(class_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(classroom)
    }

    pub async fn is_class_member(
        &self,
        classroom_id: i32,
        user_id: i32,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM class_members WHERE classroom_id = $1 AND user_id = $2)",
        )
        .bind(classroom_id)
        .bind(user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    /// Enrollment is guarded by the (classroom_id, user_id) UNIQUE constraint,
    /// so a racing double join still results in a single membership row.
    pub async fn add_class_member(&self, classroom_id: i32, user_id: i32) -> Result<(), AppError> {
        sqlx::query("INSERT INTO class_members (classroom_id, user_id) VALUES ($1, $2)")
            .bind(classroom_id)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    pub async fn classrooms_for_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<StudentClassroom>, AppError> {
        let classrooms = sqlx::query_as::<_, StudentClassroom>(
            r#"
            SELECT c.id, c.name, c.subject, c.grade, c.class_code,
                   u.full_name AS teacher_name, cm.joined_at,
                   (SELECT COUNT(*) FROM class_members m WHERE m.classroom_id = c.id) AS student_count
            FROM classrooms c
            JOIN class_members cm ON c.id = cm.classroom_id
            JOIN users u ON c.teacher_id = u.id
            WHERE cm.user_id = $1
            ORDER BY cm.joined_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(classrooms)
    }

    pub async fn assignments_for_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<StudentAssignment>, AppError> {
        let assignments = sqlx::query_as::<_, StudentAssignment>(
            r#"
            SELECT a.id, a.title, a.description, a.classroom_id, c.name AS classroom_name,
                   a.due_date, a.max_points,
                   (s.id IS NOT NULL) AS submitted,
                   s.status AS submission_status, s.grade, s.submitted_at
            FROM assignments a
            JOIN class_members cm ON a.classroom_id = cm.classroom_id
            JOIN classrooms c ON a.classroom_id = c.id
            LEFT JOIN submissions s ON a.id = s.assignment_id AND s.student_id = $1
            WHERE cm.user_id = $1
            ORDER BY a.due_date ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(assignments)
    }

    pub async fn teacher_stats(&self, teacher_id: i32) -> Result<TeacherStats, AppError> {
        let classrooms = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM classrooms WHERE teacher_id = $1",
        )
        .bind(teacher_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        let assignments = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM assignments WHERE teacher_id = $1 AND due_date > NOW()",
        )
        .bind(teacher_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        let pending_grading = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM submissions s
            JOIN assignments a ON s.assignment_id = a.id
            WHERE a.teacher_id = $1 AND s.status = 'submitted'
            "#,
        )
        .bind(teacher_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(TeacherStats {
            classrooms,
            assignments,
            pending_grading,
            new_messages: 0,
        })
    }

    pub async fn student_stats(&self, student_id: i32) -> Result<StudentStats, AppError> {
        let classrooms = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM class_members WHERE user_id = $1",
        )
        .bind(student_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        let new_assignments = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM assignments a
            JOIN class_members cm ON a.classroom_id = cm.classroom_id
            WHERE cm.user_id = $1 AND a.due_date > NOW()
            AND NOT EXISTS (
                SELECT 1 FROM submissions s
                WHERE s.assignment_id = a.id AND s.student_id = $1
            )
            "#,
        )
        .bind(student_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        let submitted_assignments = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM submissions WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(StudentStats {
            classrooms,
            new_assignments,
            submitted_assignments,
            new_messages: 0,
        })
    }
}
