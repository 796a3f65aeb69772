use actix_web::{web, HttpResponse};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::db::models::Role;
use crate::error::{AppError, DatabaseError};
use crate::AppState;

const JOIN_CODE_LEN: usize = 6;
const JOIN_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Short uppercase code students type to enroll in a classroom.
pub fn generate_join_code() -> String {
    let mut rng = rand::thread_rng();
    (0..JOIN_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..JOIN_CODE_CHARSET.len());
            JOIN_CODE_CHARSET[idx] as char
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct CreateClassroomRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub grade: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClassroomRequest {
    #[serde(default)]
    pub class_code: String,
}

pub async fn create_classroom(
    user: AuthenticatedUser,
    req: web::Json<CreateClassroomRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    user.require_role(Role::Teacher)?;

    let name = req.name.trim();
    let subject = req.subject.trim();
    let grade = req.grade.trim();
    if name.is_empty() || subject.is_empty() || grade.is_empty() {
        return Err(AppError::Validation(
            "name, subject and grade are required".to_string(),
        ));
    }

    // Codes are drawn at random; on the rare collision with the UNIQUE
    // constraint, draw again.
    for _ in 0..3 {
        let code = generate_join_code();
        match state
            .db
            .create_classroom(user.user_id, name, subject, grade, &code)
            .await
        {
            Ok(classroom) => {
                info!(
                    "classroom {} created by {} with code {}",
                    classroom.id, user.username, classroom.class_code
                );
                return Ok(HttpResponse::Ok().json(json!({
                    "success": true,
                    "message": "Classroom created successfully",
                    "data": classroom
                })));
            }
            Err(AppError::Database(DatabaseError::Duplicate)) => continue,
            Err(e) => return Err(e),
        }
    }

    Err(AppError::Internal(
        "could not allocate a unique class code".to_string(),
    ))
}

pub async fn list_teacher_classrooms(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    user.require_role(Role::Teacher)?;

    let classrooms = state.db.classrooms_for_teacher(user.user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": classrooms
    })))
}

pub async fn join_classroom(
    user: AuthenticatedUser,
    req: web::Json<JoinClassroomRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    user.require_role(Role::Student)?;

    let code = req.class_code.trim().to_uppercase();
    if code.is_empty() {
        return Err(AppError::Validation("classCode is required".to_string()));
    }

    let classroom = state
        .db
        .find_classroom_by_code(&code)
        .await?
        .ok_or_else(|| AppError::Validation("Unknown class code".to_string()))?;

    if state.db.is_class_member(classroom.id, user.user_id).await? {
        return Err(AppError::Validation(
            "Already a member of this classroom".to_string(),
        ));
    }

    match state.db.add_class_member(classroom.id, user.user_id).await {
        Ok(()) => {}
        // A racing double join loses to the membership UNIQUE constraint.
        Err(AppError::Database(DatabaseError::Duplicate)) => {
            return Err(AppError::Validation(
                "Already a member of this classroom".to_string(),
            ));
        }
        Err(e) => return Err(e),
    }

    info!("student {} joined classroom {}", user.username, classroom.id);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Joined classroom successfully"
    })))
}

pub async fn list_student_classrooms(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    user.require_role(Role::Student)?;

    let classrooms = state.db.classrooms_for_student(user.user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": classrooms
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_code_shape() {
        for _ in 0..50 {
            let code = generate_join_code();
            assert_eq!(code.len(), JOIN_CODE_LEN);
            assert!(code.bytes().all(|b| JOIN_CODE_CHARSET.contains(&b)));
        }
    }
}
