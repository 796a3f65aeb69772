use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::db::models::Role;
use crate::error::AppError;
use crate::AppState;

/// Every assignment in the student's classrooms, ordered by due date, with the
/// student's own submission joined in when one exists.
pub async fn list_student_assignments(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    user.require_role(Role::Student)?;

    let assignments = state.db.assignments_for_student(user.user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": assignments
    })))
}
