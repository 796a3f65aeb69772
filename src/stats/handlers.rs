use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::db::models::Role;
use crate::error::AppError;
use crate::AppState;

pub async fn teacher_stats(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    user.require_role(Role::Teacher)?;

    let stats = state.db.teacher_stats(user.user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": stats
    })))
}

pub async fn student_stats(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    user.require_role(Role::Student)?;

    let stats = state.db.student_stats(user.user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": stats
    })))
}
