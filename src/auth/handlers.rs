use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::auth::guard::AuthenticatedUser;
use crate::auth::service::Registration;
use crate::db::models::{Role, User};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    pub grade: Option<String>,
    pub section: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

/// A user as it appears on the wire: everything except the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: i32,
    pub full_name: String,
    pub username: String,
    pub role: Role,
    pub grade: Option<String>,
    pub section: Option<String>,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            username: user.username.clone(),
            role: user.role,
            grade: user.grade.clone(),
            section: user.section.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: UserPublic,
    pub token: String,
}

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let registration = validate_register(&req)?;
    info!("registration request for username {}", registration.username);

    let (user, token) = state.auth.register(registration).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Account created successfully",
        "data": AuthData {
            user: UserPublic::from(&user),
            token,
        }
    })))
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (username, password, role) = validate_login(&req)?;
    info!("login request for username {}", username);

    let (user, token) = state.auth.login(username, password, role).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Logged in successfully",
        "data": AuthData {
            user: UserPublic::from(&user),
            token,
        }
    })))
}

/// Echoes the identity the guard decoded from the bearer token.
pub async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
            "userId": user.user_id,
            "username": user.username,
            "role": user.role,
        }
    }))
}

/// Shape validation for registration. Runs before any storage mutation; a
/// request that fails here has no side effects.
fn validate_register(req: &RegisterRequest) -> Result<Registration, AppError> {
    let full_name = req.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::Validation("fullName is required".to_string()));
    }

    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }
    if username.chars().count() < 3 {
        return Err(AppError::Validation(
            "username must be at least 3 characters".to_string(),
        ));
    }

    if req.password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }

    let role = parse_role(&req.role)?;

    let grade = normalize(&req.grade);
    let section = normalize(&req.section);
    if role == Role::Student {
        if grade.is_none() {
            return Err(AppError::Validation(
                "grade is required for student accounts".to_string(),
            ));
        }
        if section.is_none() {
            return Err(AppError::Validation(
                "section is required for student accounts".to_string(),
            ));
        }
    }

    Ok(Registration {
        full_name: full_name.to_string(),
        username: username.to_string(),
        password: req.password.clone(),
        role,
        grade,
        section,
    })
}

fn validate_login(req: &LoginRequest) -> Result<(&str, &str, Role), AppError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }
    if req.password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }
    let role = parse_role(&req.role)?;

    Ok((username, req.password.as_str(), role))
}

fn parse_role(raw: &str) -> Result<Role, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation("role is required".to_string()));
    }
    Role::from_str(raw).ok_or_else(|| {
        AppError::Validation("role must be one of student, teacher or admin".to_string())
    })
}

fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            full_name: "Ali Hassan".to_string(),
            username: "ali1".to_string(),
            password: "secret1".to_string(),
            role: "student".to_string(),
            grade: Some("10".to_string()),
            section: Some("A".to_string()),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        let registration = validate_register(&valid_request()).unwrap();
        assert_eq!(registration.username, "ali1");
        assert_eq!(registration.role, Role::Student);
        assert_eq!(registration.grade.as_deref(), Some("10"));
        assert_eq!(registration.section.as_deref(), Some("A"));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut req = valid_request();
        req.full_name = "  ".to_string();
        assert!(matches!(
            validate_register(&req),
            Err(AppError::Validation(_))
        ));

        let mut req = valid_request();
        req.password = String::new();
        assert!(matches!(
            validate_register(&req),
            Err(AppError::Validation(_))
        ));

        let mut req = valid_request();
        req.role = String::new();
        assert!(matches!(
            validate_register(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_short_username_rejected() {
        let mut req = valid_request();
        req.username = "al".to_string();
        assert!(matches!(
            validate_register(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let mut req = valid_request();
        req.role = "principal".to_string();
        assert!(matches!(
            validate_register(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_student_needs_grade_and_section() {
        let mut req = valid_request();
        req.grade = None;
        assert!(matches!(
            validate_register(&req),
            Err(AppError::Validation(_))
        ));

        let mut req = valid_request();
        req.section = Some("   ".to_string());
        assert!(matches!(
            validate_register(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_teacher_does_not_need_grade() {
        let mut req = valid_request();
        req.role = "teacher".to_string();
        req.grade = None;
        req.section = None;

        let registration = validate_register(&req).unwrap();
        assert_eq!(registration.role, Role::Teacher);
        assert_eq!(registration.grade, None);
    }

    #[test]
    fn test_login_validation() {
        let req = LoginRequest {
            username: "ali1".to_string(),
            password: "secret1".to_string(),
            role: "student".to_string(),
        };
        let (username, password, role) = validate_login(&req).unwrap();
        assert_eq!(username, "ali1");
        assert_eq!(password, "secret1");
        assert_eq!(role, Role::Student);

        let req = LoginRequest {
            username: String::new(),
            password: "secret1".to_string(),
            role: "student".to_string(),
        };
        assert!(matches!(validate_login(&req), Err(AppError::Validation(_))));
    }
}
