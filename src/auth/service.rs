use crate::auth::token::{Claims, TokenService};
use crate::db::models::{NewUser, Role, User};
use crate::db::operations::DbOperations;
use crate::error::{AppError, AuthError};
use tracing::{debug, info};

/// Registration input. Shape validation happens at the HTTP boundary; by the
/// time it reaches here the fields are present and well-formed.
#[derive(Debug, Clone)]
pub struct Registration {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub grade: Option<String>,
    pub section: Option<String>,
}

/// Orchestrates the credential store and the token service for the two
/// authentication flows, and verifies tokens for the request guard.
#[derive(Clone)]
pub struct AuthService {
    db: DbOperations,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(db: DbOperations, tokens: TokenService) -> Self {
        Self { db, tokens }
    }

    pub async fn register(&self, registration: Registration) -> Result<(User, String), AppError> {
        let password = registration.password;

        // bcrypt is deliberately slow; run it on the blocking pool so request
        // workers keep serving while the digest grinds.
        let password_hash =
            tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))?
                .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?;

        let user = self
            .db
            .create_user(&NewUser {
                full_name: registration.full_name,
                username: registration.username,
                password_hash,
                role: registration.role,
                grade: registration.grade,
                section: registration.section,
            })
            .await?;

        info!("registered {} account for {}", user.role, user.username);

        let token = self.tokens.issue(user.id, &user.username, user.role)?;
        Ok((user, token))
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<(User, String), AppError> {
        // Unknown usernames and wrong passwords collapse into one error so the
        // response never reveals which usernames exist.
        let user = match self.db.find_user_by_username_and_role(username, role).await? {
            Some(user) => user,
            None => {
                debug!("login failed: no {} account named {}", role, username);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let candidate = password.to_string();
        let stored_hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(candidate, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("password verification failed: {}", e)))?;

        if !valid {
            debug!("login failed: password mismatch for {}", username);
            return Err(AuthError::InvalidCredentials.into());
        }

        info!("login successful for {} ({})", user.username, user.role);

        let token = self.tokens.issue(user.id, &user.username, user.role)?;
        Ok((user, token))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        self.tokens.verify(token)
    }
}
