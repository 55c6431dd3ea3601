use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::{self, JwtKeys};
use crate::db;
use crate::errors::AppError;
use crate::models::{AuthResponse, LoginUser, RegisterUser, User, UserRole};

pub async fn register(
    pool: &PgPool,
    jwt: &JwtKeys,
    input: RegisterUser,
) -> Result<AuthResponse, AppError> {
    let username = input.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("Username cannot be empty".into()));
    }
    if input.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    if input.email.trim().is_empty() || !input.email.contains('@') {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    if input.role == UserRole::Admin {
        return Err(AppError::Validation(
            "Admin accounts cannot be self-registered".into(),
        ));
    }

    if db::user_queries::username_taken(pool, &username).await? {
        return Err(AppError::Conflict(format!(
            "Username '{}' is already taken",
            username
        )));
    }

    let password_hash = auth::hash_password(&input.password)?;
    let user = db::user_queries::create(
        pool,
        username,
        input.email.trim().to_string(),
        password_hash,
        input.role,
        input.phone,
        input.company,
    )
    .await?;

    info!("Registered user {} ({:?})", user.username, user.role);
    let token = jwt.issue(user.id, user.role)?;
    Ok(AuthResponse { token, user })
}

pub async fn login(pool: &PgPool, jwt: &JwtKeys, input: LoginUser) -> Result<AuthResponse, AppError> {
    let user = db::user_queries::fetch_by_username(pool, input.username.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !auth::verify_password(&input.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    info!("User {} logged in", user.username);
    let token = jwt.issue(user.id, user.role)?;
    Ok(AuthResponse { token, user })
}

pub async fn current_user(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
    db::user_queries::fetch_one(pool, user_id)
        .await?
        .ok_or(AppError::NotFound)
}
