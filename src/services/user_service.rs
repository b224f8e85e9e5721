use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::database::models::User;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Issued session: token plus the authenticated user
pub struct Session {
    pub token: String,
    pub user: User,
    pub expires_in: u64,
}

/// Account registration and credential verification
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<User, ApiError> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::field_error("email", "Enter a valid email address"));
        }
        if input.password.len() < 5 {
            return Err(ApiError::field_error(
                "password",
                "Ensure this field has at least 5 characters",
            ));
        }

        let password_hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST).map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal_server_error("Failed to create user")
        })?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO app_user (email, password_hash, name) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(input.name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::conflict("A user with this email already exists")
            }
            _ => ApiError::from(e),
        })?;

        Ok(user)
    }

    pub async fn login(&self, input: LoginInput) -> Result<Session, ApiError> {
        let email = input.email.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>("SELECT * FROM app_user WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        // Same response for unknown email and wrong password
        let user = user.ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;
        let verified = bcrypt::verify(&input.password, &user.password_hash).unwrap_or(false);
        if !verified {
            return Err(ApiError::unauthorized("Invalid credentials"));
        }

        let token = generate_jwt(Claims::new(user.id, user.email.clone())).map_err(|e| {
            tracing::error!("JWT generation failed: {}", e);
            ApiError::internal_server_error("Failed to create session")
        })?;

        Ok(Session {
            token,
            user,
            expires_in: config::config().security.jwt_expiry_hours * 3600,
        })
    }
}
