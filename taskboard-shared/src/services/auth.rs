/// Auth component
///
/// Registration and login over the credential store. Passwords are hashed
/// off the async runtime; tokens are stateless and carry `(sub, email)`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::jwt::{JwtError, TokenService};
use crate::auth::password::{hash_password_async, verify_password_async, PasswordError};
use crate::models::{NewUser, Role, UserProfile};
use crate::store::{StoreError, UserStore};

/// Error type for the auth component
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Email is already registered
    #[error("Email already exists")]
    EmailConflict,

    /// Unknown email or wrong password; deliberately undifferentiated
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User referenced by a valid token does not exist
    #[error("User not found")]
    UnknownUser,

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => AuthServiceError::EmailConflict,
            other => AuthServiceError::Store(other),
        }
    }
}

/// Auth result type alias
pub type AuthServiceResult<T> = Result<T, AuthServiceError>;

/// Registration input
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,

    /// Defaults to [`Role::User`]
    pub role: Option<Role>,
}

/// Registration output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterOutput {
    pub message: String,
    pub access_token: String,
}

/// Login output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginOutput {
    pub access_token: String,
}

/// Registration, login and user lookups
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates an account and returns a token for it
    pub async fn register(&self, input: RegisterInput) -> AuthServiceResult<RegisterOutput> {
        if self.users.find_by_email(&input.email).await?.is_some() {
            tracing::info!(email = %input.email, "Registration rejected: email exists");
            return Err(AuthServiceError::EmailConflict);
        }

        let password_hash = hash_password_async(input.password).await?;

        // A concurrent registration can still win the race; the store's
        // uniqueness constraint turns that into EmailConflict as well.
        let user = self
            .users
            .create(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
                role: input.role.unwrap_or_default(),
            })
            .await?;

        let access_token = self.tokens.issue(user.id, &user.email)?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(RegisterOutput {
            message: "User registered successfully".to_string(),
            access_token,
        })
    }

    /// Exchanges email and password for a token
    pub async fn login(&self, email: &str, password: &str) -> AuthServiceResult<LoginOutput> {
        let Some(user) = self.users.find_by_email(email).await? else {
            tracing::warn!("Login failed");
            return Err(AuthServiceError::InvalidCredentials);
        };

        if !verify_password_async(password.to_string(), user.password_hash.clone()).await? {
            tracing::warn!(user_id = %user.id, "Login failed");
            return Err(AuthServiceError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(user.id, &user.email)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutput { access_token })
    }

    /// Public profile of `user_id`
    pub async fn profile(&self, user_id: Uuid) -> AuthServiceResult<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(AuthServiceError::UnknownUser)
    }

    /// Every account, newest first
    pub async fn list_users(&self) -> AuthServiceResult<Vec<UserProfile>> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            TokenService::new(SECRET, Duration::hours(1)),
        )
    }

    fn input(email: &str) -> RegisterInput {
        RegisterInput {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_register_issues_token_for_new_user() {
        let auth = service();

        let out = auth.register(input("ada@example.com")).await.unwrap();
        assert_eq!(out.message, "User registered successfully");

        let claims = auth.tokens().verify(&out.access_token).unwrap();
        assert_eq!(claims.email, "ada@example.com");

        let profile = auth.profile(claims.sub).await.unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.role, Role::User);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let auth = service();

        auth.register(input("dup@example.com")).await.unwrap();
        let second = auth.register(input("dup@example.com")).await;

        assert!(matches!(second, Err(AuthServiceError::EmailConflict)));
    }

    #[tokio::test]
    async fn test_register_with_explicit_role() {
        let auth = service();

        let out = auth
            .register(RegisterInput {
                role: Some(Role::Admin),
                ..input("root@example.com")
            })
            .await
            .unwrap();

        let claims = auth.tokens().verify(&out.access_token).unwrap();
        assert_eq!(auth.profile(claims.sub).await.unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn test_login_roundtrip() {
        let auth = service();
        let registered = auth.register(input("bob@example.com")).await.unwrap();
        let registered_sub = auth.tokens().verify(&registered.access_token).unwrap().sub;

        let out = auth.login("bob@example.com", "secret1").await.unwrap();
        let claims = auth.tokens().verify(&out.access_token).unwrap();

        assert_eq!(claims.sub, registered_sub);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let auth = service();
        auth.register(input("carol@example.com")).await.unwrap();

        let wrong_password = auth.login("carol@example.com", "wrong!").await.unwrap_err();
        let unknown_email = auth.login("nobody@example.com", "secret1").await.unwrap_err();

        assert!(matches!(wrong_password, AuthServiceError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthServiceError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_list_users_hides_password_hash() {
        let auth = service();
        auth.register(input("a@example.com")).await.unwrap();
        auth.register(input("b@example.com")).await.unwrap();

        let users = auth.list_users().await.unwrap();
        assert_eq!(users.len(), 2);

        let json = serde_json::to_string(&users).unwrap();
        assert!(!json.contains("argon2"));
    }

    #[tokio::test]
    async fn test_profile_unknown_user() {
        let auth = service();
        assert!(matches!(
            auth.profile(Uuid::new_v4()).await,
            Err(AuthServiceError::UnknownUser)
        ));
    }
}
