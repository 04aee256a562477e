//! User service
//!
//! Accounts and authentication:
//! - Registration (the first account becomes admin)
//! - Login/logout with server-side sessions
//! - Profile editing by the account owner
//! - Account removal by an administrator

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{ListParams, PagedResult, Session, UpdateProfileInput, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info};

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Maximum username length
const MAX_USERNAME_LENGTH: usize = 150;

/// Names that collide with static routes under `/profile/`
const RESERVED_USERNAMES: &[&str] = &["edit"];

/// Letters, digits and `@.+-_`
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid regex"));

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Username or email already taken
    #[error("User already exists: {0}")]
    UserExists(String),

    /// User not found
    #[error("User not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self::with_session_expiration(user_repo, session_repo, DEFAULT_SESSION_EXPIRATION_DAYS)
    }

    /// Create a new user service with custom session expiration
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Register a new user.
    ///
    /// The first account in an empty database is made an administrator.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if a field is empty or malformed
    /// - `UserExists` if username or email is already taken
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        validate_username(&input.username)?;
        validate_email(&input.email)?;
        if input.password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }

        self.ensure_username_free(&input.username, None).await?;
        self.ensure_email_free(&input.email, None).await?;

        let role = if self.is_first_user().await? {
            UserRole::Admin
        } else {
            UserRole::Author
        };

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let mut user = User::new(input.username, input.email, password_hash, role);
        user.first_name = input.first_name;
        user.last_name = input.last_name;

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        info!(user_id = created.id, username = %created.username, role = %created.role, "User registered");
        Ok(created)
    }

    /// Check credentials and open a new session.
    ///
    /// Unknown accounts and wrong passwords produce the same error.
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let invalid = || UserServiceError::AuthenticationError("Invalid username or password".to_string());

        let user = self
            .find_user_by_username_or_email(&input.username_or_email)
            .await?
            .ok_or_else(invalid)?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            debug!(user_id = user.id, "Rejected login with wrong password");
            return Err(invalid());
        }

        let session = self.start_session(user.id).await?;
        info!(user_id = user.id, "User logged in");
        Ok(session)
    }

    /// Open a session for an already authenticated user (e.g. right after registration)
    pub async fn start_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let session = Session::issue(user_id, Duration::days(self.session_expiration_days));

        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(created)
    }

    /// Logout (invalidate session)
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Unknown and expired tokens yield `None`; an expired session is removed on the way.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.session_repo
                .delete(token)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?;

        Ok(user)
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?;

        Ok(user)
    }

    /// Update the caller's own profile.
    ///
    /// Username and email stay unique; an empty input returns the user unchanged.
    pub async fn update_profile(
        &self,
        user_id: i64,
        input: UpdateProfileInput,
    ) -> Result<User, UserServiceError> {
        let mut user = self
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(user_id.to_string()))?;

        if !input.has_changes() {
            return Ok(user);
        }

        if let Some(username) = &input.username {
            validate_username(username)?;
            if *username != user.username {
                self.ensure_username_free(username, Some(user_id)).await?;
            }
        }
        if let Some(email) = &input.email {
            validate_email(email)?;
            if *email != user.email {
                self.ensure_email_free(email, Some(user_id)).await?;
            }
        }

        input.apply_to(&mut user);

        let updated = self
            .user_repo
            .update(&user)
            .await
            .context("Failed to update user")?;

        info!(user_id, "Profile updated");
        Ok(updated)
    }

    /// List accounts, newest first
    pub async fn list_users(
        &self,
        page: i64,
        per_page: i64,
    ) -> Result<PagedResult<User>, UserServiceError> {
        let total = self.user_repo.count().await.context("Failed to count users")?;
        let params = ListParams::clamped(page, per_page, total);
        let users = self
            .user_repo
            .list(&params)
            .await
            .context("Failed to list users")?;

        Ok(PagedResult::new(users, total, &params))
    }

    /// Remove an account together with its posts, comments and sessions
    pub async fn delete_user(&self, id: i64) -> Result<(), UserServiceError> {
        if self.get_by_id(id).await?.is_none() {
            return Err(UserServiceError::NotFound(id.to_string()));
        }

        self.session_repo
            .delete_by_user(id)
            .await
            .context("Failed to delete user sessions")?;
        self.user_repo
            .delete(id)
            .await
            .context("Failed to delete user")?;

        info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Check if this is the first user (for auto-admin)
    pub async fn is_first_user(&self) -> Result<bool, UserServiceError> {
        let count = self
            .user_repo
            .count()
            .await
            .context("Failed to count users")?;

        Ok(count == 0)
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;

        Ok(count)
    }

    // ========================================================================
    // Private helper methods
    // ========================================================================

    async fn ensure_username_free(
        &self,
        username: &str,
        except: Option<i64>,
    ) -> Result<(), UserServiceError> {
        let existing = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to check username")?;

        match existing {
            Some(other) if Some(other.id) != except => Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                username
            ))),
            _ => Ok(()),
        }
    }

    async fn ensure_email_free(
        &self,
        email: &str,
        except: Option<i64>,
    ) -> Result<(), UserServiceError> {
        let existing = self
            .user_repo
            .get_by_email(email)
            .await
            .context("Failed to check email")?;

        match existing {
            Some(other) if Some(other.id) != except => Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                email
            ))),
            _ => Ok(()),
        }
    }

    /// Find user by username or email
    async fn find_user_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, UserServiceError> {
        if let Some(user) = self.get_by_username(username_or_email).await? {
            return Ok(Some(user));
        }

        let user = self
            .user_repo
            .get_by_email(username_or_email)
            .await
            .context("Failed to get user by email")?;

        Ok(user)
    }
}

fn validate_username(username: &str) -> Result<(), UserServiceError> {
    if username.trim().is_empty() {
        return Err(UserServiceError::ValidationError(
            "Username cannot be empty".to_string(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(UserServiceError::ValidationError(format!(
            "Username cannot exceed {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(UserServiceError::ValidationError(
            "Username may only contain letters, digits and @/./+/-/_".to_string(),
        ));
    }
    if RESERVED_USERNAMES.contains(&username) {
        return Err(UserServiceError::ValidationError(format!(
            "Username '{}' is reserved",
            username
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), UserServiceError> {
    if email.trim().is_empty() {
        return Err(UserServiceError::ValidationError(
            "Email cannot be empty".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(UserServiceError::ValidationError(
            "Invalid email format".to_string(),
        ));
    }
    Ok(())
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterInput {
    /// Create a new registration input
    pub fn new(username: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }
}

/// Input for user login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username_or_email: String,
    pub password: String,
}

impl LoginInput {
    /// Create a new login input
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: password.into(),
        }
    }
}
