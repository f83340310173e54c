use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{
    AuthSession, AuthUser, LoginInput, NewUser, RegisterInput, UpdateProfileInput, UserChanges,
};
use super::errors::AuthError;
use super::repository::UserRepository;
use crate::token::store::RevocationStore;
use crate::token::TokenService;
use crate::validate::{
    coerce_gender, parse_marital_status, required, validate_address, validate_email, validate_name,
    validate_password, FieldErrors,
};

/// Auth business service independent of the web framework.
pub struct AuthService<R: UserRepository, S: RevocationStore> {
    repo: Arc<R>,
    tokens: Arc<TokenService<S>>,
}

impl<R: UserRepository, S: RevocationStore> AuthService<R, S> {
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService<S>>) -> Self {
        Self { repo, tokens }
    }

    /// Register a new user with a hashed password and issue a fresh token.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::{AuthService, domain::RegisterInput, repository::mock::MockUserRepository};
    /// use service::token::{TokenConfig, TokenService, store::mock::MockRevocationStore};
    ///
    /// let repo = Arc::new(MockUserRepository::default());
    /// let tokens = Arc::new(TokenService::new(
    ///     Arc::new(MockRevocationStore::default()),
    ///     TokenConfig { secret: "secret".into(), ttl_secs: 3600 },
    /// ));
    /// let svc = AuthService::new(repo, tokens);
    /// let input = RegisterInput {
    ///     name: Some("Jane Doe".into()),
    ///     email: Some("jane@example.com".into()),
    ///     password: Some("password123".into()),
    ///     password_confirmation: Some("password123".into()),
    ///     address: Some("12 Main Street".into()),
    ///     gender: Some(serde_json::json!(true)),
    ///     marital_status: Some("single".into()),
    /// };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.email, "jane@example.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "name", input.name.as_deref(), validate_name);
        let email = required(&mut errors, "email", input.email.as_deref(), validate_email);
        let password = required(&mut errors, "password", input.password.as_deref(), validate_password);
        if let Some(pw) = &password {
            if input.password_confirmation.as_deref() != Some(pw.as_str()) {
                errors.add("password", "The password confirmation does not match.");
            }
        }
        let address = required(&mut errors, "address", input.address.as_deref(), validate_address);
        let gender = match &input.gender {
            None => {
                errors.add("gender", "The gender field is required.");
                None
            }
            Some(v) => match coerce_gender(v) {
                Ok(b) => Some(b),
                Err(msg) => {
                    errors.add("gender", msg);
                    None
                }
            },
        };
        let marital_status = match input.marital_status.as_deref() {
            None => {
                errors.add("marital_status", "The marital status field is required.");
                None
            }
            Some(s) => match parse_marital_status(s) {
                Ok(m) => Some(m),
                Err(msg) => {
                    errors.add("marital_status", msg);
                    None
                }
            },
        };
        if let Some(email) = &email {
            if self.repo.email_in_use(email, None).await? {
                debug!(email = %email, "registration email already taken");
                errors.add("email", "The email has already been taken.");
            }
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }
        let (
            Some(name),
            Some(email),
            Some(password),
            Some(address),
            Some(gender),
            Some(marital_status),
        ) = (name, email, password, address, gender, marital_status)
        else {
            return Err(AuthError::Validation(errors));
        };

        let password_hash = hash_password(&password)?;
        let user = match self
            .repo
            .insert(NewUser { name, email, password_hash, address, gender, marital_status })
            .await
        {
            Ok(user) => user,
            // Lost a uniqueness race; report it the same way as the pre-check
            Err(AuthError::Conflict) => {
                return Err(AuthError::Validation(FieldErrors::single(
                    "email",
                    "The email has already been taken.",
                )))
            }
            Err(e) => return Err(e),
        };
        let issued = self.tokens.issue(user.id)?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(AuthSession { user, token: issued.token })
    }

    /// Authenticate by email/password and issue a fresh token.
    #[instrument(skip(self, input))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let mut errors = FieldErrors::new();
        let email = required(&mut errors, "email", input.email.as_deref(), validate_email);
        let password = required(&mut errors, "password", input.password.as_deref(), validate_password);
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }
        let (Some(email), Some(password)) = (email, password) else {
            return Err(AuthError::Validation(errors));
        };

        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let stored = self
            .repo
            .password_hash(user.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let parsed = PasswordHash::new(&stored).map_err(|e| AuthError::Hash(e.to_string()))?;
        if Argon2::default().verify_password(password.as_bytes(), &parsed).is_err() {
            debug!(user_id = %user.id, "password verification failed");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.tokens.issue(user.id)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token: issued.token })
    }

    /// Revoke the presented token. Subsequent verifies fail as revoked.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: Option<&str>) -> Result<(), AuthError> {
        self.tokens.revoke(token).await?;
        Ok(())
    }

    /// Resolve the caller from the token and load their profile.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: Option<&str>) -> Result<AuthUser, AuthError> {
        let user_id = self.tokens.verify(token).await?;
        self.repo.find_by_id(user_id).await?.ok_or(AuthError::UserNotFound)
    }

    /// Update any subset of the caller's profile fields. Present fields are
    /// validated with the registration rules; the email uniqueness check
    /// excludes the caller's own row.
    #[instrument(skip(self, token, input))]
    pub async fn update_profile(
        &self,
        token: Option<&str>,
        input: UpdateProfileInput,
    ) -> Result<AuthUser, AuthError> {
        let user_id = self.tokens.verify(token).await?;

        let mut errors = FieldErrors::new();
        let mut changes = UserChanges::default();
        if let Some(name) = input.name.as_deref() {
            changes.name = required(&mut errors, "name", Some(name), validate_name);
        }
        if let Some(email) = input.email.as_deref() {
            changes.email = required(&mut errors, "email", Some(email), validate_email);
            if let Some(email) = &changes.email {
                if self.repo.email_in_use(email, Some(user_id)).await? {
                    errors.add("email", "The email has already been taken.");
                    changes.email = None;
                }
            }
        }
        let mut new_password = None;
        if let Some(password) = input.password.as_deref() {
            new_password = required(&mut errors, "password", Some(password), validate_password);
            if let Some(pw) = &new_password {
                if input.password_confirmation.as_deref() != Some(pw.as_str()) {
                    errors.add("password", "The password confirmation does not match.");
                    new_password = None;
                }
            }
        }
        if let Some(address) = input.address.as_deref() {
            changes.address = required(&mut errors, "address", Some(address), validate_address);
        }
        if let Some(v) = &input.gender {
            match coerce_gender(v) {
                Ok(b) => changes.gender = Some(b),
                Err(msg) => errors.add("gender", msg),
            }
        }
        if let Some(s) = input.marital_status.as_deref() {
            match parse_marital_status(s) {
                Ok(m) => changes.marital_status = Some(m),
                Err(msg) => errors.add("marital_status", msg),
            }
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }
        if let Some(password) = new_password {
            changes.password_hash = Some(hash_password(&password)?);
        }

        let user = match self.repo.update(user_id, changes).await {
            Ok(user) => user,
            Err(AuthError::Conflict) => {
                return Err(AuthError::Validation(FieldErrors::single(
                    "email",
                    "The email has already been taken.",
                )))
            }
            Err(e) => return Err(e),
        };
        info!(user_id = %user.id, "profile_updated");
        Ok(user)
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}
