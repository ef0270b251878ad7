use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tracing::{debug, info, instrument};

use shared_config::AppConfig;
use shared_database::store::AppointmentStore;
use shared_database::{AppState, StoreError};
use shared_models::auth::Role;
use shared_models::records::NewUser;
use shared_utils::jwt::issue_token;

use crate::models::{CredentialError, LoginRequest, RegisterRequest};

const MIN_PASSWORD_LENGTH: usize = 8;

pub struct CredentialService {
    store: Arc<dyn AppointmentStore>,
    config: Arc<AppConfig>,
}

impl CredentialService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            config: Arc::clone(&state.config),
        }
    }

    #[instrument(skip(password))]
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// A mismatch is an `Ok(false)`, never an error.
    #[instrument(skip(password, hash))]
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(hash)?;
        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create an account and return a session token for it.
    pub async fn register(&self, request: RegisterRequest) -> Result<String, CredentialError> {
        Self::validate_registration(&request)?;

        let password_hash =
            Self::hash_password(&request.password).map_err(|_| CredentialError::Hashing)?;

        let record = NewUser {
            display_name: request.display_name,
            email: request.email,
            password_hash,
            role: Role::User,
        };

        let user = self.store.create_user(record).await.map_err(|e| match e {
            StoreError::Duplicate(_) => CredentialError::EmailTaken,
            other => CredentialError::Unavailable(other.to_string()),
        })?;

        info!("Registered user {}", user.id);
        self.issue_session_token(user.id, user.role)
    }

    /// Verify credentials and return a fresh session token.
    pub async fn login(&self, request: LoginRequest) -> Result<String, CredentialError> {
        let user = self
            .store
            .find_user_by_email(&request.email)
            .await
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?
            .ok_or(CredentialError::InvalidCredentials)?;

        let verified = Self::verify_password(&request.password, &user.password_hash)
            .map_err(|_| CredentialError::Hashing)?;

        if !verified {
            debug!("Password mismatch for user {}", user.id);
            return Err(CredentialError::InvalidCredentials);
        }

        debug!("Login successful for user {}", user.id);
        self.issue_session_token(user.id, user.role)
    }

    fn issue_session_token(&self, user_id: uuid::Uuid, role: Role) -> Result<String, CredentialError> {
        issue_token(
            user_id,
            role,
            &self.config.jwt_secret,
            self.config.token_ttl_hours,
        )
        .map_err(CredentialError::TokenSigning)
    }

    fn validate_registration(request: &RegisterRequest) -> Result<(), CredentialError> {
        if request.display_name.trim().is_empty() {
            return Err(CredentialError::Validation(
                "Display name must not be empty".to_string(),
            ));
        }
        if !request.email.contains('@') {
            return Err(CredentialError::Validation(
                "Email address is not valid".to_string(),
            ));
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(CredentialError::Validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}
