use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub display_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("{0}")]
    Validation(String),

    #[error("Password hashing failed")]
    Hashing,

    #[error("Token signing failed: {0}")]
    TokenSigning(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
