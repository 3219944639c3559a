use thiserror::Error;

/// Authentication and account failure kinds.
///
/// Token verification distinguishes expired from invalid so the request guard
/// can log them as separate reasons, even though both answer 401. Account
/// lookup collapses "no such user" and "deactivated user" into `UserNotFound`
/// so responses never reveal whether an account exists.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token is missing")]
    TokenMissing,

    #[error("Invalid username or password")]
    CredentialMismatch,

    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UsernameConflict,

    #[error("Email already exists")]
    EmailConflict,

    #[error("User creation failed")]
    UserCreationFailed,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
