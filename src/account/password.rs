use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Check a new password against its confirmation before anything is stored.
pub fn validate_new_password(new_password: &str, confirm_password: &str) -> AppResult<()> {
    if new_password != confirm_password {
        return Err(AppError::BadRequest("Passwords do not match".into()));
    }
    validate_password_length(new_password)
}

pub fn validate_password_length(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_is_rejected_before_length() {
        let err = validate_new_password("abc", "abd").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Passwords do not match"));
    }

    #[test]
    fn short_password_is_rejected() {
        let err = validate_new_password("abc12", "abc12").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("at least 6")));
    }

    #[test]
    fn matching_long_enough_password_passes() {
        assert!(validate_new_password("croissant", "croissant").is_ok());
    }

    #[test]
    fn hash_round_trips_through_verify() {
        let hash = hash_password("sourdough").unwrap();
        assert!(verify_password("sourdough", &hash).unwrap());
        assert!(!verify_password("baguette", &hash).unwrap());
    }
}
