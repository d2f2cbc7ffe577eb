use crate::error::{AppError, Result};

/// Work-factor range bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Salted one-way hash. `cost` is the bcrypt work factor.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).map_err(|e| AppError::Internal(format!("Hash error: {}", e)))
}

/// Returns `false` on mismatch and on a stored hash bcrypt cannot parse.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            false
        }
    }
}

/// Runs [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Hash task failed: {}", e)))?
}

/// Runs [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Verify task failed: {}", e)))
}
