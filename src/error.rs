use thiserror::Error;

/// Failures at the edges of the guard (HTTP input, admin auth).
/// The scanner itself has no failure modes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("user id must not be empty")]
    EmptyUserId,
    #[error("missing or malformed admin credentials")]
    Unauthorized,
    #[error("admin token rejected")]
    Forbidden,
    #[error("admin surface is disabled (no admin token configured)")]
    AdminDisabled,
}

/// Canonical form of a user id: surrounding whitespace trimmed, blank rejected.
/// Every HTTP entry point goes through this before touching the ledger.
pub fn require_user_id(user_id: &str) -> Result<&str, GuardError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(GuardError::EmptyUserId);
    }
    Ok(trimmed)
}
