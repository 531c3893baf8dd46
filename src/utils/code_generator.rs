//! Short code generation.
//!
//! Codes are drawn from the operating system CSPRNG and hex-encoded. The
//! generator does not guarantee uniqueness; stores check for collisions at
//! insertion time and retry at most [`MAX_CODE_ATTEMPTS`] times.

use crate::domain::entities::{SHORT_CODE_LEN, ShortCode};
use crate::error::StoreError;

/// Random bytes per code; hex encoding doubles the length.
const CODE_LENGTH_BYTES: usize = SHORT_CODE_LEN / 2;

/// Upper bound on collision retries before a save fails.
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Generates a random 16-character lowercase hexadecimal short code.
///
/// # Errors
///
/// Returns [`StoreError::Internal`] if the system random number generator
/// fails.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code()?;
/// assert_eq!(code.as_str().len(), 16);
/// ```
pub fn generate_code() -> Result<ShortCode, StoreError> {
    let mut buffer = [0u8; CODE_LENGTH_BYTES];

    getrandom::fill(&mut buffer)
        .map_err(|e| StoreError::internal(format!("random source failed: {e}")))?;

    Ok(ShortCode::new_unchecked(hex::encode(buffer)))
}

/// Generates a random hex token of `bytes` random bytes.
///
/// Used for owner identities and per-process signing secrets.
pub fn random_hex(bytes: usize) -> Result<String, StoreError> {
    let mut buffer = vec![0u8; bytes];

    getrandom::fill(&mut buffer)
        .map_err(|e| StoreError::internal(format!("random source failed: {e}")))?;

    Ok(hex::encode(buffer))
}
