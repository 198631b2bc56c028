use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const CREDENTIAL_LEN: usize = 32;
const DEFAULT_ITERATIONS: u32 = 100_000;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// Well-formed hash of no known password. Checked against when an account
/// does not exist so that a failed login costs the same either way.
pub const DUMMY_HASH: &str = "pbkdf2-sha256$100000$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

#[derive(thiserror::Error, Debug)]
pub enum PasswordError {
    #[error("Failed to generate salt")]
    SaltGeneration,
    #[error("Password worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Hashes a password with PBKDF2-HMAC-SHA256 and a random salt.
///
/// Format: `pbkdf2-sha256$<iterations>$<salt b64>$<hash b64>`
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_with_iterations(password, DEFAULT_ITERATIONS)
}

fn hash_with_iterations(password: &str, iterations: u32) -> Result<String, PasswordError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| PasswordError::SaltGeneration)?;

    let iterations = NonZeroU32::new(iterations).unwrap_or(NonZeroU32::MIN);
    let mut credential = [0u8; CREDENTIAL_LEN];
    pbkdf2::derive(
        ALGORITHM,
        iterations,
        &salt,
        password.as_bytes(),
        &mut credential,
    );

    Ok(format!(
        "{}${}${}${}",
        SCHEME,
        iterations,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(credential)
    ))
}

/// [`hash_password`] on the blocking pool
pub async fn hash_password_async(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// [`verify_password`] on the blocking pool
pub async fn verify_password_async(password: String, stored: String) -> Result<bool, PasswordError> {
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await?;
    Ok(matches)
}

/// Checks a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if scheme != SCHEME {
        return false;
    }

    let Some(iterations) = iterations.parse::<u32>().ok().and_then(NonZeroU32::new) else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (STANDARD_NO_PAD.decode(salt), STANDARD_NO_PAD.decode(hash))
    else {
        return false;
    };

    pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &hash).is_ok()
}
