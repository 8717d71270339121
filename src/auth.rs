//! Authentication and session management.
//!
//! Sessions are HMAC-signed cookies carrying the user id. Passwords are
//! hashed with Argon2id at signup and verified on login. The signing
//! secret comes from SIGNET_SECRET, with a random per-process fallback.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum_extra::extract::CookieJar;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::models::User;
use crate::{store, AppState};

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name
pub const SESSION_COOKIE: &str = "signet_session";

/// Session time-to-live in hours
pub const SESSION_TTL_HOURS: i64 = 24;

// ============================================================================
// Session Structure
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    user_id: i64,
    created: i64,
    expires: i64,
    nonce: String,
}

// ============================================================================
// Session Functions
// ============================================================================

/// Create a new session token for a user
pub fn create_session(user_id: i64, secret: &[u8]) -> Option<String> {
    let now = Utc::now().timestamp();
    let expires = now + (SESSION_TTL_HOURS * 3600);
    let nonce: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();

    let session = Session {
        user_id,
        created: now,
        expires,
        nonce,
    };
    let session_json = serde_json::to_string(&session).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(session_json.as_bytes());
    let signature = hex_encode(mac.finalize().into_bytes().as_slice());

    Some(format!("{}.{}", base64_encode(&session_json), signature))
}

/// Verify a session token and return the user id it carries
pub fn verify_session(token: &str, secret: &[u8]) -> Option<i64> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return None;
    }

    let session_json = base64_decode(parts[0])?;

    // Verify signature
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(session_json.as_bytes());
    let expected_sig = hex_encode(mac.finalize().into_bytes().as_slice());

    // Constant-time comparison to prevent timing attacks
    let sig_bytes = parts[1].as_bytes();
    let expected_bytes = expected_sig.as_bytes();
    if sig_bytes.len() != expected_bytes.len() {
        return None;
    }
    if sig_bytes.ct_eq(expected_bytes).unwrap_u8() != 1 {
        return None;
    }

    // Check expiration
    let session: Session = serde_json::from_str(&session_json).ok()?;
    if Utc::now().timestamp() >= session.expires {
        return None;
    }

    Some(session.user_id)
}

/// User id from the session cookie, if the cookie verifies
pub fn session_user_id(jar: &CookieJar, secret: &[u8]) -> Option<i64> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| verify_session(cookie.value(), secret))
}

/// The authenticated user for this request, if any
pub fn current_user(jar: &CookieJar, state: &AppState) -> Option<User> {
    let user_id = session_user_id(jar, &state.secret)?;
    store::get_user_by_id(&state.db, user_id).ok()
}

// ============================================================================
// Passwords
// ============================================================================

/// Hash a password with Argon2id (~100ms, done once at signup)
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// ============================================================================
// Server Secret
// ============================================================================

/// Session signing secret from SIGNET_SECRET, or a random per-process one
pub fn secret_from_env() -> Vec<u8> {
    match std::env::var("SIGNET_SECRET") {
        Ok(s) if !s.is_empty() => s.into_bytes(),
        _ => {
            tracing::warn!(
                "SIGNET_SECRET not set; using a random secret, sessions will not survive a restart"
            );
            rand::thread_rng().gen::<[u8; 32]>().to_vec()
        }
    }
}

// ============================================================================
// Encoding Helpers
// ============================================================================

/// Encode a string as base64
pub fn base64_encode(s: &str) -> String {
    STANDARD.encode(s.as_bytes())
}

/// Decode a base64 string
pub fn base64_decode(s: &str) -> Option<String> {
    let bytes = STANDARD.decode(s).ok()?;
    String::from_utf8(bytes).ok()
}

/// Encode bytes as hexadecimal
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn test_session_round_trip() {
        let token = create_session(42, SECRET).expect("create session");
        assert_eq!(verify_session(&token, SECRET), Some(42));
    }

    #[test]
    fn test_session_rejects_wrong_secret() {
        let token = create_session(42, SECRET).expect("create session");
        assert_eq!(verify_session(&token, b"other-secret"), None);
    }

    #[test]
    fn test_session_rejects_tampered_payload() {
        let token = create_session(42, SECRET).expect("create session");
        let parts: Vec<&str> = token.split('.').collect();
        let json = base64_decode(parts[0]).unwrap();
        let tampered_json = json.replace("\"user_id\":42", "\"user_id\":99");
        assert_ne!(json, tampered_json);

        let tampered = format!("{}.{}", base64_encode(&tampered_json), parts[1]);
        assert_eq!(verify_session(&tampered, SECRET), None);
    }

    #[test]
    fn test_session_rejects_garbage() {
        assert_eq!(verify_session("", SECRET), None);
        assert_eq!(verify_session("garbage", SECRET), None);
        assert_eq!(verify_session("a.b.c", SECRET), None);
        assert_eq!(verify_session("!!!.deadbeef", SECRET), None);
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("correct horse battery").expect("hash");
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0x00, 0xff, 0x10]), "00ff10");
        assert_eq!(hex_encode(&[]), "");
    }
}
