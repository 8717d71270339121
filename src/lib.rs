//! Signet library - re-exports for testing and external use.
//!
//! This module provides public access to all the application's modules
//! for testing purposes and potential library use.

use sled::Db;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

pub mod auth;
pub mod handlers;
pub mod models;
pub mod storage;
pub mod store;
pub mod templates;

// ============================================================================
// Configuration
// ============================================================================

/// Directory under the data dir holding uploaded documents.
pub const FILES_DIR: &str = "files";
pub const DB_PATH: &str = ".signet_db";

// ============================================================================
// Rate Limiting
// ============================================================================

/// Most distinct emails tracked for login rate limiting at once. Reaching
/// the cap sweeps entries that are no longer serving a lockout.
pub const MAX_TRACKED_LOGINS: usize = 10_000;

/// Tracks login failures for rate limiting with exponential backoff.
pub struct LoginRateLimit {
    pub failures: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LoginRateLimit {
    pub fn new() -> Self {
        Self {
            failures: 0,
            locked_until: None,
        }
    }

    /// Check if login attempts are currently locked out.
    pub fn is_locked(&self) -> bool {
        if let Some(until) = self.locked_until {
            Utc::now() < until
        } else {
            false
        }
    }

    /// Record a failed login attempt. After 5 failures, apply exponential backoff capped at 64s.
    pub fn record_failure(&mut self) {
        self.failures += 1;
        if self.failures >= 5 {
            let delay_secs = std::cmp::min(1i64 << (self.failures - 5), 64);
            self.locked_until = Some(Utc::now() + chrono::Duration::seconds(delay_secs));
        }
    }
}

impl Default for LoginRateLimit {
    fn default() -> Self {
        Self::new()
    }
}

/// Record a failed login for this email. Once the map holds
/// `MAX_TRACKED_LOGINS` entries, those no longer locked are swept before a
/// new one is added, so the map stays bounded.
pub fn record_login_failure(limits: &mut HashMap<String, LoginRateLimit>, email: &str) {
    if limits.len() >= MAX_TRACKED_LOGINS && !limits.contains_key(email) {
        limits.retain(|_, limit| limit.is_locked());
    }
    limits.entry(email.to_string()).or_default().record_failure();
}

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub files_dir: PathBuf,
    /// Session signing secret.
    pub secret: Vec<u8>,
    /// Per-email login failure tracking.
    pub login_rate_limits: Arc<Mutex<HashMap<String, LoginRateLimit>>>,
}

impl AppState {
    pub fn new() -> Self {
        let data_dir = PathBuf::from(
            std::env::var("SIGNET_DATA_DIR").unwrap_or_else(|_| ".".to_string()),
        );
        fs::create_dir_all(&data_dir).ok();

        let files_dir = data_dir.join(FILES_DIR);
        fs::create_dir_all(&files_dir).ok();

        let db = sled::open(data_dir.join(DB_PATH)).expect("Failed to open database");

        let secret = auth::secret_from_env();

        Self {
            db,
            files_dir,
            secret,
            login_rate_limits: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate that a constructed path stays within the given base directory.
/// Returns the validated path on success, or an error message on failure.
/// For new files (that don't yet exist), validates the parent directory.
pub fn validate_path_within(base: &PathBuf, target: &PathBuf) -> Result<PathBuf, String> {
    let canonical_base = fs::canonicalize(base)
        .map_err(|e| format!("Cannot resolve base directory: {}", e))?;

    if target.exists() {
        let canonical = fs::canonicalize(target)
            .map_err(|e| format!("Cannot resolve path: {}", e))?;
        if canonical.starts_with(&canonical_base) {
            Ok(canonical)
        } else {
            Err("Path escapes base directory".to_string())
        }
    } else {
        // For new files, ensure the parent is within base
        let parent = target.parent().ok_or("No parent directory")?;
        fs::create_dir_all(parent)
            .map_err(|e| format!("Cannot create directory: {}", e))?;
        let canonical_parent = fs::canonicalize(parent)
            .map_err(|e| format!("Cannot resolve parent: {}", e))?;
        if canonical_parent.starts_with(&canonical_base) {
            Ok(target.clone())
        } else {
            Err("Path escapes base directory".to_string())
        }
    }
}

// Re-export commonly used types
pub use models::{
    DocumentData, DocumentDataKind, Field, FieldType, Recipient, RecipientRole, Template,
    TemplateListing, TemplateType, User,
};

pub use store::{
    create_template, create_user, delete_template, duplicate_template, get_document_data,
    get_fields_for_template, get_recipients_for_template, get_template_by_id, get_templates,
    get_user_by_email, get_user_by_id, update_template, FieldSpec, RecipientSpec, StoreError,
};

pub use storage::{
    get_file, looks_like_pdf, put_file, sanitize_pdf_filename, to_data_url, StorageError,
};

pub use auth::{
    create_session, current_user, hash_password, session_user_id, verify_password,
    verify_session, SESSION_COOKIE, SESSION_TTL_HOURS,
};

pub use templates::{
    base_html, html_escape, preview_dialog_html, render_template_editor, render_templates_page,
    STYLE,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_locks_after_five_failures() {
        let mut limit = LoginRateLimit::new();
        for _ in 0..4 {
            limit.record_failure();
        }
        assert!(!limit.is_locked());
        limit.record_failure();
        assert!(limit.is_locked());
    }

    #[test]
    fn test_record_login_failure_sweeps_at_cap() {
        let mut limits = HashMap::new();
        for i in 0..MAX_TRACKED_LOGINS {
            record_login_failure(&mut limits, &format!("user{}@example.com", i));
        }
        assert_eq!(limits.len(), MAX_TRACKED_LOGINS);

        // The next unseen address drops everything not currently locked
        record_login_failure(&mut limits, "overflow@example.com");
        assert_eq!(limits.len(), 1);
        assert!(limits.contains_key("overflow@example.com"));
    }

    #[test]
    fn test_record_login_failure_sweep_keeps_locked_entries() {
        let mut limits = HashMap::new();
        for _ in 0..6 {
            record_login_failure(&mut limits, "victim@example.com");
        }
        assert!(limits["victim@example.com"].is_locked());

        for i in 1..MAX_TRACKED_LOGINS {
            record_login_failure(&mut limits, &format!("user{}@example.com", i));
        }
        assert_eq!(limits.len(), MAX_TRACKED_LOGINS);

        record_login_failure(&mut limits, "overflow@example.com");
        assert_eq!(limits.len(), 2);
        assert!(limits.contains_key("victim@example.com"));
        assert!(limits.contains_key("overflow@example.com"));
    }

    #[test]
    fn test_rate_limit_backoff_is_capped() {
        let mut limit = LoginRateLimit::new();
        for _ in 0..40 {
            limit.record_failure();
        }
        let until = limit.locked_until.expect("locked");
        let delay = until - Utc::now();
        assert!(delay <= chrono::Duration::seconds(65));
    }

    #[test]
    fn test_validate_path_within_rejects_escape() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base");
        std::fs::create_dir_all(&base).unwrap();

        let inside = base.join("doc.pdf");
        assert!(validate_path_within(&base, &inside).is_ok());

        let outside = base.join("..").join("evil.pdf");
        assert!(validate_path_within(&base, &outside).is_err());
    }
}
