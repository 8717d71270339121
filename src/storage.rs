//! Document file storage.
//!
//! Template PDFs are reached through a `DocumentData` record: either the
//! bytes are inlined as base64, or the record names a file inside the
//! application's files directory. Uploads always land on disk; the base64
//! kind exists for records migrated from other installations.

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::Rng;
use std::fs;
use std::path::PathBuf;

use crate::models::{DocumentData, DocumentDataKind};
use crate::validate_path_within;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Base64(base64::DecodeError),
    /// A stored filename resolved outside the files directory.
    InvalidPath(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "storage io error: {}", e),
            StorageError::Base64(e) => write!(f, "invalid base64 payload: {}", e),
            StorageError::InvalidPath(msg) => write!(f, "invalid file path: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<base64::DecodeError> for StorageError {
    fn from(e: base64::DecodeError) -> Self {
        StorageError::Base64(e)
    }
}

// ============================================================================
// File Access
// ============================================================================

/// Resolves a document data record to its raw PDF bytes.
pub fn get_file(files_dir: &PathBuf, doc: &DocumentData) -> Result<Vec<u8>, StorageError> {
    match doc.kind {
        DocumentDataKind::Base64 => Ok(STANDARD.decode(doc.data.as_bytes())?),
        DocumentDataKind::File => {
            // The stored name is sanitized again in case the record was tampered with
            let safe_name = sanitize_pdf_filename(&doc.data);
            let path = files_dir.join(&safe_name);
            let path = validate_path_within(files_dir, &path).map_err(StorageError::InvalidPath)?;
            Ok(fs::read(path)?)
        }
    }
}

/// Writes uploaded bytes into the files directory and returns the document
/// data record pointing at them.
pub fn put_file(files_dir: &PathBuf, bytes: &[u8]) -> Result<DocumentData, StorageError> {
    fs::create_dir_all(files_dir)?;

    let id = random_id();
    let filename = format!("{}.pdf", id);
    let path = files_dir.join(&filename);
    let path = validate_path_within(files_dir, &path).map_err(StorageError::InvalidPath)?;
    fs::write(path, bytes)?;

    Ok(DocumentData {
        id,
        kind: DocumentDataKind::File,
        data: filename,
    })
}

/// Inline data URL for embedding a PDF directly in a rendered page.
pub fn to_data_url(bytes: &[u8]) -> String {
    format!("data:application/pdf;base64,{}", STANDARD.encode(bytes))
}

pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

fn random_id() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Allow only safe filename characters and force a .pdf extension.
pub fn sanitize_pdf_filename(filename: &str) -> String {
    let safe: String = filename
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .take(200)
        .collect();

    let safe = if safe.is_empty() {
        "document".to_string()
    } else {
        safe
    };

    if safe.to_lowercase().ends_with(".pdf") {
        safe
    } else {
        format!("{}.pdf", safe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_format() {
        let bytes = b"%PDF-1.4 test content";
        let url = to_data_url(bytes);
        let prefix = "data:application/pdf;base64,";
        assert!(url.starts_with(prefix));
        assert_eq!(url[prefix.len()..], STANDARD.encode(bytes));
        assert_eq!(STANDARD.decode(&url[prefix.len()..]).unwrap(), bytes);
    }

    #[test]
    fn test_data_url_empty_bytes() {
        assert_eq!(to_data_url(b""), "data:application/pdf;base64,");
    }

    #[test]
    fn test_get_file_base64_kind() {
        let doc = DocumentData {
            id: "d1".into(),
            kind: DocumentDataKind::Base64,
            data: STANDARD.encode(b"%PDF-1.4 inline"),
        };
        let dir = PathBuf::from("/nonexistent");
        assert_eq!(get_file(&dir, &doc).unwrap(), b"%PDF-1.4 inline");
    }

    #[test]
    fn test_get_file_rejects_bad_base64() {
        let doc = DocumentData {
            id: "d1".into(),
            kind: DocumentDataKind::Base64,
            data: "not!!base64".into(),
        };
        let dir = PathBuf::from("/nonexistent");
        assert!(matches!(
            get_file(&dir, &doc),
            Err(StorageError::Base64(_))
        ));
    }

    #[test]
    fn test_put_then_get_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let files_dir = dir.path().join("files");

        let doc = put_file(&files_dir, b"%PDF-1.7 uploaded").unwrap();
        assert_eq!(doc.kind, DocumentDataKind::File);
        assert!(doc.data.ends_with(".pdf"));
        assert!(files_dir.join(&doc.data).exists());

        assert_eq!(get_file(&files_dir, &doc).unwrap(), b"%PDF-1.7 uploaded");
    }

    #[test]
    fn test_get_file_neutralizes_traversal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let files_dir = dir.path().join("files");
        std::fs::create_dir_all(&files_dir).unwrap();

        let doc = DocumentData {
            id: "d1".into(),
            kind: DocumentDataKind::File,
            data: "../../etc/passwd".into(),
        };
        assert!(get_file(&files_dir, &doc).is_err());
    }

    #[test]
    fn test_sanitize_pdf_filename() {
        assert_eq!(sanitize_pdf_filename("contract.pdf"), "contract.pdf");
        assert_eq!(sanitize_pdf_filename("my file.PDF"), "myfile.PDF");
        assert_eq!(sanitize_pdf_filename("../evil"), "..evil.pdf");
        assert_eq!(sanitize_pdf_filename(""), "document.pdf");
        assert_eq!(sanitize_pdf_filename("///"), "document.pdf");
    }

    #[test]
    fn test_looks_like_pdf() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(!looks_like_pdf(b"<html></html>"));
        assert!(!looks_like_pdf(b""));
    }
}
