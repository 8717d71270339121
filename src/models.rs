//! Data models for the template application.
//!
//! Core data structures shared across the store, handlers, and HTML
//! rendering: users, templates, document data, recipients, and fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub template_type: TemplateType,
    pub document_data_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Public,
    Private,
}

impl std::fmt::Display for TemplateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateType::Public => write!(f, "public"),
            TemplateType::Private => write!(f, "private"),
        }
    }
}

impl std::str::FromStr for TemplateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(TemplateType::Public),
            "private" => Ok(TemplateType::Private),
            other => Err(format!("unknown template type: {}", other)),
        }
    }
}

// ============================================================================
// Document Data
// ============================================================================

/// Indirection between a template and its PDF bytes. The payload is either
/// inlined as base64 or a filename inside the application's files directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentData {
    pub id: String,
    pub kind: DocumentDataKind,
    pub data: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentDataKind {
    Base64,
    File,
}

// ============================================================================
// Recipients
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: i64,
    pub template_id: i64,
    pub email: String,
    pub name: String,
    pub role: RecipientRole,
    /// Signing-link token. Stable across saves for the same email.
    pub token: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecipientRole {
    Signer,
    Cc,
    Approver,
    Viewer,
}

impl std::fmt::Display for RecipientRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipientRole::Signer => write!(f, "signer"),
            RecipientRole::Cc => write!(f, "cc"),
            RecipientRole::Approver => write!(f, "approver"),
            RecipientRole::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for RecipientRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signer" => Ok(RecipientRole::Signer),
            "cc" => Ok(RecipientRole::Cc),
            "approver" => Ok(RecipientRole::Approver),
            "viewer" => Ok(RecipientRole::Viewer),
            other => Err(format!("unknown recipient role: {}", other)),
        }
    }
}

// ============================================================================
// Fields
// ============================================================================

/// A form field placed on a template page. Coordinates and dimensions are
/// percentages of the rendered page, so placement survives zooming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: i64,
    pub template_id: i64,
    pub recipient_id: i64,
    pub field_type: FieldType,
    pub page: u32,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Signature,
    Initials,
    Name,
    Email,
    Date,
    Text,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Signature => write!(f, "signature"),
            FieldType::Initials => write!(f, "initials"),
            FieldType::Name => write!(f, "name"),
            FieldType::Email => write!(f, "email"),
            FieldType::Date => write!(f, "date"),
            FieldType::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signature" => Ok(FieldType::Signature),
            "initials" => Ok(FieldType::Initials),
            "name" => Ok(FieldType::Name),
            "email" => Ok(FieldType::Email),
            "date" => Ok(FieldType::Date),
            "text" => Ok(FieldType::Text),
            other => Err(format!("unknown field type: {}", other)),
        }
    }
}

// ============================================================================
// Listing
// ============================================================================

/// One page of a user's templates plus the page count for pagination.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateListing {
    pub templates: Vec<Template>,
    pub total_pages: i64,
}
