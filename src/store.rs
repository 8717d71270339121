//! sled-backed persistence for users, templates, recipients, and fields.
//!
//! Every template accessor is scoped by the requesting user's id. A template
//! that exists but belongs to someone else is indistinguishable from one
//! that does not exist.

use chrono::Utc;
use rand::Rng;
use sled::Db;
use std::collections::HashMap;

use crate::models::{
    DocumentData, Field, FieldType, Recipient, RecipientRole, Template, TemplateListing,
    TemplateType, User,
};

const USERS_TREE: &str = "users";
const USERS_BY_EMAIL_TREE: &str = "users_by_email";
const TEMPLATES_TREE: &str = "templates";
const RECIPIENTS_TREE: &str = "recipients";
const FIELDS_TREE: &str = "fields";
const DOCUMENT_DATA_TREE: &str = "document_data";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum StoreError {
    /// Record absent, or present but owned by another user.
    NotFound,
    /// Signup attempted with an email that is already registered.
    EmailTaken,
    Db(sled::Error),
    /// A stored value failed to deserialize or an internal reference is broken.
    Corrupt(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "not found"),
            StoreError::EmailTaken => write!(f, "email already registered"),
            StoreError::Db(e) => write!(f, "database error: {}", e),
            StoreError::Corrupt(msg) => write!(f, "corrupt record: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sled::Error> for StoreError {
    fn from(e: sled::Error) -> Self {
        StoreError::Db(e)
    }
}

// ============================================================================
// Keys and Encoding
// ============================================================================

fn id_key(id: i64) -> [u8; 8] {
    (id as u64).to_be_bytes()
}

/// Recipients and fields key as template_id ++ row_id, so all rows of one
/// template form a contiguous prefix range.
fn composite_key(template_id: i64, row_id: i64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&id_key(template_id));
    key[8..].copy_from_slice(&id_key(row_id));
    key
}

fn next_id(db: &Db) -> Result<i64, StoreError> {
    // generate_id starts at 0; ids here are always >= 1
    Ok((db.generate_id()? + 1) as i64)
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(raw: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(raw).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn clear_prefix(tree: &sled::Tree, template_id: i64) -> Result<(), StoreError> {
    let stale: Vec<sled::IVec> = tree
        .scan_prefix(id_key(template_id))
        .filter_map(|r| r.ok())
        .map(|(k, _)| k)
        .collect();
    for key in stale {
        tree.remove(key)?;
    }
    Ok(())
}

// ============================================================================
// Users
// ============================================================================

pub fn create_user(
    db: &Db,
    email: &str,
    name: Option<&str>,
    password_hash: &str,
) -> Result<User, StoreError> {
    let users = db.open_tree(USERS_TREE)?;
    let by_email = db.open_tree(USERS_BY_EMAIL_TREE)?;

    let email = email.trim().to_lowercase();
    let id = next_id(db)?;

    // Claim the email first so concurrent signups cannot share an address
    let claim = by_email.compare_and_swap(
        email.as_bytes(),
        None as Option<&[u8]>,
        Some(&id_key(id)[..]),
    )?;
    if claim.is_err() {
        return Err(StoreError::EmailTaken);
    }

    let user = User {
        id,
        email,
        name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        password_hash: password_hash.to_string(),
        created_at: Utc::now(),
    };
    users.insert(id_key(id), encode(&user)?)?;
    Ok(user)
}

pub fn get_user_by_id(db: &Db, id: i64) -> Result<User, StoreError> {
    let users = db.open_tree(USERS_TREE)?;
    let raw = users.get(id_key(id))?.ok_or(StoreError::NotFound)?;
    decode(&raw)
}

pub fn get_user_by_email(db: &Db, email: &str) -> Result<User, StoreError> {
    let by_email = db.open_tree(USERS_BY_EMAIL_TREE)?;
    let raw = by_email
        .get(email.trim().to_lowercase().as_bytes())?
        .ok_or(StoreError::NotFound)?;
    if raw.len() != 8 {
        return Err(StoreError::Corrupt("malformed email index entry".into()));
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&raw);
    get_user_by_id(db, u64::from_be_bytes(bytes) as i64)
}

// ============================================================================
// Templates
// ============================================================================

/// Stores the document data record and creates a new private template
/// pointing at it.
pub fn create_template(
    db: &Db,
    user_id: i64,
    title: &str,
    doc: &DocumentData,
) -> Result<Template, StoreError> {
    let templates = db.open_tree(TEMPLATES_TREE)?;
    let doc_data = db.open_tree(DOCUMENT_DATA_TREE)?;

    doc_data.insert(doc.id.as_bytes(), encode(doc)?)?;

    let id = next_id(db)?;
    let now = Utc::now();
    let template = Template {
        id,
        user_id,
        title: title.trim().to_string(),
        template_type: TemplateType::Private,
        document_data_id: doc.id.clone(),
        created_at: now,
        updated_at: now,
    };
    templates.insert(id_key(id), encode(&template)?)?;
    Ok(template)
}

pub fn get_template_by_id(db: &Db, user_id: i64, id: i64) -> Result<Template, StoreError> {
    let templates = db.open_tree(TEMPLATES_TREE)?;
    let raw = templates.get(id_key(id))?.ok_or(StoreError::NotFound)?;
    let template: Template = decode(&raw)?;
    if template.user_id != user_id {
        return Err(StoreError::NotFound);
    }
    Ok(template)
}

/// One page of the user's templates, newest first. Pages are 1-based; a page
/// past the end yields an empty slice, not an error.
pub fn get_templates(
    db: &Db,
    user_id: i64,
    page: i64,
    per_page: i64,
) -> Result<TemplateListing, StoreError> {
    let templates_tree = db.open_tree(TEMPLATES_TREE)?;

    // Full scan, fine for the per-user volumes involved
    let mut owned: Vec<Template> = Vec::new();
    for row in templates_tree.iter() {
        let (_, raw) = row?;
        let template: Template = decode(&raw)?;
        if template.user_id == user_id {
            owned.push(template);
        }
    }
    owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let per_page = per_page.max(1);
    let count = owned.len() as i64;
    let total_pages = if count == 0 {
        0
    } else {
        (count + per_page - 1) / per_page
    };

    let offset = (page.max(1) as u64 - 1).saturating_mul(per_page as u64);
    let templates = owned
        .into_iter()
        .skip(offset as usize)
        .take(per_page as usize)
        .collect();

    Ok(TemplateListing {
        templates,
        total_pages,
    })
}

// ============================================================================
// Recipients and Fields
// ============================================================================

pub fn get_recipients_for_template(
    db: &Db,
    user_id: i64,
    template_id: i64,
) -> Result<Vec<Recipient>, StoreError> {
    get_template_by_id(db, user_id, template_id)?;

    let recipients = db.open_tree(RECIPIENTS_TREE)?;
    let mut out: Vec<Recipient> = Vec::new();
    for row in recipients.scan_prefix(id_key(template_id)) {
        let (_, raw) = row?;
        out.push(decode(&raw)?);
    }
    out.sort_by_key(|r| r.id);
    Ok(out)
}

pub fn get_fields_for_template(
    db: &Db,
    user_id: i64,
    template_id: i64,
) -> Result<Vec<Field>, StoreError> {
    get_template_by_id(db, user_id, template_id)?;

    let fields = db.open_tree(FIELDS_TREE)?;
    let mut out: Vec<Field> = Vec::new();
    for row in fields.scan_prefix(id_key(template_id)) {
        let (_, raw) = row?;
        out.push(decode(&raw)?);
    }
    out.sort_by_key(|f| f.id);
    Ok(out)
}

// ============================================================================
// Document Data
// ============================================================================

/// Unscoped by user: document data is only reachable through an owned
/// template, which is where the ownership check happens.
pub fn get_document_data(db: &Db, id: &str) -> Result<DocumentData, StoreError> {
    let doc_data = db.open_tree(DOCUMENT_DATA_TREE)?;
    let raw = doc_data.get(id.as_bytes())?.ok_or(StoreError::NotFound)?;
    decode(&raw)
}

// ============================================================================
// Updates
// ============================================================================

/// Incoming recipient from a save. Fields reference recipients by index
/// into the same save payload.
#[derive(Debug, Clone)]
pub struct RecipientSpec {
    pub email: String,
    pub name: String,
    pub role: RecipientRole,
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub recipient: usize,
    pub field_type: FieldType,
    pub page: u32,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Replaces the template's recipient and field sets wholesale and updates
/// title and type. Tokens of recipients whose email is unchanged survive
/// the save.
pub fn update_template(
    db: &Db,
    user_id: i64,
    id: i64,
    title: &str,
    template_type: TemplateType,
    recipients: &[RecipientSpec],
    fields: &[FieldSpec],
) -> Result<Template, StoreError> {
    let mut template = get_template_by_id(db, user_id, id)?;

    let recipients_tree = db.open_tree(RECIPIENTS_TREE)?;
    let fields_tree = db.open_tree(FIELDS_TREE)?;

    let mut old_tokens: HashMap<String, String> = HashMap::new();
    for row in recipients_tree.scan_prefix(id_key(id)) {
        let (_, raw) = row?;
        let old: Recipient = decode(&raw)?;
        old_tokens.insert(old.email, old.token);
    }
    clear_prefix(&recipients_tree, id)?;
    clear_prefix(&fields_tree, id)?;

    let mut stored: Vec<Recipient> = Vec::with_capacity(recipients.len());
    for spec in recipients {
        let rid = next_id(db)?;
        let email = spec.email.trim().to_lowercase();
        let token = old_tokens
            .get(&email)
            .cloned()
            .unwrap_or_else(random_token);
        let recipient = Recipient {
            id: rid,
            template_id: id,
            email,
            name: spec.name.trim().to_string(),
            role: spec.role,
            token,
        };
        recipients_tree.insert(composite_key(id, rid), encode(&recipient)?)?;
        stored.push(recipient);
    }

    for spec in fields {
        let recipient = stored
            .get(spec.recipient)
            .ok_or_else(|| StoreError::Corrupt("field references a missing recipient".into()))?;
        let fid = next_id(db)?;
        let field = Field {
            id: fid,
            template_id: id,
            recipient_id: recipient.id,
            field_type: spec.field_type,
            page: spec.page,
            position_x: spec.position_x,
            position_y: spec.position_y,
            width: spec.width,
            height: spec.height,
        };
        fields_tree.insert(composite_key(id, fid), encode(&field)?)?;
    }

    template.title = title.trim().to_string();
    template.template_type = template_type;
    template.updated_at = Utc::now();
    let templates = db.open_tree(TEMPLATES_TREE)?;
    templates.insert(id_key(id), encode(&template)?)?;
    Ok(template)
}

pub fn delete_template(db: &Db, user_id: i64, id: i64) -> Result<(), StoreError> {
    let template = get_template_by_id(db, user_id, id)?;

    let templates = db.open_tree(TEMPLATES_TREE)?;
    templates.remove(id_key(id))?;

    clear_prefix(&db.open_tree(RECIPIENTS_TREE)?, id)?;
    clear_prefix(&db.open_tree(FIELDS_TREE)?, id)?;

    // Only the record goes; the underlying file may be shared by a duplicate
    let doc_data = db.open_tree(DOCUMENT_DATA_TREE)?;
    doc_data.remove(template.document_data_id.as_bytes())?;
    Ok(())
}

/// Copies a template with its document data record, recipients (fresh
/// tokens), and fields.
pub fn duplicate_template(db: &Db, user_id: i64, id: i64) -> Result<Template, StoreError> {
    let source = get_template_by_id(db, user_id, id)?;
    let doc = get_document_data(db, &source.document_data_id)?;
    let recipients = get_recipients_for_template(db, user_id, id)?;
    let fields = get_fields_for_template(db, user_id, id)?;

    let doc_copy = DocumentData {
        id: random_token(),
        kind: doc.kind,
        data: doc.data,
    };
    let doc_data = db.open_tree(DOCUMENT_DATA_TREE)?;
    doc_data.insert(doc_copy.id.as_bytes(), encode(&doc_copy)?)?;

    let new_id = next_id(db)?;
    let now = Utc::now();
    let copy = Template {
        id: new_id,
        user_id,
        title: format!("{} (copy)", source.title),
        template_type: source.template_type,
        document_data_id: doc_copy.id.clone(),
        created_at: now,
        updated_at: now,
    };
    let templates = db.open_tree(TEMPLATES_TREE)?;
    templates.insert(id_key(new_id), encode(&copy)?)?;

    let recipients_tree = db.open_tree(RECIPIENTS_TREE)?;
    let fields_tree = db.open_tree(FIELDS_TREE)?;

    let mut id_map: HashMap<i64, i64> = HashMap::new();
    for recipient in recipients {
        let rid = next_id(db)?;
        id_map.insert(recipient.id, rid);
        let row = Recipient {
            id: rid,
            template_id: new_id,
            token: random_token(),
            ..recipient
        };
        recipients_tree.insert(composite_key(new_id, rid), encode(&row)?)?;
    }
    for field in fields {
        let recipient_id = id_map
            .get(&field.recipient_id)
            .copied()
            .ok_or_else(|| StoreError::Corrupt("field references a missing recipient".into()))?;
        let fid = next_id(db)?;
        let row = Field {
            id: fid,
            template_id: new_id,
            recipient_id,
            ..field
        };
        fields_tree.insert(composite_key(new_id, fid), encode(&row)?)?;
    }

    Ok(copy)
}
