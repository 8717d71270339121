//! HTTP route handlers for the web application.
//!
//! This module contains all the route handlers for the template
//! application: the list and editor pages, the JSON template API,
//! document upload/download, and authentication.

use crate::auth::{
    create_session, current_user, hash_password, verify_password, SESSION_COOKIE,
    SESSION_TTL_HOURS,
};
use crate::models::{FieldType, RecipientRole, TemplateType};
use crate::storage;
use crate::store::{self, FieldSpec, RecipientSpec, StoreError};
use crate::templates::{base_html, html_escape, render_template_editor, render_templates_page};
use crate::{record_login_failure, AppState};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

// ============================================================================
// Parameter Coercion
// ============================================================================

/// Path ids arrive as strings. Anything that does not parse to a positive
/// integer is rejected before the store is touched.
fn parse_template_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Query values arrive as strings too; non-numeric or non-positive input
/// falls back to the default.
fn parse_page_param(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

fn valid_email(email: &str) -> bool {
    let re = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    re.is_match(email)
}

// ============================================================================
// Index Handler
// ============================================================================

pub async fn index() -> Redirect {
    Redirect::to("/templates")
}

// ============================================================================
// Template List Handler
// ============================================================================

#[derive(Deserialize)]
pub struct TemplateListQuery {
    pub page: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
}

pub async fn templates_page(
    Query(query): Query<TemplateListQuery>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Response {
    let user = match current_user(&jar, &state) {
        Some(u) => u,
        None => return Redirect::to("/login").into_response(),
    };

    let page = parse_page_param(query.page.as_deref(), 1);
    let per_page = parse_page_param(query.per_page.as_deref(), 10);

    let listing = match store::get_templates(&state.db, user.id, page, per_page) {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("failed to list templates: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load templates")
                .into_response();
        }
    };

    Html(render_templates_page(&listing, page, per_page)).into_response()
}

// ============================================================================
// Template Editor Handler
// ============================================================================

pub async fn template_editor(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Response {
    // Malformed ids bounce straight back to the list, before any lookups
    let template_id = match parse_template_id(&id) {
        Some(id) => id,
        None => return Redirect::to("/templates").into_response(),
    };

    let user = match current_user(&jar, &state) {
        Some(u) => u,
        None => return Redirect::to("/login").into_response(),
    };

    // Missing and foreign templates are indistinguishable from outside
    let template = match store::get_template_by_id(&state.db, user.id, template_id) {
        Ok(t) => t,
        Err(_) => return Redirect::to("/templates").into_response(),
    };

    let doc = match store::get_document_data(&state.db, &template.document_data_id) {
        Ok(d) => d,
        Err(_) => return Redirect::to("/templates").into_response(),
    };

    let bytes = match storage::get_file(&state.files_dir, &doc) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(template_id, "failed to read document file: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load document")
                .into_response();
        }
    };

    let recipients = match store::get_recipients_for_template(&state.db, user.id, template_id) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(template_id, "failed to load recipients: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load template")
                .into_response();
        }
    };

    let fields = match store::get_fields_for_template(&state.db, user.id, template_id) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!(template_id, "failed to load fields: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load template")
                .into_response();
        }
    };

    let data_url = storage::to_data_url(&bytes);
    Html(render_template_editor(&template, &data_url, &recipients, &fields)).into_response()
}

// ============================================================================
// Template Upload Handlers
// ============================================================================

pub async fn new_template_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if current_user(&jar, &state).is_none() {
        return Redirect::to("/login").into_response();
    }

    let html = r#"
        <h1>New Template</h1>
        <form class="upload-form" method="POST" action="/templates/new" enctype="multipart/form-data">
            <div class="form-group">
                <label for="file">Document</label>
                <input type="file" id="file" name="file" accept=".pdf,application/pdf" required>
                <small>PDF files only. The filename becomes the template title.</small>
            </div>
            <div class="form-actions">
                <button type="submit" class="btn">Create Template</button>
                <a href="/templates" class="btn secondary">Cancel</a>
            </div>
        </form>
    "#;

    Html(base_html("New Template", html, true)).into_response()
}

pub async fn create_template_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Response {
    let user = match current_user(&jar, &state) {
        Some(u) => u,
        None => return Redirect::to("/login").into_response(),
    };

    // Get the file from multipart
    let mut filename = String::new();
    let mut file_data = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            filename = field.file_name().unwrap_or("document.pdf").to_string();

            match field.bytes().await {
                Ok(bytes) => file_data = bytes.to_vec(),
                Err(e) => {
                    return (StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e))
                        .into_response()
                }
            }
            break;
        }
    }

    if file_data.is_empty() {
        return (StatusCode::BAD_REQUEST, "No file uploaded").into_response();
    }

    if !storage::looks_like_pdf(&file_data) {
        return (StatusCode::BAD_REQUEST, "Only PDF files are accepted").into_response();
    }

    let doc = match storage::put_file(&state.files_dir, &file_data) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("failed to store uploaded document: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to store document")
                .into_response();
        }
    };

    // Title from the uploaded filename, extension dropped
    let title = filename.trim_end_matches(".pdf").trim();
    let title = if title.is_empty() { "Untitled template" } else { title };

    let template = match store::create_template(&state.db, user.id, title, &doc) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("failed to create template: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create template")
                .into_response();
        }
    };

    tracing::info!(template_id = template.id, "template created");
    Redirect::to(&format!("/templates/{}", template.id)).into_response()
}

// ============================================================================
// Document Download Handler
// ============================================================================

pub async fn download_document(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Response {
    let template_id = match parse_template_id(&id) {
        Some(id) => id,
        None => return (StatusCode::BAD_REQUEST, "Invalid template id").into_response(),
    };

    let user = match current_user(&jar, &state) {
        Some(u) => u,
        None => return (StatusCode::UNAUTHORIZED, "Not logged in").into_response(),
    };

    let template = match store::get_template_by_id(&state.db, user.id, template_id) {
        Ok(t) => t,
        Err(_) => return (StatusCode::NOT_FOUND, "Template not found").into_response(),
    };

    let doc = match store::get_document_data(&state.db, &template.document_data_id) {
        Ok(d) => d,
        Err(_) => return (StatusCode::NOT_FOUND, "Document not found").into_response(),
    };

    let bytes = match storage::get_file(&state.files_dir, &doc) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(template_id, "failed to read document file: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load document")
                .into_response();
        }
    };

    let headers = [
        (CONTENT_TYPE, "application/pdf".to_string()),
        (
            CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                storage::sanitize_pdf_filename(&template.title)
            ),
        ),
    ];
    (headers, bytes).into_response()
}

// ============================================================================
// Template Save Handler
// ============================================================================

#[derive(Deserialize)]
pub struct RecipientPayload {
    /// Stored id, or a negative client-side id for rows added in the editor.
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Deserialize)]
pub struct FieldPayload {
    pub recipient_id: i64,
    pub field_type: String,
    pub page: u32,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Deserialize)]
pub struct SaveTemplateBody {
    pub title: String,
    pub template_type: String,
    pub recipients: Vec<RecipientPayload>,
    pub fields: Vec<FieldPayload>,
}

pub async fn save_template(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Json(body): axum::Json<SaveTemplateBody>,
) -> Response {
    let template_id = match parse_template_id(&id) {
        Some(id) => id,
        None => return (StatusCode::BAD_REQUEST, "Invalid template id").into_response(),
    };

    let user = match current_user(&jar, &state) {
        Some(u) => u,
        None => return (StatusCode::UNAUTHORIZED, "Not logged in").into_response(),
    };

    let title = body.title.trim();
    if title.is_empty() {
        return (StatusCode::BAD_REQUEST, "Title must not be empty").into_response();
    }

    let template_type = match body.template_type.parse::<TemplateType>() {
        Ok(t) => t,
        Err(_) => return (StatusCode::BAD_REQUEST, "Unknown template type").into_response(),
    };

    let mut seen_emails = HashSet::new();
    let mut recipients = Vec::with_capacity(body.recipients.len());
    for r in &body.recipients {
        let email = r.email.trim().to_lowercase();
        if !valid_email(&email) {
            return (
                StatusCode::BAD_REQUEST,
                format!("Invalid recipient email: {}", r.email),
            )
                .into_response();
        }
        if !seen_emails.insert(email.clone()) {
            return (
                StatusCode::BAD_REQUEST,
                format!("Duplicate recipient email: {}", email),
            )
                .into_response();
        }
        let role = match r.role.parse::<RecipientRole>() {
            Ok(role) => role,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    format!("Unknown recipient role: {}", r.role),
                )
                    .into_response()
            }
        };
        recipients.push(RecipientSpec {
            email,
            name: r.name.trim().to_string(),
            role,
        });
    }

    // Fields reference recipients by the ids in this same payload; the
    // store wants indices instead since new rows have no stored id yet.
    let mut fields = Vec::with_capacity(body.fields.len());
    for f in &body.fields {
        let recipient = match body.recipients.iter().position(|r| r.id == f.recipient_id) {
            Some(idx) => idx,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    "Field references a recipient missing from the payload",
                )
                    .into_response()
            }
        };
        let field_type = match f.field_type.parse::<FieldType>() {
            Ok(t) => t,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    format!("Unknown field type: {}", f.field_type),
                )
                    .into_response()
            }
        };
        if f.page == 0 {
            return (StatusCode::BAD_REQUEST, "Field page numbers start at 1").into_response();
        }
        for value in [f.position_x, f.position_y, f.width, f.height] {
            if !(0.0..=100.0).contains(&value) {
                return (
                    StatusCode::BAD_REQUEST,
                    "Field geometry must lie between 0 and 100",
                )
                    .into_response();
            }
        }
        fields.push(FieldSpec {
            recipient,
            field_type,
            page: f.page,
            position_x: f.position_x,
            position_y: f.position_y,
            width: f.width,
            height: f.height,
        });
    }

    match store::update_template(
        &state.db,
        user.id,
        template_id,
        title,
        template_type,
        &recipients,
        &fields,
    ) {
        Ok(_) => (StatusCode::OK, "Saved").into_response(),
        Err(StoreError::NotFound) => {
            (StatusCode::NOT_FOUND, "Template not found").into_response()
        }
        Err(e) => {
            tracing::error!(template_id, "failed to save template: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save template").into_response()
        }
    }
}

// ============================================================================
// Template Delete Handler
// ============================================================================

#[derive(Deserialize)]
pub struct DeleteTemplateBody {
    pub confirm: bool,
}

pub async fn delete_template_api(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Json(body): axum::Json<DeleteTemplateBody>,
) -> Response {
    let template_id = match parse_template_id(&id) {
        Some(id) => id,
        None => return (StatusCode::BAD_REQUEST, "Invalid template id").into_response(),
    };

    let user = match current_user(&jar, &state) {
        Some(u) => u,
        None => return (StatusCode::UNAUTHORIZED, "Not logged in").into_response(),
    };

    if !body.confirm {
        return (StatusCode::BAD_REQUEST, "Deletion not confirmed").into_response();
    }

    match store::delete_template(&state.db, user.id, template_id) {
        Ok(()) => (StatusCode::OK, "Deleted").into_response(),
        Err(StoreError::NotFound) => {
            (StatusCode::NOT_FOUND, "Template not found").into_response()
        }
        Err(e) => {
            tracing::error!(template_id, "failed to delete template: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete template").into_response()
        }
    }
}

// ============================================================================
// Template Duplicate Handler
// ============================================================================

pub async fn duplicate_template_api(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Response {
    let template_id = match parse_template_id(&id) {
        Some(id) => id,
        None => return (StatusCode::BAD_REQUEST, "Invalid template id").into_response(),
    };

    let user = match current_user(&jar, &state) {
        Some(u) => u,
        None => return (StatusCode::UNAUTHORIZED, "Not logged in").into_response(),
    };

    match store::duplicate_template(&state.db, user.id, template_id) {
        Ok(copy) => axum::Json(serde_json::json!({ "id": copy.id })).into_response(),
        Err(StoreError::NotFound) => {
            (StatusCode::NOT_FOUND, "Template not found").into_response()
        }
        Err(e) => {
            tracing::error!(template_id, "failed to duplicate template: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to duplicate template").into_response()
        }
    }
}

// ============================================================================
// Data URL Handler
// ============================================================================

pub async fn template_data_url(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Response {
    let template_id = match parse_template_id(&id) {
        Some(id) => id,
        None => return (StatusCode::BAD_REQUEST, "Invalid template id").into_response(),
    };

    let user = match current_user(&jar, &state) {
        Some(u) => u,
        None => return (StatusCode::UNAUTHORIZED, "Not logged in").into_response(),
    };

    let template = match store::get_template_by_id(&state.db, user.id, template_id) {
        Ok(t) => t,
        Err(_) => return (StatusCode::NOT_FOUND, "Template not found").into_response(),
    };

    let doc = match store::get_document_data(&state.db, &template.document_data_id) {
        Ok(d) => d,
        Err(_) => return (StatusCode::NOT_FOUND, "Document not found").into_response(),
    };

    let bytes = match storage::get_file(&state.files_dir, &doc) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(template_id, "failed to read document file: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load document")
                .into_response();
        }
    };

    axum::Json(serde_json::json!({ "data_url": storage::to_data_url(&bytes) })).into_response()
}

// ============================================================================
// Authentication Handlers
// ============================================================================

fn login_form_html(error: Option<&str>) -> String {
    let message = match error {
        Some(e) => format!(r#"<div class="message error">{}</div>"#, html_escape(e)),
        None => String::new(),
    };

    format!(
        r#"
        <div class="login-form">
            {message}
            <h1>Login</h1>
            <form method="POST" action="/login">
                <input type="email" name="email" placeholder="Email" autofocus required>
                <input type="password" name="password" placeholder="Password" required>
                <button type="submit">Login</button>
            </form>
            <div class="form-footer">No account? <a href="/signup">Sign up</a></div>
        </div>
    "#
    )
}

fn signup_form_html(error: Option<&str>) -> String {
    let message = match error {
        Some(e) => format!(r#"<div class="message error">{}</div>"#, html_escape(e)),
        None => String::new(),
    };

    format!(
        r#"
        <div class="login-form">
            {message}
            <h1>Sign Up</h1>
            <form method="POST" action="/signup">
                <input type="text" name="name" placeholder="Name (optional)" autofocus>
                <input type="email" name="email" placeholder="Email" required>
                <input type="password" name="password" placeholder="Password (8+ characters)" required>
                <button type="submit">Create Account</button>
            </form>
            <div class="form-footer">Already registered? <a href="/login">Login</a></div>
        </div>
    "#
    )
}

pub async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if current_user(&jar, &state).is_some() {
        return Redirect::to("/templates").into_response();
    }

    Html(base_html("Login", &login_form_html(None), false)).into_response()
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    axum::Form(form): axum::Form<LoginForm>,
) -> Response {
    let email = form.email.trim().to_lowercase();

    // Read-only check: an address is not worth tracking until it fails
    {
        let limits = state.login_rate_limits.lock().unwrap();
        if limits.get(&email).map(|l| l.is_locked()).unwrap_or(false) {
            let html = login_form_html(Some("Too many failed attempts. Try again shortly."));
            return Html(base_html("Login", &html, false)).into_response();
        }
    }

    let user = store::get_user_by_email(&state.db, &email).ok();
    let password_ok = user
        .as_ref()
        .map(|u| verify_password(&form.password, &u.password_hash))
        .unwrap_or(false);

    let user = match (user, password_ok) {
        (Some(u), true) => u,
        // One message for both failure modes so accounts stay unguessable
        _ => {
            let mut limits = state.login_rate_limits.lock().unwrap();
            record_login_failure(&mut limits, &email);
            let html = login_form_html(Some("Invalid email or password."));
            return Html(base_html("Login", &html, false)).into_response();
        }
    };

    state.login_rate_limits.lock().unwrap().remove(&email);

    let session_token = match create_session(user.id, &state.secret) {
        Some(t) => t,
        None => {
            let html = r#"<div class="message error">Failed to create session.</div>"#;
            return Html(base_html("Error", html, false)).into_response();
        }
    };

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE,
        session_token,
        SESSION_TTL_HOURS * 3600
    );

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie.parse().unwrap());

    (headers, Redirect::to("/templates")).into_response()
}

pub async fn signup_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if current_user(&jar, &state).is_some() {
        return Redirect::to("/templates").into_response();
    }

    Html(base_html("Sign Up", &signup_form_html(None), false)).into_response()
}

#[derive(Deserialize)]
pub struct SignupForm {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

pub async fn signup_submit(
    State(state): State<Arc<AppState>>,
    axum::Form(form): axum::Form<SignupForm>,
) -> Response {
    let email = form.email.trim().to_lowercase();

    if !valid_email(&email) {
        let html = signup_form_html(Some("Enter a valid email address."));
        return Html(base_html("Sign Up", &html, false)).into_response();
    }

    if form.password.len() < 8 {
        let html = signup_form_html(Some("Password must be at least 8 characters."));
        return Html(base_html("Sign Up", &html, false)).into_response();
    }

    let password_hash = match hash_password(&form.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("failed to hash password: {}", e);
            let html = signup_form_html(Some("Signup failed, try again."));
            return Html(base_html("Sign Up", &html, false)).into_response();
        }
    };

    let user = match store::create_user(&state.db, &email, form.name.as_deref(), &password_hash)
    {
        Ok(u) => u,
        Err(StoreError::EmailTaken) => {
            let html = signup_form_html(Some("An account with that email already exists."));
            return Html(base_html("Sign Up", &html, false)).into_response();
        }
        Err(e) => {
            tracing::error!("failed to create user: {}", e);
            let html = signup_form_html(Some("Signup failed, try again."));
            return Html(base_html("Sign Up", &html, false)).into_response();
        }
    };

    tracing::info!(user_id = user.id, "account created");

    // Log the fresh account straight in
    let session_token = match create_session(user.id, &state.secret) {
        Some(t) => t,
        None => return Redirect::to("/login").into_response(),
    };

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE,
        session_token,
        SESSION_TTL_HOURS * 3600
    );

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie.parse().unwrap());

    (headers, Redirect::to("/templates")).into_response()
}

pub async fn logout() -> Response {
    let cookie = format!("{}=; Path=/; HttpOnly; Secure; Max-Age=0", SESSION_COOKIE);

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie.parse().unwrap());

    (headers, Redirect::to("/login")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentData, DocumentDataKind};
    use axum::http::header::LOCATION;
    use axum_extra::extract::cookie::Cookie;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn test_state() -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = sled::open(dir.path().join("db")).expect("open db");
        let state = Arc::new(AppState {
            db,
            files_dir: dir.path().join("files"),
            secret: b"test-secret".to_vec(),
            login_rate_limits: Arc::new(Mutex::new(HashMap::new())),
        });
        (dir, state)
    }

    fn session_jar(state: &AppState, user_id: i64) -> CookieJar {
        let token = create_session(user_id, &state.secret).expect("session token");
        CookieJar::new().add(Cookie::new(SESSION_COOKIE, token))
    }

    fn location_header(response: &Response) -> &str {
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    fn sample_doc(id: &str) -> DocumentData {
        DocumentData {
            id: id.to_string(),
            kind: DocumentDataKind::Base64,
            data: "JVBERi0xLjQK".to_string(),
        }
    }

    #[test]
    fn test_parse_template_id_accepts_positive_integers() {
        assert_eq!(parse_template_id("3"), Some(3));
        assert_eq!(parse_template_id("  7 "), Some(7));
        assert_eq!(parse_template_id("1"), Some(1));
    }

    #[test]
    fn test_parse_template_id_rejects_garbage() {
        assert_eq!(parse_template_id("abc"), None);
        assert_eq!(parse_template_id(""), None);
        assert_eq!(parse_template_id("3.5"), None);
        assert_eq!(parse_template_id("12abc"), None);
        assert_eq!(parse_template_id("99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_template_id_rejects_non_positive() {
        assert_eq!(parse_template_id("0"), None);
        assert_eq!(parse_template_id("-2"), None);
    }

    #[test]
    fn test_parse_page_param_defaults() {
        assert_eq!(parse_page_param(None, 1), 1);
        assert_eq!(parse_page_param(None, 10), 10);
        assert_eq!(parse_page_param(Some("abc"), 10), 10);
        assert_eq!(parse_page_param(Some(""), 1), 1);
    }

    #[test]
    fn test_parse_page_param_rejects_non_positive() {
        assert_eq!(parse_page_param(Some("0"), 1), 1);
        assert_eq!(parse_page_param(Some("-3"), 10), 10);
    }

    #[test]
    fn test_parse_page_param_accepts_positive() {
        assert_eq!(parse_page_param(Some("3"), 1), 3);
        assert_eq!(parse_page_param(Some(" 25 "), 10), 25);
    }

    #[test]
    fn test_valid_email() {
        assert!(valid_email("a@b.co"));
        assert!(valid_email("tenant+lease@example.com"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("a b@c.com"));
        assert!(!valid_email(""));
    }

    #[tokio::test]
    async fn test_editor_invalid_id_redirects_before_session_check() {
        let (_dir, state) = test_state();
        for raw in ["abc", "0", "-3", "1.5"] {
            let response =
                template_editor(Path(raw.to_string()), State(state.clone()), CookieJar::new())
                    .await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            // A malformed id outranks the missing session: /templates, not /login
            assert_eq!(location_header(&response), "/templates");
        }
    }

    #[tokio::test]
    async fn test_editor_requires_session() {
        let (_dir, state) = test_state();
        let response =
            template_editor(Path("7".to_string()), State(state.clone()), CookieJar::new()).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location_header(&response), "/login");
    }

    #[tokio::test]
    async fn test_editor_redirects_absent_and_foreign_templates() {
        let (_dir, state) = test_state();
        let owner = store::create_user(&state.db, "owner@example.com", None, "hash").unwrap();
        let other = store::create_user(&state.db, "other@example.com", None, "hash").unwrap();
        let t = store::create_template(&state.db, owner.id, "NDA", &sample_doc("d1")).unwrap();

        let response = template_editor(
            Path("424242".to_string()),
            State(state.clone()),
            session_jar(&state, owner.id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location_header(&response), "/templates");

        let response = template_editor(
            Path(t.id.to_string()),
            State(state.clone()),
            session_jar(&state, other.id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location_header(&response), "/templates");

        // The owner still reaches the editor
        let response = template_editor(
            Path(t.id.to_string()),
            State(state.clone()),
            session_jar(&state, owner.id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_editor_redirects_when_document_record_is_gone() {
        let (_dir, state) = test_state();
        let owner = store::create_user(&state.db, "owner@example.com", None, "hash").unwrap();
        let t = store::create_template(&state.db, owner.id, "NDA", &sample_doc("d1")).unwrap();
        state
            .db
            .open_tree("document_data")
            .unwrap()
            .remove("d1".as_bytes())
            .unwrap();

        let response = template_editor(
            Path(t.id.to_string()),
            State(state.clone()),
            session_jar(&state, owner.id),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location_header(&response), "/templates");
    }

    #[tokio::test]
    async fn test_login_attempts_only_tracked_on_failure() {
        let (_dir, state) = test_state();
        let hash = hash_password("hunter2hunter2").unwrap();
        store::create_user(&state.db, "alice@example.com", None, &hash).unwrap();

        // Probing with unregistered addresses leaves only failure counters
        for i in 0..5 {
            let form = axum::Form(LoginForm {
                email: format!("ghost{}@example.com", i),
                password: "wrong".to_string(),
            });
            login_submit(State(state.clone()), form).await;
        }
        assert_eq!(state.login_rate_limits.lock().unwrap().len(), 5);

        // A successful login never adds an entry
        let form = axum::Form(LoginForm {
            email: "alice@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
        });
        let response = login_submit(State(state.clone()), form).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let limits = state.login_rate_limits.lock().unwrap();
        assert_eq!(limits.len(), 5);
        assert!(!limits.contains_key("alice@example.com"));
    }

    #[tokio::test]
    async fn test_login_success_drops_the_failure_counter() {
        let (_dir, state) = test_state();
        let hash = hash_password("hunter2hunter2").unwrap();
        store::create_user(&state.db, "alice@example.com", None, &hash).unwrap();

        for _ in 0..2 {
            let form = axum::Form(LoginForm {
                email: "alice@example.com".to_string(),
                password: "wrong".to_string(),
            });
            login_submit(State(state.clone()), form).await;
        }
        assert!(state
            .login_rate_limits
            .lock()
            .unwrap()
            .contains_key("alice@example.com"));

        let form = axum::Form(LoginForm {
            email: "alice@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
        });
        let response = login_submit(State(state.clone()), form).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(!state
            .login_rate_limits
            .lock()
            .unwrap()
            .contains_key("alice@example.com"));
    }
}
