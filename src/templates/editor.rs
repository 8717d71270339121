//! Template detail editor.
//!
//! Full-page layout with the rendered document on the right and the
//! recipient/field editors in a sidebar. Field placements are drawn as
//! boxes over the page canvases; selecting a field row and clicking a
//! page moves the field there. Saves replace the template's recipient
//! and field sets wholesale through the JSON API.

use crate::models::{Field, Recipient, Template};

use super::components::html_escape;
use super::preview::preview_dialog_html;
use super::styles::STYLE;

// ============================================================================
// Row Fragments
// ============================================================================

const ROLES: [&str; 4] = ["signer", "cc", "approver", "viewer"];
const FIELD_TYPES: [&str; 6] = ["signature", "initials", "name", "email", "date", "text"];

fn select_options(values: &[&str], selected: &str) -> String {
    values
        .iter()
        .map(|value| {
            let sel = if *value == selected { " selected" } else { "" };
            format!(r#"<option value="{0}"{1}>{0}</option>"#, value, sel)
        })
        .collect()
}

fn recipient_option_items(recipients: &[Recipient], selected_id: i64) -> String {
    recipients
        .iter()
        .map(|r| {
            let label = if r.name.is_empty() { &r.email } else { &r.name };
            let sel = if r.id == selected_id { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                r.id,
                sel,
                html_escape(label)
            )
        })
        .collect()
}

/// One recipient row. An empty `rid` produces the blank row cloned by the
/// add button; cloned rows get a negative client-side id.
fn recipient_row_html(rid: &str, name: &str, email: &str, role: &str) -> String {
    format!(
        r#"<div class="recipient-row" data-rid="{rid}">
            <input type="text" class="recipient-name" placeholder="Name" value="{name}">
            <input type="email" class="recipient-email" placeholder="Email" value="{email}">
            <select class="recipient-role">{roles}</select>
            <button class="row-remove" onclick="removeRow(this)" title="Remove">&times;</button>
        </div>"#,
        rid = rid,
        name = html_escape(name),
        email = html_escape(email),
        roles = select_options(&ROLES, role),
    )
}

fn field_row_html(recipients: &[Recipient], field: Option<&Field>) -> String {
    let (recipient_opts, type_sel, page, x, y, w, h) = match field {
        Some(f) => (
            recipient_option_items(recipients, f.recipient_id),
            f.field_type.to_string(),
            f.page,
            f.position_x,
            f.position_y,
            f.width,
            f.height,
        ),
        // Blank row: the recipient options are filled in client-side
        None => (String::new(), "signature".to_string(), 1, 10.0, 10.0, 20.0, 5.0),
    };

    format!(
        r#"<div class="field-row">
            <select class="field-recipient">{recipient_opts}</select>
            <select class="field-type">{types}</select>
            <label>Pg <input type="number" class="field-page" min="1" value="{page}"></label>
            <label>X <input type="number" class="field-x" min="0" max="100" step="0.1" value="{x}"></label>
            <label>Y <input type="number" class="field-y" min="0" max="100" step="0.1" value="{y}"></label>
            <label>W <input type="number" class="field-w" min="0" max="100" step="0.1" value="{w}"></label>
            <label>H <input type="number" class="field-h" min="0" max="100" step="0.1" value="{h}"></label>
            <button class="row-remove" onclick="removeRow(this)" title="Remove">&times;</button>
        </div>"#,
        recipient_opts = recipient_opts,
        types = select_options(&FIELD_TYPES, &type_sel),
        page = page,
        x = x,
        y = y,
        w = w,
        h = h,
    )
}

// ============================================================================
// Editor Template
// ============================================================================

pub fn render_template_editor(
    template: &Template,
    data_url: &str,
    recipients: &[Recipient],
    fields: &[Field],
) -> String {
    // Use serde_json for proper escaping
    let data_url_json =
        serde_json::to_string(data_url).unwrap_or_else(|_| "\"\"".to_string());

    let recipient_rows: String = recipients
        .iter()
        .map(|r| recipient_row_html(&r.id.to_string(), &r.name, &r.email, &r.role.to_string()))
        .collect();
    let field_rows: String = fields
        .iter()
        .map(|f| field_row_html(recipients, Some(f)))
        .collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Editing: {title}</title>
    <style>{style}</style>
    <style>body {{ overflow: hidden; }}</style>
</head>
<body>
    <div class="editor-container">
        <div class="editor-header">
            <a href="/templates" class="back-link">&larr; Templates</a>
            <input type="text" id="tpl-title" value="{title_attr}" placeholder="Template title">
            <select id="tpl-type" title="Template visibility">{type_options}</select>
            <div class="editor-status" id="editor-status">
                <span class="editor-status-dot"></span>
                <span id="status-text">Ready</span>
            </div>
            <button class="btn" onclick="saveTemplate()">Save</button>
            <button class="btn secondary" onclick="openPreview(documentDataUrl)">Preview</button>
            <a class="btn secondary" href="/templates/{id}/document.pdf">Download</a>
            <button class="btn secondary" onclick="duplicateTemplate()">Duplicate</button>
            <button class="btn danger" onclick="deleteTemplate()">Delete</button>
        </div>
        <div class="editor-body">
            <div class="editor-sidebar">
                <section class="editor-section">
                    <h2>Recipients</h2>
                    <div id="recipient-list">{recipient_rows}</div>
                    <button class="btn secondary" onclick="addRecipientRow()">Add Recipient</button>
                </section>
                <section class="editor-section">
                    <h2>Fields</h2>
                    <div id="field-list">{field_rows}</div>
                    <button class="btn secondary" onclick="addFieldRow()">Add Field</button>
                </section>
            </div>
            <div class="editor-doc-pane">
                <div id="doc-canvas-container">
                    <div class="doc-loading" id="doc-loading">
                        <div class="spinner"></div>
                        <span>Loading document...</span>
                    </div>
                </div>
            </div>
        </div>
    </div>

    {preview_dialog}

    <template id="recipient-row-template">{blank_recipient_row}</template>
    <template id="field-row-template">{blank_field_row}</template>

    <script src="https://cdnjs.cloudflare.com/ajax/libs/pdf.js/3.11.174/pdf.min.js"></script>
    <script>
        // Set pdf.js worker
        pdfjsLib.GlobalWorkerOptions.workerSrc = 'https://cdnjs.cloudflare.com/ajax/libs/pdf.js/3.11.174/pdf.worker.min.js';

        const templateId = {id};
        const documentDataUrl = {data_url_json};

        let hasUnsavedChanges = false;
        // Client-side ids for freshly added recipient rows; negative so they
        // never collide with stored ids.
        let recipientCounter = -1;
        let selectedFieldRow = null;

        function updateStatus(state, text) {{
            const statusEl = document.getElementById('editor-status');
            const textEl = document.getElementById('status-text');
            statusEl.className = 'editor-status ' + state;
            textEl.textContent = text;
        }}

        function markDirty() {{
            hasUnsavedChanges = true;
            updateStatus('pending', 'Unsaved changes');
        }}

        // ------------------------------------------------------------------
        // Sidebar rows
        // ------------------------------------------------------------------

        function collectRecipients() {{
            const rows = document.querySelectorAll('#recipient-list .recipient-row');
            return Array.from(rows).map(row => ({{
                id: parseInt(row.dataset.rid),
                name: row.querySelector('.recipient-name').value.trim(),
                email: row.querySelector('.recipient-email').value.trim(),
                role: row.querySelector('.recipient-role').value
            }}));
        }}

        function collectFields() {{
            const rows = document.querySelectorAll('#field-list .field-row');
            return Array.from(rows).map(row => ({{
                recipient_id: parseInt(row.querySelector('.field-recipient').value),
                field_type: row.querySelector('.field-type').value,
                page: parseInt(row.querySelector('.field-page').value) || 1,
                position_x: parseFloat(row.querySelector('.field-x').value) || 0,
                position_y: parseFloat(row.querySelector('.field-y').value) || 0,
                width: parseFloat(row.querySelector('.field-w').value) || 0,
                height: parseFloat(row.querySelector('.field-h').value) || 0
            }}));
        }}

        // Keep every field's recipient dropdown in sync with the rows above
        function refreshFieldRecipientOptions() {{
            const recipients = collectRecipients();
            document.querySelectorAll('#field-list .field-recipient').forEach(select => {{
                const current = select.value;
                select.innerHTML = '';
                recipients.forEach(r => {{
                    const opt = document.createElement('option');
                    opt.value = r.id;
                    opt.textContent = r.name || r.email || 'Recipient';
                    select.appendChild(opt);
                }});
                if (Array.from(select.options).some(o => o.value === current)) {{
                    select.value = current;
                }}
            }});
        }}

        function selectFieldRow(row) {{
            document.querySelectorAll('#field-list .field-row.selected').forEach(r => {{
                r.classList.remove('selected');
            }});
            selectedFieldRow = row;
            if (row) row.classList.add('selected');
            refreshFieldOverlays();
        }}

        function addRecipientRow() {{
            const tpl = document.getElementById('recipient-row-template');
            const row = tpl.content.firstElementChild.cloneNode(true);
            row.dataset.rid = recipientCounter--;
            document.getElementById('recipient-list').appendChild(row);
            refreshFieldRecipientOptions();
            markDirty();
        }}

        function addFieldRow() {{
            if (collectRecipients().length === 0) {{
                alert('Add a recipient first; every field belongs to one.');
                return;
            }}
            const tpl = document.getElementById('field-row-template');
            const row = tpl.content.firstElementChild.cloneNode(true);
            document.getElementById('field-list').appendChild(row);
            refreshFieldRecipientOptions();
            selectFieldRow(row);
            markDirty();
        }}

        function removeRow(btn) {{
            const row = btn.closest('.recipient-row, .field-row');
            if (row === selectedFieldRow) selectedFieldRow = null;
            row.remove();
            refreshFieldRecipientOptions();
            refreshFieldOverlays();
            markDirty();
        }}

        document.querySelector('.editor-sidebar').addEventListener('input', (e) => {{
            markDirty();
            if (e.target.closest('.recipient-row')) {{
                refreshFieldRecipientOptions();
            }}
            if (e.target.closest('.field-row')) {{
                refreshFieldOverlays();
            }}
        }});
        document.getElementById('field-list').addEventListener('click', (e) => {{
            const row = e.target.closest('.field-row');
            // Removal clicks bubble here after the row is already detached
            if (row && row.isConnected && row !== selectedFieldRow) selectFieldRow(row);
        }});
        document.getElementById('tpl-title').addEventListener('input', markDirty);
        document.getElementById('tpl-type').addEventListener('change', markDirty);

        // ------------------------------------------------------------------
        // API actions
        // ------------------------------------------------------------------

        async function saveTemplate() {{
            const fields = collectFields();
            if (fields.some(f => isNaN(f.recipient_id))) {{
                updateStatus('error', 'Every field needs a recipient');
                return;
            }}

            updateStatus('saving', 'Saving...');

            try {{
                const response = await fetch('/api/templates/' + templateId, {{
                    method: 'POST',
                    headers: {{ 'Content-Type': 'application/json' }},
                    body: JSON.stringify({{
                        title: document.getElementById('tpl-title').value,
                        template_type: document.getElementById('tpl-type').value,
                        recipients: collectRecipients(),
                        fields: fields
                    }})
                }});

                if (response.ok) {{
                    hasUnsavedChanges = false;
                    const now = new Date();
                    const timeStr = now.toLocaleTimeString('en-US', {{ hour: 'numeric', minute: '2-digit' }});
                    updateStatus('saved', 'Saved at ' + timeStr);
                }} else {{
                    const err = await response.text();
                    updateStatus('error', err || 'Save failed');
                }}
            }} catch (e) {{
                updateStatus('error', 'Save failed');
                console.error('Save error:', e);
            }}
        }}

        async function deleteTemplate() {{
            const confirmed = confirm('Delete this template?\n\nIts recipients and fields go with it.');
            if (!confirmed) return;

            try {{
                const response = await fetch('/api/templates/' + templateId, {{
                    method: 'DELETE',
                    headers: {{ 'Content-Type': 'application/json' }},
                    body: JSON.stringify({{ confirm: true }})
                }});

                if (response.ok) {{
                    window.location.href = '/templates';
                }} else {{
                    const err = await response.text();
                    alert('Failed to delete: ' + err);
                }}
            }} catch (e) {{
                alert('Error deleting template: ' + e.message);
            }}
        }}

        async function duplicateTemplate() {{
            try {{
                const response = await fetch('/api/templates/' + templateId + '/duplicate', {{
                    method: 'POST'
                }});

                if (response.ok) {{
                    const data = await response.json();
                    window.location.href = '/templates/' + data.id;
                }} else {{
                    const err = await response.text();
                    alert('Failed to duplicate: ' + err);
                }}
            }} catch (e) {{
                alert('Error duplicating template: ' + e.message);
            }}
        }}

        // ------------------------------------------------------------------
        // Document pane
        // ------------------------------------------------------------------

        // Redraws the placement boxes over the rendered pages
        function refreshFieldOverlays() {{
            document.querySelectorAll('.field-box').forEach(box => box.remove());
            document.querySelectorAll('#field-list .field-row').forEach(row => {{
                const page = parseInt(row.querySelector('.field-page').value) || 1;
                const pageEl = document.querySelector('.doc-page[data-page="' + page + '"]');
                if (!pageEl) return;

                const box = document.createElement('div');
                box.className = 'field-box' + (row === selectedFieldRow ? ' selected' : '');
                box.style.left = (parseFloat(row.querySelector('.field-x').value) || 0) + '%';
                box.style.top = (parseFloat(row.querySelector('.field-y').value) || 0) + '%';
                box.style.width = (parseFloat(row.querySelector('.field-w').value) || 0) + '%';
                box.style.height = (parseFloat(row.querySelector('.field-h').value) || 0) + '%';
                box.textContent = row.querySelector('.field-type').value;
                pageEl.appendChild(box);
            }});
        }}

        // Clicking a page moves the selected field's top-left corner there
        function placeSelectedField(pageEl, e) {{
            if (!selectedFieldRow) return;
            const rect = pageEl.getBoundingClientRect();
            const w = parseFloat(selectedFieldRow.querySelector('.field-w').value) || 0;
            const h = parseFloat(selectedFieldRow.querySelector('.field-h').value) || 0;
            const x = ((e.clientX - rect.left) / rect.width) * 100;
            const y = ((e.clientY - rect.top) / rect.height) * 100;

            selectedFieldRow.querySelector('.field-page').value = pageEl.dataset.page;
            selectedFieldRow.querySelector('.field-x').value = Math.max(0, Math.min(x, 100 - w)).toFixed(1);
            selectedFieldRow.querySelector('.field-y').value = Math.max(0, Math.min(y, 100 - h)).toFixed(1);
            markDirty();
            refreshFieldOverlays();
        }}

        async function renderDocument() {{
            const container = document.getElementById('doc-canvas-container');
            const loading = document.getElementById('doc-loading');
            const dpr = window.devicePixelRatio || 1;

            try {{
                const pdf = await pdfjsLib.getDocument(documentDataUrl).promise;
                loading.style.display = 'none';

                for (let pageNum = 1; pageNum <= pdf.numPages; pageNum++) {{
                    const page = await pdf.getPage(pageNum);
                    const viewport = page.getViewport({{ scale: 1.25 }});

                    const canvas = document.createElement('canvas');
                    const ctx = canvas.getContext('2d');

                    // High DPI support
                    canvas.width = Math.floor(viewport.width * dpr);
                    canvas.height = Math.floor(viewport.height * dpr);
                    canvas.style.width = Math.floor(viewport.width) + 'px';
                    canvas.style.height = Math.floor(viewport.height) + 'px';
                    ctx.scale(dpr, dpr);

                    const pageEl = document.createElement('div');
                    pageEl.className = 'doc-page';
                    pageEl.dataset.page = pageNum;
                    pageEl.addEventListener('click', (e) => placeSelectedField(pageEl, e));
                    pageEl.appendChild(canvas);
                    container.appendChild(pageEl);

                    await page.render({{
                        canvasContext: ctx,
                        viewport: viewport
                    }}).promise;
                }}

                refreshFieldOverlays();
            }} catch (error) {{
                loading.style.display = 'none';
                container.innerHTML = '<div class="doc-error">Failed to render document: ' + error.message + '</div>';
                console.error('Document render error:', error);
            }}
        }}

        renderDocument();

        // Warn before leaving with unsaved changes
        window.addEventListener('beforeunload', (e) => {{
            if (hasUnsavedChanges) {{
                e.preventDefault();
                e.returnValue = '';
            }}
        }});
    </script>
</body>
</html>"##,
        title = html_escape(&template.title),
        style = STYLE,
        title_attr = html_escape(&template.title),
        type_options = select_options(&["public", "private"], &template.template_type.to_string()),
        id = template.id,
        recipient_rows = recipient_rows,
        field_rows = field_rows,
        preview_dialog = preview_dialog_html(),
        blank_recipient_row = recipient_row_html("", "", "", "signer"),
        blank_field_row = field_row_html(&[], None),
        data_url_json = data_url_json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldType, RecipientRole, TemplateType};
    use chrono::Utc;

    fn sample_template() -> Template {
        Template {
            id: 5,
            user_id: 1,
            title: "Lease <Agreement>".to_string(),
            template_type: TemplateType::Public,
            document_data_id: "doc5".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_recipient() -> Recipient {
        Recipient {
            id: 9,
            template_id: 5,
            email: "tenant@example.com".to_string(),
            name: "Tenant".to_string(),
            role: RecipientRole::Signer,
            token: "tok".to_string(),
        }
    }

    fn sample_field() -> Field {
        Field {
            id: 4,
            template_id: 5,
            recipient_id: 9,
            field_type: FieldType::Signature,
            page: 2,
            position_x: 12.5,
            position_y: 80.0,
            width: 25.0,
            height: 6.0,
        }
    }

    #[test]
    fn test_editor_embeds_data_url_and_id() {
        let html = render_template_editor(
            &sample_template(),
            "data:application/pdf;base64,JVBERi0=",
            &[],
            &[],
        );
        assert!(html.contains("const templateId = 5;"));
        assert!(html.contains(r#"const documentDataUrl = "data:application/pdf;base64,JVBERi0=";"#));
        assert!(html.contains(r#"href="/templates/5/document.pdf""#));
    }

    #[test]
    fn test_editor_escapes_title() {
        let html = render_template_editor(&sample_template(), "data:,", &[], &[]);
        assert!(html.contains("Editing: Lease &lt;Agreement&gt;"));
        assert!(html.contains(r#"value="Lease &lt;Agreement&gt;""#));
        assert!(!html.contains("<Agreement>"));
    }

    #[test]
    fn test_editor_renders_recipient_and_field_rows() {
        let html = render_template_editor(
            &sample_template(),
            "data:,",
            &[sample_recipient()],
            &[sample_field()],
        );
        assert!(html.contains(r#"data-rid="9""#));
        assert!(html.contains(r#"value="tenant@example.com""#));
        assert!(html.contains(r#"<option value="signer" selected>"#));
        assert!(html.contains(r#"<option value="signature" selected>"#));
        assert!(html.contains(r#"<option value="9" selected>Tenant</option>"#));
        assert!(html.contains(r#"value="12.5""#));
        assert!(html.contains(r#"value="2""#));
    }

    #[test]
    fn test_editor_type_select_marks_current() {
        let html = render_template_editor(&sample_template(), "data:,", &[], &[]);
        assert!(html.contains(r#"<option value="public" selected>public</option>"#));
        assert!(html.contains(r#"<option value="private">private</option>"#));
    }

    #[test]
    fn test_editor_includes_preview_dialog_and_blank_rows() {
        let html = render_template_editor(&sample_template(), "data:,", &[], &[]);
        assert!(html.contains(r#"id="preview-overlay""#));
        assert!(html.contains(r#"<template id="recipient-row-template">"#));
        assert!(html.contains(r#"<template id="field-row-template">"#));
        assert!(html.contains("pdf.min.js"));
    }

    #[test]
    fn test_editor_api_paths() {
        let html = render_template_editor(&sample_template(), "data:,", &[], &[]);
        assert!(html.contains("'/api/templates/' + templateId"));
        assert!(html.contains("+ '/duplicate'"));
        assert!(html.contains("method: 'DELETE'"));
    }

    #[test]
    fn test_editor_field_placement_script() {
        let html = render_template_editor(&sample_template(), "data:,", &[], &[]);
        assert!(html.contains("function refreshFieldOverlays()"));
        assert!(html.contains("function placeSelectedField(pageEl, e)"));
        assert!(html.contains("pageEl.className = 'doc-page';"));
        assert!(html.contains("box.className = 'field-box'"));
        assert!(html.contains("selectFieldRow(row)"));
    }
}
