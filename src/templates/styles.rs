//! CSS styles for the template application.
//!
//! Contains the main STYLE constant with all CSS for the web interface.

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
/* Solarized Light Theme */
:root {
    --base03: #002b36;
    --base02: #073642;
    --base01: #586e75;
    --base00: #657b83;
    --base0: #839496;
    --base1: #93a1a1;
    --base2: #eee8d5;
    --base3: #fdf6e3;

    --yellow: #b58900;
    --orange: #cb4b16;
    --red: #dc322f;
    --magenta: #d33682;
    --violet: #6c71c4;
    --blue: #268bd2;
    --cyan: #2aa198;
    --green: #859900;

    --bg: var(--base3);
    --fg: var(--base00);
    --muted: var(--base1);
    --border: var(--base2);
    --link: var(--blue);
    --link-hover: var(--cyan);
    --accent: var(--base2);
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.6;
    color: var(--fg);
    background: var(--bg);
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    padding: 1rem;
}

a { color: var(--link); text-decoration: none; }
a:hover { color: var(--link-hover); text-decoration: underline; }

h1, h2, h3 { font-weight: 600; margin-top: 1.5em; margin-bottom: 0.5em; }
h1 { font-size: 1.5rem; }

.nav-bar {
    position: sticky;
    top: 0;
    background: var(--bg);
    border-bottom: 1px solid var(--border);
    padding: 0.5rem 1rem;
    display: flex;
    gap: 1rem;
    align-items: center;
    flex-wrap: wrap;
    z-index: 100;
}

.nav-bar a { font-size: 0.9rem; }
.nav-bar .brand { font-weight: 700; }
.nav-bar .spacer { flex: 1; }

.page-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 1rem;
    flex-wrap: wrap;
    gap: 0.5rem;
}
.page-header h1 { margin: 0; }

.btn {
    padding: 0.5rem 1rem;
    border: 1px solid var(--base1);
    border-radius: 4px;
    background: var(--blue);
    color: var(--base3);
    cursor: pointer;
    font-size: 0.9rem;
    font-family: inherit;
    text-decoration: none;
    display: inline-block;
}

.btn:hover { background: var(--cyan); border-color: var(--cyan); }
.btn.secondary { background: var(--base2); color: var(--base00); border-color: var(--base1); }
.btn.secondary:hover { background: var(--base3); }
.btn.danger { background: var(--red); color: white; border-color: var(--red); }
.btn.danger:hover { background: #b02020; border-color: #b02020; }

/* Template Table */
.template-table { width: 100%; border-collapse: collapse; font-size: 0.9rem; margin-top: 1rem; }
.template-table th, .template-table td { padding: 0.6rem 0.5rem; text-align: left; border-bottom: 1px solid var(--border); }
.template-table th { font-weight: 600; font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.05em; color: var(--base01); }
.template-table td.created { color: var(--muted); white-space: nowrap; font-size: 0.85rem; }
.template-table .title { font-size: 1rem; }
.template-table .row-actions { display: flex; gap: 0.4rem; justify-content: flex-end; }
.template-table .row-actions .btn { padding: 0.25rem 0.6rem; font-size: 0.8rem; }

.type-badge {
    font-size: 0.65rem;
    padding: 0.1rem 0.4rem;
    background: var(--accent);
    border-radius: 3px;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    vertical-align: middle;
}
.type-badge.type-public { background: var(--green); color: var(--base3); }

.empty-state {
    margin: 3rem 0;
    padding: 2rem;
    text-align: center;
    color: var(--muted);
    background: var(--accent);
    border-radius: 8px;
}

.pagination {
    display: flex;
    gap: 1rem;
    align-items: center;
    justify-content: center;
    margin-top: 1.5rem;
}
.pagination .page-info { font-size: 0.85rem; color: var(--muted); }

/* Auth Forms */
.login-form {
    max-width: 320px;
    margin: 4rem auto;
    padding: 2rem;
    background: var(--accent);
    border-radius: 8px;
}

.login-form h1 {
    margin-top: 0;
    margin-bottom: 1.5rem;
    text-align: center;
}

.login-form input {
    width: 100%;
    padding: 0.75rem;
    margin-bottom: 1rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: var(--bg);
    color: var(--fg);
    font-size: 1rem;
}

.login-form button {
    width: 100%;
    padding: 0.75rem;
    background: var(--link);
    color: white;
    border: none;
    border-radius: 4px;
    font-size: 1rem;
    cursor: pointer;
}

.login-form button:hover { background: var(--link-hover); }

.login-form .form-footer {
    margin-top: 1rem;
    text-align: center;
    font-size: 0.85rem;
}

.message {
    padding: 0.75rem 1rem;
    border-radius: 4px;
    margin-bottom: 1rem;
}
.message.error { background: #fdf2f2; color: var(--red); border: 1px solid var(--red); }
.message.success { background: #f5f9f5; color: var(--green); border: 1px solid var(--green); }

/* Upload Form */
.upload-form { max-width: 500px; }
.upload-form .form-group { margin-bottom: 1rem; }
.upload-form label { display: block; margin-bottom: 0.25rem; font-weight: 600; font-size: 0.9rem; }
.upload-form input[type="file"] {
    width: 100%;
    padding: 1.5rem;
    border: 2px dashed var(--base1);
    border-radius: 8px;
    background: var(--accent);
    cursor: pointer;
}
.upload-form small { font-size: 0.8rem; color: var(--muted); }
.upload-form .form-actions { display: flex; gap: 1rem; margin-top: 1.5rem; }

/* Editor Layout */
.editor-container {
    position: fixed;
    top: 0;
    left: 0;
    right: 0;
    bottom: 0;
    z-index: 500;
    background: #fdf6e3; /* solarized-light base3 */
}

.editor-header {
    position: absolute;
    top: 0;
    left: 0;
    right: 0;
    height: 48px;
    background: #eee8d5; /* solarized-light base2 */
    border-bottom: 1px solid #93a1a1;
    display: flex;
    align-items: center;
    padding: 0 1rem;
    gap: 0.6rem;
    z-index: 501;
}

.editor-header .back-link { font-size: 0.9rem; white-space: nowrap; }
.editor-header .btn { padding: 0.35rem 0.8rem; font-size: 0.85rem; }

.editor-header #tpl-title {
    flex: 1;
    min-width: 150px;
    max-width: 400px;
    padding: 0.35rem 0.6rem;
    border: 1px solid var(--base1);
    border-radius: 4px;
    background: var(--bg);
    color: var(--fg);
    font-size: 0.95rem;
    font-weight: 500;
}

.editor-header select {
    padding: 0.35rem 0.5rem;
    border: 1px solid var(--base1);
    border-radius: 4px;
    background: var(--bg);
    color: var(--fg);
    font-size: 0.85rem;
}

.editor-status {
    font-size: 0.8rem;
    color: #93a1a1; /* solarized-light base1 */
    display: flex;
    align-items: center;
    gap: 0.5rem;
    white-space: nowrap;
}

.editor-status.saving { color: #268bd2; } /* solarized blue */
.editor-status.saved { color: #859900; } /* solarized green */
.editor-status.error { color: #dc322f; } /* solarized red */

.editor-status-dot {
    width: 8px;
    height: 8px;
    border-radius: 50%;
    background: currentColor;
}

.editor-body {
    position: absolute;
    top: 48px;
    left: 0;
    right: 0;
    bottom: 0;
    display: flex;
}

.editor-sidebar {
    width: 460px;
    overflow-y: auto;
    padding: 1rem;
    border-right: 1px solid var(--border);
}

.editor-sidebar h2 { font-size: 1rem; margin-top: 0; }
.editor-section { margin-bottom: 2rem; }
.editor-section > .btn { margin-top: 0.5rem; }

.recipient-row, .field-row {
    display: flex;
    gap: 0.4rem;
    align-items: center;
    padding: 0.4rem 0;
    border-bottom: 1px solid var(--border);
    flex-wrap: wrap;
}

.recipient-row input, .field-row input, .recipient-row select, .field-row select {
    padding: 0.3rem 0.5rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: var(--bg);
    color: var(--fg);
    font-size: 0.85rem;
}

.recipient-row .recipient-name { width: 110px; }
.recipient-row .recipient-email { flex: 1; min-width: 140px; }

.field-row label { font-size: 0.75rem; color: var(--muted); display: flex; align-items: center; gap: 0.2rem; }
.field-row input[type="number"] { width: 58px; }
.field-row .field-recipient { max-width: 140px; }

.row-remove {
    background: none;
    border: none;
    color: var(--red);
    cursor: pointer;
    font-size: 1.1rem;
    padding: 0 0.3rem;
    line-height: 1;
}

.editor-doc-pane {
    flex: 1;
    overflow-y: auto;
    background: var(--base2);
    padding: 1rem;
}

#doc-canvas-container { display: flex; flex-direction: column; align-items: center; gap: 1rem; }
#doc-canvas-container canvas { box-shadow: 0 2px 8px rgba(0,0,0,0.25); background: white; display: block; }

.doc-page { position: relative; cursor: crosshair; }

/* Field placement boxes overlaid on the rendered pages */
.field-box {
    position: absolute;
    border: 1px dashed var(--blue);
    background: rgba(38, 139, 210, 0.12);
    color: var(--blue);
    font-size: 0.6rem;
    line-height: 1.2;
    padding: 1px 2px;
    overflow: hidden;
    pointer-events: none;
}

.field-box.selected {
    border-style: solid;
    background: rgba(38, 139, 210, 0.22);
}

.field-row.selected { background: var(--base2); border-radius: 4px; }

.doc-loading {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    padding: 2rem;
    color: var(--muted);
}

.doc-error, .preview-error {
    padding: 1rem;
    color: var(--red);
    background: #fdf2f2;
    border: 1px solid var(--red);
    border-radius: 4px;
}

.spinner {
    width: 20px;
    height: 20px;
    border: 2px solid var(--border);
    border-top-color: var(--link);
    border-radius: 50%;
    animation: spin 1s linear infinite;
}
@keyframes spin {
    to { transform: rotate(360deg); }
}

/* Preview Modal */
.preview-overlay {
    position: fixed;
    top: 0;
    left: 0;
    right: 0;
    bottom: 0;
    background: rgba(0,0,0,0.5);
    z-index: 1001;
    display: none;
    align-items: center;
    justify-content: center;
}
.preview-overlay.active {
    display: flex;
}

.preview-modal {
    background: var(--bg);
    border-radius: 8px;
    width: 95%;
    height: 95vh;
    display: flex;
    flex-direction: column;
    overflow: hidden;
    box-shadow: 0 8px 32px rgba(0,0,0,0.3);
}

.preview-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    padding: 0.75rem 1.5rem;
    border-bottom: 1px solid var(--border);
}
.preview-header h2 {
    margin: 0;
    font-size: 1.1rem;
}
.preview-close {
    background: none;
    border: none;
    font-size: 1.5rem;
    cursor: pointer;
    color: var(--muted);
    padding: 0;
    line-height: 1;
}
.preview-close:hover {
    color: var(--fg);
}

.preview-body {
    flex: 1;
    overflow-y: auto;
    background: var(--base2);
    padding: 1rem;
    position: relative;
}

.preview-loading {
    display: flex;
    align-items: center;
    justify-content: center;
    gap: 0.5rem;
    padding: 2rem;
    color: var(--muted);
}

/* Document fades in once rendering has finished */
.preview-doc {
    opacity: 0;
    transition: opacity 0.3s ease;
    display: flex;
    flex-direction: column;
    align-items: center;
    gap: 1rem;
}
.preview-doc.loaded {
    opacity: 1;
}
.preview-doc canvas { box-shadow: 0 2px 8px rgba(0,0,0,0.25); background: white; max-width: 100%; }
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_opacity_transition_rules() {
        assert!(STYLE.contains(".preview-doc {"));
        assert!(STYLE.contains("opacity: 0;"));
        assert!(STYLE.contains("transition: opacity 0.3s ease;"));
        assert!(STYLE.contains(".preview-doc.loaded {"));
        assert!(STYLE.contains("opacity: 1;"));
    }

    #[test]
    fn test_overlay_hidden_until_active() {
        let overlay_rule = STYLE
            .split(".preview-overlay {")
            .nth(1)
            .and_then(|rest| rest.split('}').next())
            .expect("overlay rule present");
        assert!(overlay_rule.contains("display: none;"));
        assert!(STYLE.contains(".preview-overlay.active {"));
    }
}
