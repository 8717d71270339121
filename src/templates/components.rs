//! Shared HTML components for the template application.
//!
//! Contains navigation bar, escaping helpers, and the base HTML template.

use crate::models::TemplateType;

use super::styles::STYLE;

// ============================================================================
// Escaping
// ============================================================================

/// Escape HTML special characters for safe embedding in markup.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape a string for embedding inside a quoted JavaScript string literal.
///
/// When the literal sits inside an HTML attribute (for example an onclick
/// handler) the result still needs [`html_escape`] on top.
pub fn js_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
        .replace('<', "\\x3c")
}

// ============================================================================
// Navigation Bar
// ============================================================================

pub fn nav_bar(logged_in: bool) -> String {
    let auth_link = if logged_in {
        r#"<a href="/logout">Logout</a>"#
    } else {
        r#"<a href="/login">Login</a>"#
    };

    format!(
        r#"<nav class="nav-bar">
            <a href="/templates" class="brand">Signet</a>
            <a href="/templates">Templates</a>
            <a href="/templates/new">New Template</a>
            <span class="spacer"></span>
            {}
        </nav>"#,
        auth_link
    )
}

// ============================================================================
// Widgets
// ============================================================================

/// Render the public/private badge shown next to a template.
pub fn type_badge(template_type: TemplateType) -> String {
    format!(r#"<span class="type-badge type-{0}">{0}</span>"#, template_type)
}

/// Prev/next pagination controls for the list page.
///
/// Collapses to nothing when a single page holds everything.
pub fn pagination_nav(page: i64, per_page: i64, total_pages: i64) -> String {
    if total_pages <= 1 {
        return String::new();
    }

    let mut html = String::from(r#"<div class="pagination">"#);
    if page > 1 {
        html.push_str(&format!(
            r#"<a class="btn secondary" href="/templates?page={}&perPage={}">&larr; Prev</a>"#,
            page - 1,
            per_page
        ));
    }
    html.push_str(&format!(
        r#"<span class="page-info">Page {} of {}</span>"#,
        page, total_pages
    ));
    if page < total_pages {
        html.push_str(&format!(
            r#"<a class="btn secondary" href="/templates?page={}&perPage={}">Next &rarr;</a>"#,
            page + 1,
            per_page
        ));
    }
    html.push_str("</div>");
    html
}

// ============================================================================
// Base HTML Template
// ============================================================================

pub fn base_html(title: &str, content: &str, logged_in: bool) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Signet</title>
    <style>{STYLE}</style>
</head>
<body>
    {nav}
    <div class="container">
        {content}
    </div>
    <script>
    // Confirm and delete template
    async function confirmDelete(id, title) {{
        const confirmed = confirm('Delete "' + title + '"?\n\nThis removes the template along with its recipients and fields. The uploaded document stays on disk.');
        if (!confirmed) return;

        try {{
            const response = await fetch('/api/templates/' + id, {{
                method: 'DELETE',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify({{ confirm: true }})
            }});

            if (response.ok) {{
                window.location.reload();
            }} else {{
                const err = await response.text();
                alert('Failed to delete: ' + err);
            }}
        }} catch (e) {{
            alert('Error deleting template: ' + e.message);
        }}
    }}
    </script>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav_bar(logged_in),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(html_escape("Bob's NDA & more"), "Bob&#39;s NDA &amp; more");
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_js_escape() {
        assert_eq!(js_escape("Bob's NDA"), "Bob\\'s NDA");
        assert_eq!(js_escape(r#"a"b"#), "a\\\"b");
        assert_eq!(js_escape("a\\b"), "a\\\\b");
        assert_eq!(js_escape("</script>"), "\\x3c/script>");
    }

    #[test]
    fn test_base_html_has_nav_and_title() {
        let html = base_html("My <Page>", "<p>hi</p>", true);
        assert!(html.contains("<title>My &lt;Page&gt; - Signet</title>"));
        assert!(html.contains(r#"<a href="/logout">Logout</a>"#));
        assert!(html.contains("<p>hi</p>"));
        assert!(html.contains("confirmDelete"));
    }

    #[test]
    fn test_nav_bar_logged_out() {
        let nav = nav_bar(false);
        assert!(nav.contains(r#"<a href="/login">Login</a>"#));
        assert!(!nav.contains("/logout"));
    }

    #[test]
    fn test_type_badge() {
        assert!(type_badge(TemplateType::Public).contains("type-public"));
        assert!(type_badge(TemplateType::Private).contains(">private</span>"));
    }

    #[test]
    fn test_pagination_single_page_is_empty() {
        assert_eq!(pagination_nav(1, 10, 1), "");
        assert_eq!(pagination_nav(1, 10, 0), "");
    }

    #[test]
    fn test_pagination_first_page_has_next_only() {
        let html = pagination_nav(1, 10, 3);
        assert!(html.contains("Next"));
        assert!(!html.contains("Prev"));
        assert!(html.contains("Page 1 of 3"));
        assert!(html.contains("/templates?page=2&perPage=10"));
    }

    #[test]
    fn test_pagination_middle_page_has_both() {
        let html = pagination_nav(2, 25, 4);
        assert!(html.contains("/templates?page=1&perPage=25"));
        assert!(html.contains("/templates?page=3&perPage=25"));
        assert!(html.contains("Page 2 of 4"));
    }
}
