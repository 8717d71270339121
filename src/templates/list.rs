//! Template list page.

use crate::models::TemplateListing;

use super::components::{base_html, html_escape, js_escape, pagination_nav, type_badge};
use super::preview::preview_dialog_html;

// ============================================================================
// List Page
// ============================================================================

pub fn render_templates_page(listing: &TemplateListing, page: i64, per_page: i64) -> String {
    let mut content = String::from(
        r#"<div class="page-header">
        <h1>Templates</h1>
        <a href="/templates/new" class="btn">New Template</a>
    </div>"#,
    );

    if listing.templates.is_empty() {
        content.push_str(
            r#"<div class="empty-state">
            <p>No templates yet. Upload a PDF to create your first template.</p>
        </div>"#,
        );
    } else {
        content.push_str(r#"<table class="template-table">"#);
        content.push_str("<tr><th>Created</th><th>Title</th><th>Type</th><th></th></tr>");

        for template in &listing.templates {
            // Title inside an onclick attribute goes through both escapes:
            // js_escape for the string literal, html_escape for the attribute.
            let title_attr = html_escape(&js_escape(&template.title));
            content.push_str(&format!(
                r#"<tr>
                <td class="created">{created}</td>
                <td><a class="title" href="/templates/{id}">{title}</a></td>
                <td>{badge}</td>
                <td><div class="row-actions">
                    <button class="btn secondary" onclick="previewTemplate({id})">Preview</button>
                    <a class="btn secondary" href="/templates/{id}">Edit</a>
                    <button class="btn danger" onclick="confirmDelete({id}, '{title_attr}')">Delete</button>
                </div></td>
            </tr>"#,
                created = template.created_at.format("%Y-%m-%d"),
                id = template.id,
                title = html_escape(&template.title),
                badge = type_badge(template.template_type),
                title_attr = title_attr,
            ));
        }

        content.push_str("</table>");
        content.push_str(&pagination_nav(page, per_page, listing.total_pages));
    }

    content.push_str(preview_dialog_html());
    content.push_str(LIST_SCRIPT);

    base_html("Templates", &content, true)
}

const LIST_SCRIPT: &str = r#"
    <script src="https://cdnjs.cloudflare.com/ajax/libs/pdf.js/3.11.174/pdf.min.js"></script>
    <script>
    pdfjsLib.GlobalWorkerOptions.workerSrc = 'https://cdnjs.cloudflare.com/ajax/libs/pdf.js/3.11.174/pdf.worker.min.js';

    async function previewTemplate(id) {
        try {
            const response = await fetch('/api/templates/' + id + '/data-url');
            if (!response.ok) {
                alert('Failed to load preview: ' + response.status);
                return;
            }
            const data = await response.json();
            openPreview(data.data_url);
        } catch (e) {
            alert('Failed to load preview: ' + e.message);
        }
    }
    </script>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Template, TemplateType};
    use chrono::Utc;

    fn sample_template(id: i64, title: &str) -> Template {
        Template {
            id,
            user_id: 1,
            title: title.to_string(),
            template_type: TemplateType::Private,
            document_data_id: format!("doc{}", id),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_state() {
        let listing = TemplateListing {
            templates: vec![],
            total_pages: 0,
        };
        let html = render_templates_page(&listing, 1, 10);
        assert!(html.contains("No templates yet"));
        assert!(!html.contains("template-table\">"));
    }

    #[test]
    fn test_rows_link_to_detail() {
        let listing = TemplateListing {
            templates: vec![sample_template(3, "Rental Agreement"), sample_template(7, "NDA")],
            total_pages: 1,
        };
        let html = render_templates_page(&listing, 1, 10);
        assert!(html.contains(r#"href="/templates/3""#));
        assert!(html.contains(r#"href="/templates/7""#));
        assert!(html.contains("Rental Agreement"));
        assert!(html.contains("previewTemplate(3)"));
        assert!(html.contains("confirmDelete(7, 'NDA')"));
    }

    #[test]
    fn test_titles_are_escaped() {
        let listing = TemplateListing {
            templates: vec![sample_template(1, "<b>Bold's</b> \"Deal\"")],
            total_pages: 1,
        };
        let html = render_templates_page(&listing, 1, 10);
        assert!(!html.contains("<b>Bold"));
        assert!(html.contains("&lt;b&gt;Bold&#39;s&lt;/b&gt;"));
        // onclick attribute keeps the title as a valid JS literal
        assert!(html.contains(r"confirmDelete(1, '\x3cb&gt;Bold\&#39;s"));
    }

    #[test]
    fn test_preview_dialog_and_pdfjs_included() {
        let listing = TemplateListing {
            templates: vec![sample_template(1, "NDA")],
            total_pages: 1,
        };
        let html = render_templates_page(&listing, 1, 10);
        assert!(html.contains(r#"id="preview-overlay""#));
        assert!(html.contains("pdf.min.js"));
        assert!(html.contains("/api/templates/' + id + '/data-url"));
    }

    #[test]
    fn test_pagination_rendered_for_multiple_pages() {
        let listing = TemplateListing {
            templates: vec![sample_template(1, "NDA")],
            total_pages: 5,
        };
        let html = render_templates_page(&listing, 2, 10);
        assert!(html.contains("Page 2 of 5"));
        assert!(html.contains("/templates?page=3&perPage=10"));
    }
}
