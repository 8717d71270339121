//! Full-screen template preview dialog.
//!
//! Shared by the list and editor pages. The dialog takes a PDF data URL,
//! renders every page into a canvas column, and fades the document in once
//! rendering has finished. Clicking the dimmed backdrop or the close button
//! dismisses it; clicks inside the document area do not.

pub fn preview_dialog_html() -> &'static str {
    r##"
    <!-- Template Preview Modal -->
    <div class="preview-overlay" id="preview-overlay" onclick="if(event.target===this)closePreview()">
        <div class="preview-modal" onclick="event.stopPropagation()">
            <div class="preview-header">
                <h2>Preview</h2>
                <button class="preview-close" onclick="closePreview()" title="Close">&times;</button>
            </div>
            <div class="preview-body">
                <div class="preview-loading" id="preview-loading">
                    <div class="spinner"></div>
                    <span>Loading document...</span>
                </div>
                <div class="preview-doc" id="preview-doc"></div>
            </div>
        </div>
    </div>

    <script>
    let documentLoaded = false;
    let previewRenderToken = 0;

    function openPreview(dataUrl) {
        const overlay = document.getElementById('preview-overlay');
        const doc = document.getElementById('preview-doc');
        const loading = document.getElementById('preview-loading');

        documentLoaded = false;
        doc.classList.remove('loaded');
        doc.innerHTML = '';
        loading.style.display = 'flex';
        overlay.classList.add('active');

        renderPreviewDocument(dataUrl);
    }

    function closePreview() {
        const overlay = document.getElementById('preview-overlay');
        const doc = document.getElementById('preview-doc');

        documentLoaded = false;
        previewRenderToken++;
        overlay.classList.remove('active');
        doc.classList.remove('loaded');
    }

    async function renderPreviewDocument(dataUrl) {
        const doc = document.getElementById('preview-doc');
        const loading = document.getElementById('preview-loading');
        // Invalidates in-flight renders when the dialog is reopened
        const token = ++previewRenderToken;

        try {
            const pdf = await pdfjsLib.getDocument(dataUrl).promise;
            if (token !== previewRenderToken) return;

            for (let pageNum = 1; pageNum <= pdf.numPages; pageNum++) {
                const page = await pdf.getPage(pageNum);
                if (token !== previewRenderToken) return;

                const viewport = page.getViewport({ scale: 1.25 });
                const canvas = document.createElement('canvas');
                const ctx = canvas.getContext('2d');
                canvas.width = viewport.width;
                canvas.height = viewport.height;
                doc.appendChild(canvas);

                await page.render({ canvasContext: ctx, viewport: viewport }).promise;
            }

            if (token !== previewRenderToken) return;
            loading.style.display = 'none';
            documentLoaded = true;
            doc.classList.add('loaded');
        } catch (error) {
            if (token !== previewRenderToken) return;
            loading.style.display = 'none';
            doc.innerHTML = '<div class="preview-error">Failed to load document: ' + error.message + '</div>';
            doc.classList.add('loaded');
        }
    }
    </script>
    "##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backdrop_click_closes_but_inner_clicks_do_not() {
        let html = preview_dialog_html();
        assert!(html.contains(r#"onclick="if(event.target===this)closePreview()""#));
        assert!(html.contains(r#"onclick="event.stopPropagation()""#));
    }

    #[test]
    fn test_close_button_present() {
        let html = preview_dialog_html();
        assert!(html.contains(r#"onclick="closePreview()""#));
        assert!(html.contains("&times;"));
    }

    #[test]
    fn test_loaded_flag_starts_false_and_flips_after_render() {
        let html = preview_dialog_html();
        assert!(html.contains("let documentLoaded = false;"));
        // open resets, render completion sets
        let open_body = html
            .split("function openPreview")
            .nth(1)
            .and_then(|rest| rest.split("function closePreview").next())
            .expect("openPreview body");
        assert!(open_body.contains("documentLoaded = false;"));
        assert!(open_body.contains("classList.remove('loaded')"));
        let render_body = html
            .split("async function renderPreviewDocument")
            .nth(1)
            .expect("render body");
        assert!(render_body.contains("documentLoaded = true;"));
        assert!(render_body.contains("classList.add('loaded')"));
    }

    #[test]
    fn test_close_resets_state() {
        let html = preview_dialog_html();
        let close_body = html
            .split("function closePreview")
            .nth(1)
            .and_then(|rest| rest.split("async function").next())
            .expect("closePreview body");
        assert!(close_body.contains("documentLoaded = false;"));
        assert!(close_body.contains("classList.remove('active')"));
        assert!(close_body.contains("classList.remove('loaded')"));
    }
}
