//! HTML templates and styling for the template application.
//!
//! This module contains all CSS styles, JavaScript code, and HTML
//! generation functions for the web interface.
//!
//! ## Module Structure
//!
//! - `styles` - CSS constants and theme definitions
//! - `components` - Shared HTML components (nav bar, escaping, base template)
//! - `list` - Paginated template list page
//! - `editor` - Template detail editor with document rendering
//! - `preview` - Full-screen preview dialog shared by list and editor

mod styles;
mod components;
mod list;
mod editor;
mod preview;

pub use styles::STYLE;
pub use components::{base_html, html_escape, js_escape, nav_bar, pagination_nav, type_badge};
pub use list::render_templates_page;
pub use editor::render_template_editor;
pub use preview::preview_dialog_html;
