//! HTML page templates for the web interface.
//!
//! Listings themselves come from [`crate::render::listing_html`]; these
//! templates wrap them in the page chrome: header, category tabs, search box
//! and theme toggle.

use crate::render::html_escape;

/// localStorage key holding the theme preference ("1" = dark).
pub const THEME_STORAGE_KEY: &str = "eduhub-dark";

/// Base HTML page.
pub fn base_template(title: &str, content: &str, dark: bool) -> String {
    let theme_attr = if dark { r#" data-theme="dark""# } else { "" };

    format!(
        r#"<!DOCTYPE html>
<html lang="en"{}>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - EduHub</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <header id="main-header">
        <nav>
            <a href="/" class="logo">EduHub</a>
            <a href="/">subjects</a>
            <button id="theme-toggle" class="btn-small" type="button" aria-pressed="{}">theme</button>
        </nav>
    </header>
    <main>
        <h1>{}</h1>
        {}
    </main>
    <script>{}</script>
</body>
</html>"#,
        theme_attr,
        html_escape(title),
        dark,
        html_escape(title),
        content,
        theme_script()
    )
}

/// Inline script that restores and toggles the saved theme.
fn theme_script() -> String {
    format!(
        r#"
(function () {{
    var key = '{key}';
    var root = document.documentElement;
    try {{
        var saved = localStorage.getItem(key);
        if (saved === '1') root.setAttribute('data-theme', 'dark');
        if (saved === '0') root.removeAttribute('data-theme');
    }} catch (e) {{}}
    var toggle = document.getElementById('theme-toggle');
    if (!toggle) return;
    toggle.addEventListener('click', function () {{
        var dark = root.getAttribute('data-theme') !== 'dark';
        if (dark) root.setAttribute('data-theme', 'dark'); else root.removeAttribute('data-theme');
        toggle.setAttribute('aria-pressed', dark ? 'true' : 'false');
        try {{ localStorage.setItem(key, dark ? '1' : '0'); }} catch (e) {{}}
    }});
}})();
"#,
        key = THEME_STORAGE_KEY
    )
}

/// Render the subject index page.
pub fn subjects_list(subjects: &[String]) -> String {
    if subjects.is_empty() {
        return r#"<p class="listing-empty">No subjects found.</p>"#.to_string();
    }

    let mut items = String::new();
    for subject in subjects {
        items.push_str(&format!(
            r#"
        <li><a class="subject-card" href="/subjects/{}">{}/</a></li>"#,
            urlencoding::encode(subject),
            html_escape(subject)
        ));
    }

    format!(
        r#"<ul class="subject-list">{}
    </ul>"#,
        items
    )
}

/// Render a subject page around an already-rendered listing fragment.
pub fn subject_page(
    subject: &str,
    categories: &[String],
    active_category: &str,
    query: &str,
    listing: &str,
) -> String {
    let subject_path = format!("/subjects/{}", urlencoding::encode(subject));

    let mut tabs = String::new();
    for category in categories {
        let class = if category == active_category {
            "subcard active"
        } else {
            "subcard"
        };
        tabs.push_str(&format!(
            r#"
        <a class="{}" data-type="{}" href="{}?category={}">{}</a>"#,
            class,
            html_escape(category),
            subject_path,
            urlencoding::encode(category),
            html_escape(category)
        ));
    }

    format!(
        r#"
    <nav class="breadcrumb">
        <a href="/">Subjects</a> / {}
    </nav>
    <div class="subcards">{}
    </div>
    <form class="search" method="get" action="{}">
        <input type="hidden" name="category" value="{}">
        <input class="search-input" type="search" name="q" value="{}" placeholder="Search files">
    </form>
    {}
    "#,
        html_escape(subject),
        tabs,
        subject_path,
        html_escape(active_category),
        html_escape(query),
        listing
    )
}

/// Render a not-found page body.
pub fn not_found(what: &str) -> String {
    format!(
        r#"<p class="listing-error">{} not found.</p>
    <p><a href="/">Back to subjects</a></p>"#,
        html_escape(what)
    )
}

/// CSS styles for the web interface - minimal text-based design.
pub const CSS: &str = r#"
:root {
    --bg: #fff;
    --text: #222;
    --text-muted: #666;
    --link: #0066cc;
    --link-hover: #004499;
    --border: #ccc;
    --highlight: #fffbcc;
    --error: #b00020;
}

:root[data-theme="dark"] {
    --bg: #1a1a1a;
    --text: #e0e0e0;
    --text-muted: #888;
    --link: #6ab0ff;
    --link-hover: #8dc4ff;
    --border: #444;
    --highlight: #3a3520;
    --error: #ff6b81;
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: 'Lucida Console', 'Courier New', monospace;
    font-size: 14px;
    background: var(--bg);
    color: var(--text);
    line-height: 1.5;
}

a { color: var(--link); text-decoration: none; }
a:hover { color: var(--link-hover); text-decoration: underline; }

#main-header {
    border-bottom: 1px solid var(--border);
    padding: 0.5rem 1rem;
    font-size: 13px;
}

#main-header nav {
    display: flex;
    gap: 1.5rem;
    align-items: center;
}

#main-header .logo {
    font-weight: bold;
    letter-spacing: 1px;
}

.btn-small {
    padding: 2px 8px;
    background: transparent;
    color: var(--link);
    border: 1px solid var(--border);
    font-family: inherit;
    font-size: 11px;
    cursor: pointer;
}
.btn-small:hover { background: var(--highlight); }

main {
    max-width: 1200px;
    margin: 0 auto;
    padding: 1rem;
}

h1 {
    font-size: 16px;
    font-weight: bold;
    margin-bottom: 1rem;
    border-bottom: 1px solid var(--border);
    padding-bottom: 0.5rem;
}

.breadcrumb { margin-bottom: 1rem; color: var(--text-muted); }

.subject-list { list-style: none; }
.subject-list li { padding: 0.25rem 0; }

.subcards { display: flex; gap: 0.75rem; margin-bottom: 1rem; }
.subcard {
    padding: 0.25rem 0.75rem;
    border: 1px solid var(--border);
}
.subcard.active { background: var(--highlight); font-weight: bold; }

.search { margin-bottom: 1rem; }
.search-input {
    width: 100%;
    max-width: 400px;
    padding: 0.25rem 0.5rem;
    font-family: inherit;
    background: var(--bg);
    color: var(--text);
    border: 1px solid var(--border);
}

.listing-stats {
    display: flex;
    gap: 1.5rem;
    font-size: 12px;
    color: var(--text-muted);
    margin-bottom: 0.5rem;
}

.file-listing {
    width: 100%;
    border-collapse: collapse;
}

.file-listing th {
    text-align: left;
    font-weight: normal;
    color: var(--text-muted);
    border-bottom: 1px solid var(--border);
    padding: 0.25rem 0.5rem;
}

.file-listing td {
    padding: 0.25rem 0.5rem;
    border-bottom: 1px dotted var(--border);
}

.file-listing tr:hover { background: var(--highlight); }

.listing-empty, .listing-loading { color: var(--text-muted); text-align: center; padding: 1rem; }
.listing-error { color: var(--error); padding: 1rem; }
"#;
