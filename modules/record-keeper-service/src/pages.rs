//! HTML pages for browsing and editing records.
//!
//! Each page is a self-contained document with inline CSS. All record text
//! goes through [`escape`] before it reaches the markup.

use axum::http::StatusCode;
use record_keeper_types::{Record, RecordSummary};
use std::borrow::Cow;

const STYLE: &str = r#"
  * { margin: 0; padding: 0; box-sizing: border-box; }
  body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #0f1117; color: #e0e0e0; padding: 20px; max-width: 860px; margin: 0 auto; }
  h1 { color: #58a6ff; margin-bottom: 8px; }
  .meta { color: #8b949e; font-size: 0.85em; margin-bottom: 20px; }
  a { color: #58a6ff; text-decoration: none; }
  a:hover { text-decoration: underline; }
  nav { margin-bottom: 20px; display: flex; gap: 16px; }
  ul.records { list-style: none; }
  ul.records li { padding: 8px 12px; border-bottom: 1px solid #21262d; }
  ul.records li:hover { background: #161b22; }
  .mono { font-family: 'SF Mono', 'Consolas', monospace; font-size: 0.85em; color: #8b949e; }
  .content { background: #161b22; border: 1px solid #30363d; border-radius: 8px; padding: 16px; white-space: pre-wrap; margin-bottom: 20px; }
  label { display: block; color: #8b949e; font-size: 0.85em; margin: 12px 0 4px; }
  input, textarea { width: 100%; background: #161b22; border: 1px solid #30363d; border-radius: 6px; color: #e0e0e0; padding: 8px; font: inherit; }
  textarea { min-height: 240px; }
  button { margin-top: 12px; background: #238636; border: none; border-radius: 6px; color: #fff; padding: 8px 16px; cursor: pointer; }
  button.danger { background: #da3633; }
  .actions { display: flex; gap: 12px; align-items: center; }
  .actions form { display: inline; }
  .error { color: #f85149; }
"#;

const ESCAPE_CHARS: &[char] = &['<', '>', '&', '"', '\''];

/// Escape text for use in element content or a quoted attribute.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// `/<action>/<slug>` with the slug percent-encoded.
pub fn record_url(action: &str, slug: &str) -> String {
    format!("/{}/{}", action, urlencoding::encode(slug))
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
  <nav><a href="/">All records</a><a href="/new/">New record</a></nav>
{body}
</body>
</html>"#,
        title = escape(title),
        style = STYLE,
        body = body,
    )
}

pub fn index_page(records: &[RecordSummary]) -> String {
    let mut items = String::new();
    for r in records {
        items.push_str(&format!(
            "    <li><a href=\"{}\">{}</a> <span class=\"mono\">{}</span></li>\n",
            escape(&record_url("show", &r.slug)),
            escape(&r.title),
            escape(&r.slug),
        ));
    }
    if items.is_empty() {
        items = "    <li>No records yet.</li>\n".to_string();
    }

    let body = format!(
        r#"  <h1>Records</h1>
  <p class="meta">{count} stored</p>
  <ul class="records">
{items}  </ul>"#,
        count = records.len(),
        items = items,
    );
    layout("Records", &body)
}

pub fn show_page(record: &Record, slug: &str) -> String {
    let body = format!(
        r#"  <h1>{title}</h1>
  <p class="meta mono">{slug}</p>
  <div class="content">{content}</div>
  <div class="actions">
    <a href="{edit_url}">Edit</a>
    <form method="post" action="{delete_url}"><button class="danger" type="submit">Delete</button></form>
  </div>"#,
        title = escape(&record.title),
        slug = escape(slug),
        content = escape(&record.content),
        edit_url = escape(&record_url("edit", slug)),
        delete_url = escape(&record_url("delete", slug)),
    );
    layout(&record.title, &body)
}

pub fn edit_page(record: &Record, slug: &str) -> String {
    let body = format!(
        r#"  <h1>Editing {title}</h1>
  <form method="post" action="{save_url}">
    <label for="title">Title</label>
    <input id="title" name="title" value="{title}" readonly>
    <label for="content">Content</label>
    <textarea id="content" name="content">{content}</textarea>
    <button type="submit">Save</button>
  </form>"#,
        title = escape(&record.title),
        content = escape(&record.content),
        save_url = escape(&record_url("save", slug)),
    );
    layout(&format!("Editing {}", record.title), &body)
}

pub fn new_page() -> String {
    let body = r#"  <h1>New record</h1>
  <form method="post" action="/create/">
    <label for="title">Title</label>
    <input id="title" name="title" required>
    <label for="content">Content</label>
    <textarea id="content" name="content"></textarea>
    <button type="submit">Create</button>
  </form>"#;
    layout("New record", body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"  <h1>{code}</h1>
  <p class="error">{message}</p>"#,
        code = status,
        message = escape(message),
    );
    layout(&status.to_string(), &body)
}
