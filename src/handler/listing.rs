//! Directory listing module
//!
//! Renders the regular files directly inside the shared root as an HTML
//! page of relative links. Sub-directories are not listed.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, ResponseBody};
use crate::logger;
use hyper::Response;
use std::path::Path;

/// One entry of the shared root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub is_file: bool,
}

/// Serve the listing page for `/`
pub async fn serve_listing(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    match render(&state.root).await {
        Ok(html) => http::build_html_response(html, ctx.is_head),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to list shared directory '{}': {e}",
                state.root.display()
            ));
            http::build_404_response()
        }
    }
}

/// Render the listing page for `root`
pub async fn render(root: &Path) -> std::io::Result<String> {
    let entries = read_entries(root).await?;
    Ok(render_html(&entries))
}

/// Read the entries of `root`, sorted by name
///
/// Symlinks are followed when deciding whether an entry is a file, but an
/// entry only counts as a file while its target stays inside `root`, the
/// same rule file requests are resolved with. Names that are not valid
/// UTF-8 are skipped since they cannot be linked to.
pub async fn read_entries(root: &Path) -> std::io::Result<Vec<FileEntry>> {
    let root = tokio::fs::canonicalize(root).await?;
    let mut dir = tokio::fs::read_dir(&root).await?;
    let mut entries = Vec::new();

    while let Some(entry) = dir.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let is_file = is_servable_file(&root, &entry.path()).await;
        entries.push(FileEntry { name, is_file });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Entries can vanish between `read_dir` and these lookups
async fn is_servable_file(root: &Path, path: &Path) -> bool {
    let Ok(canonical) = tokio::fs::canonicalize(path).await else {
        return false;
    };
    canonical.starts_with(root)
        && tokio::fs::metadata(&canonical)
            .await
            .is_ok_and(|m| m.is_file())
}

/// Build the HTML page for the regular files among `entries`
pub fn render_html(entries: &[FileEntry]) -> String {
    let mut html = String::from(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Shared files</title>
    <style>
        body { font-family: -apple-system, "Segoe UI", Roboto, Arial, sans-serif; margin: 2em; }
        li { margin: 0.4em 0; }
        a { text-decoration: none; }
        a:hover { text-decoration: underline; }
    </style>
</head>
<body>
    <h1>Shared files</h1>
    <ul>
"#,
    );

    for entry in entries.iter().filter(|e| e.is_file) {
        html.push_str(&format!(
            "        <li><a href=\"{}\">{}</a></li>\n",
            escape_html(&urlencoding::encode(&entry.name)),
            escape_html(&entry.name)
        ));
    }

    html.push_str("    </ul>\n</body>\n</html>\n");
    html
}

/// Escape HTML-significant characters
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
