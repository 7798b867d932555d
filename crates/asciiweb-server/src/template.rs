//! Page template
//!
//! The template is plain HTML with a single `{{ art }}` placeholder. It is
//! read from disk on every request so edits show up without a restart.

use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ART_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*art\s*\}\}").expect("Invalid placeholder regex"));

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Substitute escaped art into template source
pub fn fill(source: &str, art: &str) -> String {
    let escaped = escape_html(art);
    ART_PLACEHOLDER
        .replace_all(source, NoExpand(&escaped))
        .into_owned()
}

/// A template file on disk
#[derive(Debug, Clone)]
pub struct PageTemplate {
    path: PathBuf,
}

impl PageTemplate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the page around `art`
    pub async fn render(&self, art: &str) -> std::io::Result<String> {
        let source = tokio::fs::read_to_string(&self.path).await?;
        Ok(fill(&source, art))
    }
}
