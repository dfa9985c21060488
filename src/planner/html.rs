//! Generated HTML page descriptors

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::config::{HtmlOverrides, MinifyOptions};
use crate::discovery::EntryMap;

use super::ChunkList;

/// Listing page file name when no `index` page exists
pub const LISTING_FILENAME: &str = "index.html";

/// Listing page file name when an `index` page takes `index.html`
pub const FALLBACK_LISTING_FILENAME: &str = "__index.html";

/// One generated HTML document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HtmlPage {
    /// Template entry name
    pub name: String,

    /// Output file, `<name>.html`
    pub filename: String,

    pub template: PathBuf,

    /// Chunks linked as script tags, in this order
    pub chunks: ChunkList,

    pub chunks_sort_mode: String,

    pub minify: MinifyOptions,

    /// Passthrough options from the `html` table
    #[serde(flatten)]
    pub options: IndexMap<String, Value>,
}

impl HtmlPage {
    pub fn new(
        name: &str,
        template: PathBuf,
        chunks: ChunkList,
        overrides: &HtmlOverrides,
        root: &Path,
    ) -> Self {
        let template = overrides
            .template
            .as_deref()
            .map(|t| root.join(t))
            .unwrap_or(template);

        Self {
            name: name.to_string(),
            filename: format!("{}.html", name),
            template,
            chunks,
            chunks_sort_mode: "manual".to_string(),
            minify: overrides.minify.clone().unwrap_or_default(),
            options: overrides.options.clone(),
        }
    }
}

/// Development-only page linking to every generated page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingPage {
    pub filename: String,
    pub entries: Vec<String>,
    pub inject: bool,
}

impl ListingPage {
    /// Listing for the given templates; it moves aside when an `index` page exists
    pub fn for_templates(templates: &EntryMap) -> Self {
        let filename = if templates.contains("index") {
            FALLBACK_LISTING_FILENAME
        } else {
            LISTING_FILENAME
        };

        Self {
            filename: filename.to_string(),
            entries: templates.names().map(str::to_string).collect(),
            inject: false,
        }
    }

    /// Whether the listing had to move aside for a real index page
    pub fn is_fallback(&self) -> bool {
        self.filename == FALLBACK_LISTING_FILENAME
    }

    /// Render the listing as a standalone HTML document
    pub fn render(&self) -> String {
        let mut items = String::new();
        for entry in &self.entries {
            let entry = escape_html(entry);
            items.push_str(&format!(
                "      <li><a href=\"/{}.html\">{}</a></li>\n",
                entry, entry
            ));
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Pages</title>
  </head>
  <body>
    <h1>Pages ({})</h1>
    <ul>
{}    </ul>
  </body>
</html>
"#,
            self.entries.len(),
            items
        )
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
