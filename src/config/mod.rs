//! Configuration handling for mpa
//!
//! Parses and validates `mpa.toml`. Every table has defaults, so an empty
//! file (or no file at all) yields the stock multi-page setup.

mod schema;

use std::fs;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FieldViolation, MpaError, Result, Violations};

pub use schema::*;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Page directory below `src/`; `pages` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_path: Option<String>,

    /// Prefix for every entry and chunk name, e.g. `m/`
    #[serde(default)]
    pub prefix_path: String,

    /// Descend into subdirectories of the pages directory
    #[serde(default = "default_true")]
    pub deep_page_entry: bool,

    #[serde(default)]
    pub split_chunks: SplitChunks,

    #[serde(default)]
    pub inject_check: InjectRule,

    /// Chunks injected into every page, in declaration order
    #[serde(default)]
    pub common_chunks: IndexMap<String, String>,

    /// Manual entry map; disables script discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<IndexMap<String, EntrySource>>,

    #[serde(default)]
    pub select_entry: SelectEntry,

    #[serde(default)]
    pub html: HtmlOverrides,

    #[serde(default)]
    pub px2rem: Px2RemConfig,

    #[serde(default = "default_template_extensions")]
    pub template_extensions: Vec<String>,

    #[serde(default = "default_script_extensions")]
    pub script_extensions: Vec<String>,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub dev: DevConfig,

    /// Root directory (computed from config file location)
    #[serde(skip)]
    pub root: PathBuf,
}

impl Config {
    /// Load configuration from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = absolute(path.as_ref())?;

        let content =
            fs::read_to_string(&path).map_err(|err| MpaError::filesystem(&path, err))?;

        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self::from_toml(&content, root)
    }

    /// Load the config file if it exists, otherwise fall back to defaults
    /// rooted at the file's directory
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = absolute(path.as_ref())?;
        if path.is_file() {
            return Self::load(&path);
        }

        info!("No config at {}, using defaults", path.display());
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self::default_config(root))
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str, root: impl Into<PathBuf>) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.root = root.into();
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config(root: impl Into<PathBuf>) -> Self {
        Self {
            pages_path: None,
            prefix_path: String::new(),
            deep_page_entry: true,
            split_chunks: SplitChunks::default(),
            inject_check: InjectRule::default(),
            common_chunks: IndexMap::new(),
            entry: None,
            select_entry: SelectEntry::default(),
            html: HtmlOverrides::default(),
            px2rem: Px2RemConfig::default(),
            template_extensions: default_template_extensions(),
            script_extensions: default_script_extensions(),
            runtime: RuntimeConfig::default(),
            output: OutputConfig::default(),
            dev: DevConfig::default(),
            root: root.into(),
        }
    }

    /// Validate the configuration, reporting every violated field at once
    pub fn validate(&self) -> Result<()> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(MpaError::Config(Violations(violations)))
        }
    }

    /// Collect field-level violations
    pub fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        if let Some(pages_path) = &self.pages_path {
            if Path::new(pages_path)
                .components()
                .any(|c| matches!(c, Component::ParentDir))
            {
                violations.push(FieldViolation::new(
                    "pages_path",
                    "must stay inside the src directory",
                ));
            }
        }

        if let Some(template) = &self.html.template {
            if template.is_empty() {
                violations.push(FieldViolation::new("html.template", "cannot be empty"));
            } else if !template.ends_with(".pug") {
                violations.push(FieldViolation::new("html.template", "must end with .pug"));
            }
        }

        for key in self.html.options.keys() {
            if RESERVED_HTML_KEYS.contains(&key.as_str()) {
                violations.push(FieldViolation::new(
                    format!("html.{}", key),
                    "is set per page and cannot be overridden",
                ));
            }
        }

        for (field, path) in [
            ("runtime.tools_entry", &self.runtime.tools_entry),
            ("runtime.polyfill", &self.runtime.polyfill),
        ] {
            if path.as_deref() == Some("") {
                violations.push(FieldViolation::new(field, "cannot be empty"));
            }
        }

        for (name, path) in &self.common_chunks {
            if name.is_empty() {
                violations.push(FieldViolation::new(
                    "common_chunks",
                    "chunk name cannot be empty",
                ));
            }
            if path.is_empty() {
                violations.push(FieldViolation::new(
                    format!("common_chunks.{}", name),
                    "path cannot be empty",
                ));
            }
        }

        if let Some(entry) = &self.entry {
            for (name, source) in entry {
                if name.is_empty() {
                    violations.push(FieldViolation::new("entry", "entry name cannot be empty"));
                }
                let paths = source.paths();
                if paths.is_empty() || paths.iter().any(|p| p.is_empty()) {
                    violations.push(FieldViolation::new(
                        format!("entry.{}", name),
                        "must list at least one non-empty module path",
                    ));
                }
            }
        }

        for (field, extensions) in [
            ("template_extensions", &self.template_extensions),
            ("script_extensions", &self.script_extensions),
        ] {
            if extensions.is_empty() {
                violations.push(FieldViolation::new(field, "must list at least one extension"));
            }
            for ext in extensions {
                if ext.is_empty() || ext.contains(['.', '/', '\\']) {
                    violations.push(FieldViolation::new(
                        field,
                        format!("'{}' must be a bare extension such as 'html'", ext),
                    ));
                }
            }
        }

        if self.px2rem.root_value <= 0.0 {
            violations.push(FieldViolation::new("px2rem.root_value", "must be positive"));
        }

        violations
    }

    /// Directory holding the page sources
    pub fn pages_dir(&self) -> PathBuf {
        let src = self.root.join("src");
        match &self.pages_path {
            Some(pages_path) if !pages_path.is_empty() => src.join(pages_path),
            _ => src.join("pages"),
        }
    }

    /// Get the absolute output directory path
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.output.dir)
    }

    /// Resolve a project-relative path
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    /// Apply the configured prefix to a chunk name
    pub fn prefixed(&self, name: &str) -> String {
        format!("{}{}", self.prefix_path, name)
    }

    /// Name of the tools chunk seeded into every page
    pub fn tools_chunk(&self) -> String {
        self.prefixed("tools")
    }

    /// Name of the vendors chunk produced by the built-in split group
    pub fn vendors_chunk(&self) -> String {
        self.prefixed("vendors")
    }

    /// Whether the built-in vendors chunk is injected into pages.
    /// A custom split table configures the bundler but names its own chunks.
    pub fn vendor_split_enabled(&self) -> bool {
        self.split_chunks == SplitChunks::Enabled(true)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("", "/project").unwrap();

        assert!(config.deep_page_entry);
        assert!(config.vendor_split_enabled());
        assert_eq!(config.inject_check, InjectRule::Exact);
        assert_eq!(config.tools_chunk(), "tools");
        assert_eq!(config.pages_dir(), PathBuf::from("/project/src/pages"));
        assert_eq!(config.px2rem.root_value, 16.0);
        assert!(!config.select_entry.is_enabled());
    }

    #[test]
    fn test_prefix_and_common_chunks_keep_order() {
        let config = Config::from_toml(
            r#"
            prefix_path = "m/"
            pages_path = "views"

            [common_chunks]
            "m/common/base" = "common/base.js"
            "m/common/extra" = "common/extra.js"
            "#,
            "/project",
        )
        .unwrap();

        assert_eq!(config.tools_chunk(), "m/tools");
        assert_eq!(config.vendors_chunk(), "m/vendors");
        assert_eq!(config.pages_dir(), PathBuf::from("/project/src/views"));
        let names: Vec<_> = config.common_chunks.keys().cloned().collect();
        assert_eq!(names, vec!["m/common/base", "m/common/extra"]);
    }

    #[test]
    fn test_split_chunks_table_disables_vendor_injection() {
        let config = Config::from_toml(
            r#"
            [split_chunks]
            chunks = "async"
            "#,
            "/project",
        )
        .unwrap();

        assert!(matches!(config.split_chunks, SplitChunks::Custom(_)));
        assert!(!config.vendor_split_enabled());
    }

    #[test]
    fn test_select_entry_variants() {
        let enabled = Config::from_toml("select_entry = true", "/p").unwrap();
        assert!(enabled.select_entry.is_enabled());
        assert!(enabled.select_entry.preset_pages().is_empty());

        let preset = Config::from_toml(
            r#"
            [select_entry]
            pages = ["index", "about"]
            page_size = 18
            "#,
            "/p",
        )
        .unwrap();
        assert!(preset.select_entry.is_enabled());
        assert_eq!(preset.select_entry.preset_pages(), ["index", "about"]);
    }

    #[test]
    fn test_manual_entry_accepts_string_or_list() {
        let config = Config::from_toml(
            r#"
            [entry]
            main = "src/main.js"
            admin = ["src/admin/boot.js", "src/admin/index.js"]
            "#,
            "/p",
        )
        .unwrap();

        let entry = config.entry.unwrap();
        assert_eq!(entry["main"].paths(), vec!["src/main.js"]);
        assert_eq!(entry["admin"].paths().len(), 2);
    }

    #[test]
    fn test_validation_reports_every_field() {
        let err = Config::from_toml(
            r#"
            pages_path = "../outside"
            template_extensions = []

            [html]
            template = "layout.html"

            [common_chunks]
            base = ""

            [px2rem]
            root_value = 0
            "#,
            "/p",
        )
        .unwrap_err();

        let MpaError::Config(Violations(violations)) = err else {
            panic!("expected config violations");
        };
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "pages_path",
                "html.template",
                "common_chunks.base",
                "template_extensions",
                "px2rem.root_value",
            ]
        );
    }

    #[test]
    fn test_html_table_cannot_override_page_fields() {
        let err = Config::from_toml(
            r#"
            [html]
            filename = "x.html"
            chunks = ["a"]
            favicon = "favicon.ico"
            "#,
            "/p",
        )
        .unwrap_err();

        let MpaError::Config(Violations(violations)) = err else {
            panic!("expected config violations");
        };
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["html.filename", "html.chunks"]);
    }

    #[test]
    fn test_runtime_defaults_to_bundled_modules() {
        let config = Config::from_toml("", "/p").unwrap();
        assert_eq!(config.runtime, RuntimeConfig::default());
        assert!(config.runtime.tools_entry.is_none());

        let err = Config::from_toml("[runtime]\npolyfill = \"\"", "/p").unwrap_err();
        assert!(err.to_string().contains("runtime.polyfill cannot be empty"));
    }

    #[test]
    fn test_wrong_type_is_a_parse_error() {
        let err = Config::from_toml("deep_page_entry = \"yes\"", "/p").unwrap_err();
        assert!(matches!(err, MpaError::Parse(_)));
    }

    #[test]
    fn test_inject_rule_names() {
        let config = Config::from_toml("inject_check = \"same-dir\"", "/p").unwrap();
        assert_eq!(config.inject_check, InjectRule::SameDir);
    }
}
