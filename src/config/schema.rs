//! Configuration schema definitions

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Vendor chunk splitting: `true` for the built-in vendors group, a table for
/// a custom split-chunks configuration handed to the bundler as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SplitChunks {
    Enabled(bool),
    Custom(IndexMap<String, Value>),
}

impl Default for SplitChunks {
    fn default() -> Self {
        SplitChunks::Enabled(true)
    }
}

/// Page selection in development mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectEntry {
    Enabled(bool),
    Options(SelectOptions),
}

impl Default for SelectEntry {
    fn default() -> Self {
        SelectEntry::Enabled(false)
    }
}

impl SelectEntry {
    pub fn is_enabled(&self) -> bool {
        match self {
            SelectEntry::Enabled(enabled) => *enabled,
            SelectEntry::Options(_) => true,
        }
    }

    /// Pages preselected in the config file, if any
    pub fn preset_pages(&self) -> &[String] {
        match self {
            SelectEntry::Options(options) => &options.pages,
            SelectEntry::Enabled(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOptions {
    /// Fixed page selection used when no selector is supplied
    #[serde(default)]
    pub pages: Vec<String>,

    /// Prompt settings forwarded to an interactive selector
    #[serde(flatten)]
    pub prompt: IndexMap<String, Value>,
}

/// Rule deciding whether a script chunk is injected into a template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InjectRule {
    /// Script and template names are identical
    #[default]
    Exact,
    /// Script and template live in the same directory
    SameDir,
    /// Template name starts with the script name
    Prefix,
}

/// A manual entry: a single module or an ordered list of modules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntrySource {
    One(String),
    Many(Vec<String>),
}

impl EntrySource {
    pub fn paths(&self) -> Vec<&str> {
        match self {
            EntrySource::One(path) => vec![path.as_str()],
            EntrySource::Many(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

/// Page descriptor fields the planner sets itself; the `html` table may not
/// carry them
pub const RESERVED_HTML_KEYS: &[&str] =
    &["name", "filename", "chunks", "chunks_sort_mode", "inject"];

/// Overrides merged onto every generated HTML page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HtmlOverrides {
    /// Template used for every page instead of the discovered one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify: Option<MinifyOptions>,

    /// Remaining HTML plugin options, passed through untouched
    #[serde(flatten)]
    pub options: IndexMap<String, Value>,
}

/// HTML minification flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinifyOptions {
    #[serde(default = "default_true")]
    pub remove_comments: bool,

    #[serde(default)]
    pub collapse_whitespace: bool,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            remove_comments: true,
            collapse_whitespace: false,
        }
    }
}

/// px to rem conversion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Px2RemConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_root_value")]
    pub root_value: f64,
}

impl Default for Px2RemConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root_value: default_root_value(),
        }
    }
}

fn default_root_value() -> f64 {
    16.0
}

/// Infrastructure modules injected into the build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Tools bundle (debug console toggle, visitor id) loaded first on every
    /// page; the bundled one when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_entry: Option<String>,

    /// Polyfill prepended to every entry; the bundled one when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyfill: Option<String>,

    /// First module of the host framework's default entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_entry: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the build plan
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Hash bundle file names
    #[serde(default = "default_true")]
    pub hash: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            hash: true,
        }
    }
}

fn default_output_dir() -> String {
    "dist".to_string()
}

/// Development settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevConfig {
    /// Port the dev server listens on, used in the page listing notice
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    8000
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_template_extensions() -> Vec<String> {
    vec!["html".to_string(), "pug".to_string()]
}

pub(crate) fn default_script_extensions() -> Vec<String> {
    vec!["jsx".to_string(), "tsx".to_string()]
}
