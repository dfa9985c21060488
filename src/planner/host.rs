//! Settings handed to the host framework and bundler adapter
//!
//! Multi-page mode turns off the host's own HTML and route generation and
//! swaps in loaders for page templates. These used to be flipped through
//! process-wide environment flags; here they are plain fields of the plan.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::{Config, SplitChunks};
use crate::error::Result;

/// Modules that commonly hold third-party code shared by all pages
const VENDOR_TEST: &str = "(react|react-dom|core-js|regenerator-runtime)";

/// Aliases the host registers for its single-page runtime
const REMOVED_ALIASES: &[&str] = &[
    "react",
    "react-dom",
    "react-router",
    "react-router-dom",
    "react-router-config",
    "history",
];

const DEFAULT_BROWSERS: &[&str] = &[
    "last 2 versions",
    "Firefox ESR",
    "> 1%",
    "ie >= 9",
    "iOS >= 8",
    "Android >= 4",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostAdapter {
    /// Don't let the host generate its own HTML
    pub disable_default_html: bool,

    /// Don't install the host's route middleware
    pub disable_route_middleware: bool,

    /// Empty route table, so convention routing never scans the pages directory
    pub routes: Vec<String>,

    pub defaults: HostDefaults,

    pub remove_aliases: Vec<String>,

    pub loaders: Vec<LoaderRule>,

    /// Template files must not be inlined by the url loader
    pub url_loader_excludes: Vec<String>,

    /// Output path for images, svg and fonts when pages live under a prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_output_path: Option<String>,

    /// Stable chunk file names when hashing is off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_filename: Option<String>,
}

/// Host defaults applied underneath the user's own host config
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostDefaults {
    pub hash: bool,
    pub disable_css_modules: bool,
    pub tree_shaking: bool,
    pub browsers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoaderRule {
    pub name: String,
    pub test: String,
    pub loader: String,
    pub options: IndexMap<String, Value>,
}

impl LoaderRule {
    fn new(name: &str, test: &str, loader: &str, output_name: &str) -> Self {
        let mut options = IndexMap::new();
        options.insert("name".to_string(), Value::String(output_name.to_string()));
        Self {
            name: name.to_string(),
            test: test.to_string(),
            loader: loader.to_string(),
            options,
        }
    }
}

impl HostAdapter {
    pub fn from_config(config: &Config) -> Self {
        Self {
            disable_default_html: true,
            disable_route_middleware: true,
            routes: Vec::new(),
            defaults: HostDefaults {
                hash: config.output.hash,
                disable_css_modules: true,
                tree_shaking: true,
                browsers: DEFAULT_BROWSERS.iter().map(|b| b.to_string()).collect(),
            },
            remove_aliases: REMOVED_ALIASES.iter().map(|a| a.to_string()).collect(),
            loaders: vec![
                LoaderRule::new("html", r"\.html?$", "html-loader", "[name].[ext]"),
                LoaderRule::new("pug", r"\.pug?$", "pug-loader", "[name].html"),
            ],
            url_loader_excludes: vec![r"\.html?$".to_string(), r"\.pug?$".to_string()],
            asset_output_path: (!config.prefix_path.is_empty())
                .then(|| config.prefix_path.clone()),
            chunk_filename: (!config.output.hash).then(|| "[name].js".to_string()),
        }
    }
}

/// Split-chunks settings for the bundler, if splitting is on
pub fn split_chunks_plan(config: &Config) -> Result<Option<Value>> {
    let plan = match &config.split_chunks {
        SplitChunks::Enabled(false) => None,
        SplitChunks::Enabled(true) => Some(json!({
            "cacheGroups": {
                "vendors": {
                    "test": VENDOR_TEST,
                    "name": config.vendors_chunk(),
                    "chunks": "all",
                },
                "default": false,
            }
        })),
        SplitChunks::Custom(custom) => Some(serde_json::to_value(custom)?),
    };
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_adapter_disables_host_pages() {
        let config = Config::default_config("/p");
        let host = HostAdapter::from_config(&config);

        assert!(host.disable_default_html);
        assert!(host.disable_route_middleware);
        assert!(host.routes.is_empty());
        assert!(host.remove_aliases.contains(&"react-router-dom".to_string()));
        assert_eq!(host.asset_output_path, None);
        assert_eq!(host.chunk_filename, None);
    }

    #[test]
    fn test_prefix_and_unhashed_output() {
        let config = Config::from_toml(
            r#"
            prefix_path = "m/"

            [output]
            hash = false
            "#,
            "/p",
        )
        .unwrap();
        let host = HostAdapter::from_config(&config);

        assert_eq!(host.asset_output_path.as_deref(), Some("m/"));
        assert_eq!(host.chunk_filename.as_deref(), Some("[name].js"));
        assert!(!host.defaults.hash);
    }

    #[test]
    fn test_default_vendor_group_uses_prefix() {
        let config = Config::from_toml("prefix_path = \"m/\"", "/p").unwrap();
        let plan = split_chunks_plan(&config).unwrap().unwrap();

        assert_eq!(plan["cacheGroups"]["vendors"]["name"], "m/vendors");
        assert_eq!(plan["cacheGroups"]["default"], false);
    }

    #[test]
    fn test_custom_and_disabled_split() {
        let custom = Config::from_toml("[split_chunks]\nchunks = \"async\"", "/p").unwrap();
        assert_eq!(
            split_chunks_plan(&custom).unwrap().unwrap()["chunks"],
            "async"
        );

        let off = Config::from_toml("split_chunks = false", "/p").unwrap();
        assert_eq!(split_chunks_plan(&off).unwrap(), None);
    }

    #[test]
    fn test_custom_split_keeps_nested_groups() {
        let config = Config::from_toml(
            r#"
            [split_chunks]
            chunks = "all"
            minSize = 20000

            [split_chunks.cacheGroups.styles]
            test = "\\.css$"
            enforce = true
            "#,
            "/p",
        )
        .unwrap();

        let plan = split_chunks_plan(&config).unwrap().unwrap();
        assert_eq!(plan["minSize"], 20000);
        assert_eq!(plan["cacheGroups"]["styles"]["enforce"], true);
        assert_eq!(plan["cacheGroups"]["styles"]["test"], "\\.css$");
    }
}
