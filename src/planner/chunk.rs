//! Chunk injection: which bundles each generated page loads

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::config::{Config, InjectRule};
use crate::discovery::EntryMap;

/// Decides whether a script entry is injected into a template's page
pub trait InjectCheck: Send + Sync {
    fn matches(&self, template: &str, script: &str) -> bool;
}

impl<F> InjectCheck for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn matches(&self, template: &str, script: &str) -> bool {
        self(template, script)
    }
}

impl InjectCheck for InjectRule {
    fn matches(&self, template: &str, script: &str) -> bool {
        match self {
            InjectRule::Exact => template == script,
            InjectRule::SameDir => dir_of(template) == dir_of(script),
            InjectRule::Prefix => template.starts_with(script),
        }
    }
}

fn dir_of(name: &str) -> &str {
    name.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Ordered chunk names loaded by one page. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChunkList(Vec<String>);

impl ChunkList {
    /// A list seeded with the chunk that must load first
    pub fn seeded(first: impl Into<String>) -> Self {
        Self(vec![first.into()])
    }

    pub fn push(&mut self, chunk: impl Into<String>) {
        self.0.push(chunk.into());
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, chunk: &str) -> bool {
        self.0.iter().any(|c| c == chunk)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Chunks added to every page plus the per-script injection rule
#[derive(Clone)]
pub struct ChunkPolicy {
    /// Tools chunk, always first
    pub tools_chunk: String,

    /// Vendors chunk, present when the built-in vendor split is on
    pub vendor_chunk: Option<String>,

    /// Declared common chunks in declaration order
    pub common_chunks: Vec<String>,

    pub inject_check: Arc<dyn InjectCheck>,
}

impl ChunkPolicy {
    pub fn from_config(config: &Config, inject_check: Arc<dyn InjectCheck>) -> Self {
        Self {
            tools_chunk: config.tools_chunk(),
            vendor_chunk: config
                .vendor_split_enabled()
                .then(|| config.vendors_chunk()),
            common_chunks: config.common_chunks.keys().cloned().collect(),
            inject_check,
        }
    }
}

impl std::fmt::Debug for ChunkPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkPolicy")
            .field("tools_chunk", &self.tools_chunk)
            .field("vendor_chunk", &self.vendor_chunk)
            .field("common_chunks", &self.common_chunks)
            .finish_non_exhaustive()
    }
}

/// Build one chunk list per template, in template order.
///
/// Each list is the tools chunk, the vendors chunk when enabled, every common
/// chunk, then every script the inject check accepts, in script order.
pub fn associate(
    templates: &EntryMap,
    scripts: &EntryMap,
    policy: &ChunkPolicy,
) -> IndexMap<String, ChunkList> {
    templates
        .names()
        .map(|template| {
            let mut chunks = ChunkList::seeded(policy.tools_chunk.as_str());

            if let Some(vendor) = &policy.vendor_chunk {
                chunks.push(vendor.as_str());
            }

            for common in &policy.common_chunks {
                chunks.push(common.as_str());
            }

            let mut matched = 0;
            for script in scripts.names() {
                if policy.inject_check.matches(template, script) {
                    chunks.push(script);
                    matched += 1;
                }
            }

            if matched == 0 {
                debug!("No page script matched template '{}'", template);
            }

            (template.to_string(), chunks)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn entries(names: &[&str]) -> EntryMap {
        names
            .iter()
            .map(|name| (name.to_string(), vec![PathBuf::from(format!("/p/{}", name))]))
            .collect()
    }

    fn policy(vendor: bool, common: &[&str], check: Arc<dyn InjectCheck>) -> ChunkPolicy {
        ChunkPolicy {
            tools_chunk: "tools".to_string(),
            vendor_chunk: vendor.then(|| "vendors".to_string()),
            common_chunks: common.iter().map(|s| s.to_string()).collect(),
            inject_check: check,
        }
    }

    #[test]
    fn test_exact_match_injects_own_script() {
        let templates = entries(&["index", "about"]);
        let scripts = entries(&["about", "index"]);

        let pages = associate(&templates, &scripts, &policy(false, &[], Arc::new(InjectRule::Exact)));

        assert_eq!(pages.len(), 2);
        assert_eq!(pages["index"].as_slice(), ["tools", "index"]);
        assert_eq!(pages["about"].as_slice(), ["tools", "about"]);
    }

    #[test]
    fn test_vendor_and_common_chunks_precede_page_chunks() {
        let templates = entries(&["about"]);
        let scripts = entries(&["about"]);

        let pages = associate(
            &templates,
            &scripts,
            &policy(true, &["common/base", "common/extra"], Arc::new(InjectRule::Exact)),
        );

        assert_eq!(
            pages["about"].as_slice(),
            ["tools", "vendors", "common/base", "common/extra", "about"]
        );
    }

    #[test]
    fn test_template_without_script_keeps_infrastructure() {
        let templates = entries(&["static"]);
        let scripts = entries(&["index"]);

        let pages = associate(&templates, &scripts, &policy(true, &[], Arc::new(InjectRule::Exact)));

        assert_eq!(pages["static"].as_slice(), ["tools", "vendors"]);
    }

    #[test]
    fn test_every_template_gets_a_list_starting_with_tools() {
        let templates = entries(&["a", "b/c", "d"]);
        let scripts = entries(&["a", "b/x", "zzz"]);
        let always: Arc<dyn InjectCheck> = Arc::new(|_: &str, _: &str| true);

        let pages = associate(&templates, &scripts, &policy(false, &[], always));

        assert_eq!(pages.keys().collect::<Vec<_>>(), vec!["a", "b/c", "d"]);
        for chunks in pages.values() {
            assert_eq!(chunks.iter().next(), Some("tools"));
            assert_eq!(chunks.len(), 4);
        }
    }

    #[test]
    fn test_custom_closure_shares_one_script() {
        let templates = entries(&["shop/list", "shop/detail"]);
        let scripts = entries(&["shop/app", "home/app"]);
        let check: Arc<dyn InjectCheck> =
            Arc::new(|template: &str, script: &str| template.starts_with("shop/") && script == "shop/app");

        let pages = associate(&templates, &scripts, &policy(false, &[], check));

        assert_eq!(pages["shop/list"].as_slice(), ["tools", "shop/app"]);
        assert_eq!(pages["shop/detail"].as_slice(), ["tools", "shop/app"]);
    }

    #[test]
    fn test_builtin_rules() {
        assert!(InjectRule::Exact.matches("demo/demo", "demo/demo"));
        assert!(!InjectRule::Exact.matches("demo/demo", "demo/other"));

        assert!(InjectRule::SameDir.matches("demo/a", "demo/b"));
        assert!(InjectRule::SameDir.matches("index", "about"));
        assert!(!InjectRule::SameDir.matches("demo/a", "other/a"));

        assert!(InjectRule::Prefix.matches("demo/detail", "demo/"));
        assert!(!InjectRule::Prefix.matches("demo", "demo/detail"));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let templates = entries(&["tools"]);
        let scripts = entries(&["tools"]);

        let pages = associate(&templates, &scripts, &policy(false, &[], Arc::new(InjectRule::Exact)));

        assert_eq!(pages["tools"].as_slice(), ["tools", "tools"]);
    }
}
