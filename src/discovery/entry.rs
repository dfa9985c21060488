//! Entry maps and extension-based entry extraction

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;

static TEMPLATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(html|pug)$").unwrap());

static SCRIPT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(jsx|tsx)$").unwrap());

/// Ordered mapping from entry name to the modules that make up the entry.
///
/// Order is insertion order; replacing an existing name keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EntryMap(IndexMap<String, Vec<PathBuf>>);

impl EntryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the modules it replaced
    pub fn insert(&mut self, name: impl Into<String>, modules: Vec<PathBuf>) -> Option<Vec<PathBuf>> {
        self.0.insert(name.into(), modules)
    }

    pub fn get(&self, name: &str) -> Option<&[PathBuf]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Entry names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.0.iter().map(|(name, modules)| (name.as_str(), modules.as_slice()))
    }

    /// Keep only the entries whose name satisfies `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|name, _| keep(name));
    }

    /// Overlay `other` onto this map; names already present keep their
    /// position but take the new modules
    pub fn merge(&mut self, other: EntryMap) {
        for (name, modules) in other.0 {
            self.0.insert(name, modules);
        }
    }

    /// Rewrite every entry's module list in place
    pub fn map_modules(&mut self, mut f: impl FnMut(&str, Vec<PathBuf>) -> Vec<PathBuf>) {
        for (name, modules) in self.0.iter_mut() {
            let original = std::mem::take(modules);
            *modules = f(name, original);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<PathBuf>)> for EntryMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<PathBuf>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Suffix rule selecting one kind of page file
#[derive(Debug, Clone)]
pub struct ExtensionPattern {
    regex: Regex,
}

impl ExtensionPattern {
    /// Build a pattern matching any of the given bare extensions
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = extensions
            .iter()
            .map(|ext| regex::escape(ext.as_ref()))
            .collect();
        let regex = Regex::new(&format!(r"\.({})$", alternatives.join("|")))?;
        Ok(Self { regex })
    }

    /// `.html` and `.pug` templates
    pub fn templates() -> Self {
        Self {
            regex: TEMPLATE_PATTERN.clone(),
        }
    }

    /// `.jsx` and `.tsx` page scripts
    pub fn scripts() -> Self {
        Self {
            regex: SCRIPT_PATTERN.clone(),
        }
    }

    /// Strip the matched extension, or `None` when the path doesn't match
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        self.regex.find(path).map(|m| &path[..m.start()])
    }
}

/// Turn matching files into entries named `prefix + path without extension`.
///
/// Later files win when two paths normalize to the same name.
pub fn extract_entries(
    base: &Path,
    files: &[String],
    pattern: &ExtensionPattern,
    prefix: &str,
) -> EntryMap {
    files
        .iter()
        .filter(|file| !base_name(file).starts_with('.'))
        .filter_map(|file| pattern.strip(file).map(|stem| (file, stem)))
        .fold(EntryMap::new(), |mut memo, (file, stem)| {
            let name = format!("{}{}", prefix, stem);
            if let Some(replaced) = memo.insert(name.clone(), vec![base.join(file)]) {
                debug!(
                    "Entry '{}' overwritten: {} replaced by {}",
                    name,
                    replaced
                        .first()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                    file
                );
            }
            memo
        })
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn files(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_scripts_and_templates() {
        let all = files(&["demo/demo.jsx", "demo/demo.pug", "index.jsx", "index.html", "readme.md"]);
        let base = Path::new("/app/src/pages");

        let scripts = extract_entries(base, &all, &ExtensionPattern::scripts(), "");
        let templates = extract_entries(base, &all, &ExtensionPattern::templates(), "");

        assert_eq!(scripts.names().collect::<Vec<_>>(), vec!["demo/demo", "index"]);
        assert_eq!(templates.names().collect::<Vec<_>>(), vec!["demo/demo", "index"]);
        assert_eq!(
            scripts.get("demo/demo"),
            Some(&[PathBuf::from("/app/src/pages/demo/demo.jsx")][..])
        );
    }

    #[test]
    fn test_prefix_is_prepended() {
        let all = files(&["demo/demo.jsx"]);
        let entries = extract_entries(Path::new("/p"), &all, &ExtensionPattern::scripts(), "m/");

        assert_eq!(entries.names().collect::<Vec<_>>(), vec!["m/demo/demo"]);
    }

    #[test]
    fn test_keys_are_exactly_the_matching_files() {
        let all = files(&[
            "a.jsx",
            "b.tsx",
            "c.js",
            "d.jsx.bak",
            "nested/.e.jsx",
            "nested/f.jsx",
            "g.JSX",
        ]);
        let entries = extract_entries(Path::new("/p"), &all, &ExtensionPattern::scripts(), "x-");

        assert_eq!(
            entries.names().collect::<Vec<_>>(),
            vec!["x-a", "x-b", "x-nested/f"]
        );
    }

    #[test]
    fn test_collision_last_write_wins() {
        let all = files(&["page.jsx", "page.tsx"]);
        let entries = extract_entries(Path::new("/p"), &all, &ExtensionPattern::scripts(), "");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries.get("page"), Some(&[PathBuf::from("/p/page.tsx")][..]));
    }

    #[test]
    fn test_custom_extensions() {
        let pattern = ExtensionPattern::new(&["vue", "svelte"]).unwrap();
        assert_eq!(pattern.strip("home/index.vue"), Some("home/index"));
        assert_eq!(pattern.strip("app.svelte"), Some("app"));
        assert_eq!(pattern.strip("app.vue.js"), None);
    }

    #[test]
    fn test_merge_keeps_first_position() {
        let mut map: EntryMap = vec![
            ("tools".to_string(), vec![PathBuf::from("/tools.js")]),
            ("index".to_string(), vec![PathBuf::from("/old.js")]),
        ]
        .into_iter()
        .collect();

        let mut overlay = EntryMap::new();
        overlay.insert("about", vec![PathBuf::from("/about.jsx")]);
        overlay.insert("index", vec![PathBuf::from("/index.jsx")]);
        map.merge(overlay);

        assert_eq!(map.names().collect::<Vec<_>>(), vec!["tools", "index", "about"]);
        assert_eq!(map.get("index"), Some(&[PathBuf::from("/index.jsx")][..]));
    }
}
