//! Final entry map assembly

use std::path::{Path, PathBuf};

use crate::discovery::EntryMap;

/// File name identifying the host framework's live-reload client
pub const DEV_CLIENT_MARKER: &str = "webpackHotDevClient.js";

/// Modules prepended to every entry, in load order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bootstrap {
    pub polyfill: Option<PathBuf>,
    pub dev_client: Option<PathBuf>,
}

impl Bootstrap {
    /// The dev client is only kept in development mode and only when the host's
    /// default entry actually is the live-reload client
    pub fn resolve(polyfill: Option<PathBuf>, host_entry: Option<&Path>, is_dev: bool) -> Self {
        let dev_client = host_entry
            .filter(|entry| is_dev && entry.to_string_lossy().contains(DEV_CLIENT_MARKER))
            .map(Path::to_path_buf);

        Self {
            polyfill,
            dev_client,
        }
    }

    pub fn modules(&self) -> impl Iterator<Item = &PathBuf> {
        self.polyfill.iter().chain(self.dev_client.iter())
    }
}

/// Merge infrastructure, common and page entries (later maps win on name
/// clashes) and prepend the bootstrap modules to every entry
pub fn assemble(
    scripts: EntryMap,
    infrastructure: EntryMap,
    common: EntryMap,
    bootstrap: &Bootstrap,
) -> EntryMap {
    let mut entries = infrastructure;
    entries.merge(common);
    entries.merge(scripts);

    entries.map_modules(|_, modules| bootstrap.modules().cloned().chain(modules).collect());

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn single(name: &str, path: &str) -> EntryMap {
        let mut map = EntryMap::new();
        map.insert(name, vec![PathBuf::from(path)]);
        map
    }

    #[test]
    fn test_bootstrap_precedes_every_entry() {
        let bootstrap = Bootstrap {
            polyfill: Some(PathBuf::from("/rt/polyfill.js")),
            dev_client: Some(PathBuf::from("/host/webpackHotDevClient.js")),
        };

        let entries = assemble(
            single("index", "/pages/index.jsx"),
            single("tools", "/rt/tools/index.js"),
            single("common/base", "/common/base.js"),
            &bootstrap,
        );

        assert_eq!(entries.names().collect::<Vec<_>>(), vec!["tools", "common/base", "index"]);
        for (_, modules) in entries.iter() {
            assert_eq!(modules[0], PathBuf::from("/rt/polyfill.js"));
            assert_eq!(modules[1], PathBuf::from("/host/webpackHotDevClient.js"));
            assert_eq!(modules.len(), 3);
        }
    }

    #[test]
    fn test_scripts_win_name_clashes() {
        let entries = assemble(
            single("tools", "/pages/tools.jsx"),
            single("tools", "/rt/tools/index.js"),
            EntryMap::new(),
            &Bootstrap::default(),
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries.get("tools"), Some(&[PathBuf::from("/pages/tools.jsx")][..]));
    }

    #[test]
    fn test_multi_module_entries_keep_their_order() {
        let mut scripts = EntryMap::new();
        scripts.insert("admin", vec![PathBuf::from("/a/boot.js"), PathBuf::from("/a/index.js")]);
        let bootstrap = Bootstrap::resolve(Some(PathBuf::from("/rt/polyfill.js")), None, true);

        let entries = assemble(scripts, EntryMap::new(), EntryMap::new(), &bootstrap);

        assert_eq!(
            entries.get("admin").unwrap(),
            &[
                PathBuf::from("/rt/polyfill.js"),
                PathBuf::from("/a/boot.js"),
                PathBuf::from("/a/index.js"),
            ][..]
        );
    }

    #[test]
    fn test_dev_client_needs_dev_mode_and_marker() {
        let client = Path::new("/node_modules/af-webpack/webpackHotDevClient.js");
        let other = Path::new("/node_modules/umi/client.js");

        assert!(Bootstrap::resolve(None, Some(client), true).dev_client.is_some());
        assert!(Bootstrap::resolve(None, Some(client), false).dev_client.is_none());
        assert!(Bootstrap::resolve(None, Some(other), true).dev_client.is_none());
        assert!(Bootstrap::resolve(None, None, true).dev_client.is_none());
    }
}
