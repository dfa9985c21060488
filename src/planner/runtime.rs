//! Runtime modules shipped with mpa
//!
//! The tools bundle and the polyfill are embedded in the binary and written
//! next to the build plan, so a default plan never points at files the
//! project doesn't have.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MpaError, Result};

/// Directory below the output directory receiving the bundled modules
pub const RUNTIME_DIR: &str = "runtime";

/// A module embedded in the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeAsset {
    /// Path relative to the runtime directory
    pub path: &'static str,
    pub contents: &'static str,
}

/// Entry module of the tools bundle
pub const TOOLS_ENTRY: &str = "tools/index.js";

pub const POLYFILL: &str = "polyfill.js";

/// Tools bundle: debug console toggle and the visitor id cookie
pub const TOOLS: &[RuntimeAsset] = &[
    RuntimeAsset {
        path: TOOLS_ENTRY,
        contents: include_str!("../../assets/runtime/tools/index.js"),
    },
    RuntimeAsset {
        path: "tools/debug.js",
        contents: include_str!("../../assets/runtime/tools/debug.js"),
    },
    RuntimeAsset {
        path: "tools/uuid.js",
        contents: include_str!("../../assets/runtime/tools/uuid.js"),
    },
];

pub const POLYFILLS: &[RuntimeAsset] = &[RuntimeAsset {
    path: POLYFILL,
    contents: include_str!("../../assets/runtime/polyfill.js"),
}];

/// Runtime directory for a given output directory
pub fn runtime_dir(outdir: &Path) -> PathBuf {
    outdir.join(RUNTIME_DIR)
}

/// Write the assets below `outdir/runtime`, returning the written paths
pub fn install(assets: &[RuntimeAsset], outdir: &Path) -> Result<Vec<PathBuf>> {
    let dir = runtime_dir(outdir);
    let mut written = Vec::with_capacity(assets.len());

    for asset in assets {
        let path = dir.join(asset.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| MpaError::filesystem(parent, err))?;
        }
        fs::write(&path, asset.contents).map_err(|err| MpaError::filesystem(&path, err))?;
        written.push(path);
    }

    Ok(written)
}

/// Fail when a configured runtime module is missing
pub fn require_file(path: PathBuf) -> Result<PathBuf> {
    match fs::metadata(&path) {
        Ok(meta) if meta.is_file() => Ok(path),
        Ok(_) => {
            let err = std::io::Error::new(std::io::ErrorKind::Other, "not a file");
            Err(MpaError::filesystem(&path, err))
        }
        Err(err) => Err(MpaError::filesystem(&path, err)),
    }
}
