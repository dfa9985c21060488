//! Multi-page build planning
//!
//! Turns the discovered pages into everything a bundler adapter needs: the
//! entry map, one HTML descriptor per template with its chunk list, the
//! development page listing, and the host framework settings.

mod assemble;
mod chunk;
mod host;
mod html;
mod runtime;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{Config, Px2RemConfig};
use crate::discovery::{extract_entries, walk_pages, EntryMap, ExtensionPattern};
use crate::error::{MpaError, Result};
use crate::select::EntrySelector;

pub use assemble::{assemble, Bootstrap, DEV_CLIENT_MARKER};
pub use chunk::{associate, ChunkList, ChunkPolicy, InjectCheck};
pub use host::{split_chunks_plan, HostAdapter, HostDefaults, LoaderRule};
pub use html::{HtmlPage, ListingPage, FALLBACK_LISTING_FILENAME, LISTING_FILENAME};
pub use runtime::{RuntimeAsset, RUNTIME_DIR};

/// File name of the written build plan
pub const MANIFEST_FILENAME: &str = "mpa-manifest.json";

/// Per-invocation planning options
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Development mode: page listing, selection and the live-reload client
    pub dev: bool,

    /// Prepend the polyfill to every entry
    pub polyfill: bool,

    /// First module of the host's default entry, overriding `runtime.host_entry`
    pub host_entry: Option<PathBuf>,

    /// Dev server port shown in notices, overriding `dev.port`
    pub port: Option<u16>,

    /// Output directory, overriding `output.dir`
    pub outdir: Option<PathBuf>,
}

/// Entries found in the pages directory
#[derive(Debug, Clone)]
pub struct Discovery {
    pub pages_dir: PathBuf,

    /// Template entries (`.html`, `.pug` by default)
    pub templates: EntryMap,

    /// Page script entries, or the manual `entry` table when configured
    pub scripts: EntryMap,
}

/// Build mode recorded in the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

/// Everything the bundler adapter consumes
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    pub mode: Mode,

    pub pages_dir: PathBuf,

    /// Directory receiving the plan and the bundled runtime modules
    pub outdir: PathBuf,

    /// Final entry map, bootstrap modules included
    pub entry: EntryMap,

    /// One descriptor per template, in template order
    pub pages: Vec<HtmlPage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<ListingPage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_chunks: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub px2rem: Option<Px2RemConfig>,

    pub host: HostAdapter,

    /// Bundled runtime modules the entry map refers to
    #[serde(skip)]
    pub runtime: Vec<RuntimeAsset>,
}

impl BuildPlan {
    /// Look up a page descriptor by template name
    pub fn page(&self, name: &str) -> Option<&HtmlPage> {
        self.pages.iter().find(|page| page.name == name)
    }

    /// Write the plan, the rendered listing page and the bundled runtime
    /// modules into the output directory
    pub fn write(&self) -> Result<Vec<PathBuf>> {
        let dir = self.outdir.as_path();
        fs::create_dir_all(dir).map_err(|err| MpaError::filesystem(dir, err))?;

        let mut written = Vec::new();

        let manifest_path = dir.join(MANIFEST_FILENAME);
        let manifest = serde_json::to_string_pretty(self)?;
        fs::write(&manifest_path, manifest)
            .map_err(|err| MpaError::filesystem(&manifest_path, err))?;
        written.push(manifest_path);

        if let Some(listing) = &self.listing {
            let listing_path = dir.join(&listing.filename);
            fs::write(&listing_path, listing.render())
                .map_err(|err| MpaError::filesystem(&listing_path, err))?;
            written.push(listing_path);
        }

        written.extend(runtime::install(&self.runtime, dir)?);

        Ok(written)
    }
}

/// The multi-page planner
pub struct Planner {
    /// Project configuration
    config: Arc<Config>,

    /// Planning options
    options: PlanOptions,

    /// Rule injecting scripts into templates
    inject_check: Arc<dyn InjectCheck>,

    template_pattern: ExtensionPattern,

    script_pattern: ExtensionPattern,
}

impl Planner {
    /// Create a new planner instance
    pub fn new(config: Config, options: PlanOptions) -> Result<Self> {
        let template_pattern = ExtensionPattern::new(&config.template_extensions)?;
        let script_pattern = ExtensionPattern::new(&config.script_extensions)?;
        let inject_check: Arc<dyn InjectCheck> = Arc::new(config.inject_check);

        Ok(Self {
            config: Arc::new(config),
            options,
            inject_check,
            template_pattern,
            script_pattern,
        })
    }

    /// Replace the configured inject rule with a custom check
    pub fn with_inject_check(mut self, check: impl InjectCheck + 'static) -> Self {
        self.inject_check = Arc::new(check);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Absolute output directory for this run
    pub fn outdir(&self) -> PathBuf {
        match &self.options.outdir {
            Some(dir) => self.config.root.join(dir),
            None => self.config.output_dir(),
        }
    }

    /// Walk the pages directory and extract template and script entries
    pub fn discover(&self) -> Result<Discovery> {
        let pages_dir = self.config.pages_dir();
        let prefix = self.config.prefix_path.as_str();

        info!("Discovering pages in {}", pages_dir.display());
        let files = walk_pages(&pages_dir, self.config.deep_page_entry)?;

        let templates = extract_entries(&pages_dir, &files, &self.template_pattern, prefix);

        let scripts: EntryMap = match &self.config.entry {
            Some(manual) => {
                info!("Using the configured entry table, script discovery skipped");
                manual
                    .iter()
                    .map(|(name, source)| {
                        let modules: Vec<PathBuf> = source
                            .paths()
                            .into_iter()
                            .map(|path| self.config.resolve(path))
                            .collect();
                        (name.clone(), modules)
                    })
                    .collect()
            }
            None => extract_entries(&pages_dir, &files, &self.script_pattern, prefix),
        };

        debug!(
            "Discovered {} template(s) and {} script entry(ies)",
            templates.len(),
            scripts.len()
        );

        Ok(Discovery {
            pages_dir,
            templates,
            scripts,
        })
    }

    /// Produce the full build plan
    pub async fn plan(&self, selector: &dyn EntrySelector) -> Result<BuildPlan> {
        let start = Instant::now();

        // 1. Discover templates and scripts
        let mut discovery = self.discover()?;

        // 2. Narrow down to the selected pages
        if self.options.dev
            && self.config.select_entry.is_enabled()
            && discovery.templates.len() > 1
        {
            self.apply_selection(&mut discovery, selector).await?;
        }

        let Discovery {
            pages_dir,
            templates,
            scripts,
        } = discovery;

        // 3. Match scripts to templates
        let policy = ChunkPolicy::from_config(&self.config, self.inject_check.clone());
        let chunk_lists = associate(&templates, &scripts, &policy);

        // 4. Assemble the final entry map
        let mut runtime = Vec::new();
        let infrastructure = self.infrastructure_entries(&mut runtime)?;
        let bootstrap = self.bootstrap(&mut runtime)?;
        let entry = assemble(
            scripts,
            infrastructure,
            self.common_entries(),
            &bootstrap,
        );

        // 5. Describe the generated pages
        let pages: Vec<HtmlPage> = chunk_lists
            .into_iter()
            .filter_map(|(name, chunks)| {
                let template = templates.get(&name)?.first()?.clone();
                Some(HtmlPage::new(
                    &name,
                    template,
                    chunks,
                    &self.config.html,
                    &self.config.root,
                ))
            })
            .collect();

        let listing = self.options.dev.then(|| self.listing(&templates));

        debug!("Planned {} page(s) in {:?}", pages.len(), start.elapsed());

        Ok(BuildPlan {
            mode: if self.options.dev {
                Mode::Development
            } else {
                Mode::Production
            },
            pages_dir,
            outdir: self.outdir(),
            entry,
            pages,
            listing,
            split_chunks: split_chunks_plan(&self.config)?,
            px2rem: self
                .config
                .px2rem
                .enabled
                .then(|| self.config.px2rem.clone()),
            host: HostAdapter::from_config(&self.config),
            runtime,
        })
    }

    async fn apply_selection(
        &self,
        discovery: &mut Discovery,
        selector: &dyn EntrySelector,
    ) -> Result<()> {
        let candidates: Vec<String> = discovery.templates.names().map(str::to_string).collect();

        debug!("Selecting pages with the {} selector", selector.name());
        let selected = selector.select(&candidates).await?;
        if selected.is_empty() {
            return Err(MpaError::EmptySelection);
        }

        info!("Building {} of {} page(s)", selected.len(), candidates.len());
        let keep = |name: &str| selected.iter().any(|s| s == name);
        discovery.scripts.retain(keep);
        discovery.templates.retain(keep);

        Ok(())
    }

    fn infrastructure_entries(&self, assets: &mut Vec<RuntimeAsset>) -> Result<EntryMap> {
        let tools = self.runtime_module(
            self.config.runtime.tools_entry.as_deref(),
            runtime::TOOLS,
            assets,
        )?;

        let mut entries = EntryMap::new();
        entries.insert(self.config.tools_chunk(), vec![tools]);
        Ok(entries)
    }

    /// A configured runtime module must exist; otherwise the bundled copy
    /// below the output directory is used and queued for writing
    fn runtime_module(
        &self,
        configured: Option<&str>,
        bundled: &[RuntimeAsset],
        assets: &mut Vec<RuntimeAsset>,
    ) -> Result<PathBuf> {
        if let Some(path) = configured {
            return runtime::require_file(self.config.resolve(path));
        }

        assets.extend_from_slice(bundled);
        Ok(runtime::runtime_dir(&self.outdir()).join(bundled[0].path))
    }

    fn common_entries(&self) -> EntryMap {
        self.config
            .common_chunks
            .iter()
            .map(|(name, path)| (name.clone(), vec![self.config.resolve(path)]))
            .collect()
    }

    fn bootstrap(&self, assets: &mut Vec<RuntimeAsset>) -> Result<Bootstrap> {
        let polyfill = if self.options.polyfill {
            Some(self.runtime_module(
                self.config.runtime.polyfill.as_deref(),
                runtime::POLYFILLS,
                assets,
            )?)
        } else {
            None
        };

        let host_entry = self
            .options
            .host_entry
            .clone()
            .or_else(|| self.config.runtime.host_entry.as_deref().map(PathBuf::from));

        Ok(Bootstrap::resolve(
            polyfill,
            host_entry.as_deref(),
            self.options.dev,
        ))
    }

    fn listing(&self, templates: &EntryMap) -> ListingPage {
        let listing = ListingPage::for_templates(templates);
        if listing.is_fallback() {
            let port = self.options.port.unwrap_or(self.config.dev.port);
            warn!(
                "Since we already have index.html, checkout http://localhost:{}/{} for entry list.",
                port, listing.filename
            );
        }
        listing
    }
}
