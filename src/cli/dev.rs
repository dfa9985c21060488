//! Development command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::{info, warn};

use crate::config::Config;
use crate::planner::{PlanOptions, Planner};
use crate::select::selector_for;
use crate::utils::display_path;

use super::build::print_summary;

/// Plan a development build with the page listing
#[derive(Args, Debug)]
pub struct DevCommand {
    /// Port the dev server runs on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Build only these pages (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub pages: Vec<String>,

    /// Build only pages whose name contains this text
    #[arg(long)]
    pub filter: Option<String>,

    /// Output directory for the build plan
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// Don't prepend the polyfill to entries
    #[arg(long, env = "MPA_NO_POLYFILL")]
    pub no_polyfill: bool,

    /// First module of the host framework's default entry
    #[arg(long)]
    pub host_entry: Option<PathBuf>,
}

impl DevCommand {
    pub async fn execute(&self, config_path: &str) -> Result<()> {
        info!("Loading configuration from {}", config_path);
        let config = Config::load_or_default(config_path)?;

        if !config.select_entry.is_enabled() && (!self.pages.is_empty() || self.filter.is_some()) {
            warn!("select_entry is off in the config, --pages and --filter are ignored");
        }

        let selector = selector_for(&self.pages, self.filter.as_deref(), &config);
        let port = self.port.unwrap_or(config.dev.port);

        let planner = Planner::new(config, self.into())?;
        let plan = planner.plan(selector.as_ref()).await?;

        plan.write()
            .with_context(|| {
                format!("Failed to write build plan to {}", plan.outdir.display())
            })?;

        eprintln!(
            "\n{} Planned {} page(s) for development\n",
            "✓".green().bold(),
            plan.pages.len()
        );

        print_summary(&plan, &planner.config().root);

        if let Some(listing) = &plan.listing {
            eprintln!(
                "\n  {} Page list at {}",
                "•".dimmed(),
                format!("http://localhost:{}/{}", port, listing.filename)
                    .cyan()
                    .underline()
            );
        }

        eprintln!(
            "  {} Plan written to {}\n",
            "•".dimmed(),
            display_path(&planner.config().root, &plan.outdir).cyan()
        );

        Ok(())
    }
}

impl From<&DevCommand> for PlanOptions {
    fn from(cmd: &DevCommand) -> Self {
        Self {
            dev: true,
            polyfill: !cmd.no_polyfill,
            host_entry: cmd.host_entry.clone(),
            port: cmd.port,
            outdir: cmd.outdir.clone(),
        }
    }
}
