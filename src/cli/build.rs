//! Build command implementation

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::info;

use crate::config::Config;
use crate::planner::{BuildPlan, PlanOptions, Planner};
use crate::select::AllPages;
use crate::utils::{display_path, format_duration};

/// Plan a production build
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Output directory for the build plan
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// Don't prepend the polyfill to entries
    #[arg(long, env = "MPA_NO_POLYFILL")]
    pub no_polyfill: bool,

    /// First module of the host framework's default entry
    #[arg(long)]
    pub host_entry: Option<PathBuf>,

    /// Print the plan as JSON instead of writing it
    #[arg(long)]
    pub stdout: bool,
}

impl BuildCommand {
    pub async fn execute(&self, config_path: &str) -> Result<()> {
        let start = Instant::now();

        info!("Loading configuration from {}", config_path);
        let config = Config::load_or_default(config_path)?;

        eprintln!("{} Planning pages...", "→".blue());

        let planner = Planner::new(config, self.into())?;
        let plan = planner.plan(&AllPages).await?;

        if self.stdout {
            println!("{}", serde_json::to_string_pretty(&plan)?);
            return Ok(());
        }

        let written = plan
            .write()
            .with_context(|| {
                format!("Failed to write build plan to {}", plan.outdir.display())
            })?;

        eprintln!(
            "\n{} Planned {} page(s) and {} entry(ies) in {}\n",
            "✓".green().bold(),
            plan.pages.len(),
            plan.entry.len(),
            format_duration(start.elapsed())
        );

        print_summary(&plan, &planner.config().root);

        for path in written {
            eprintln!(
                "  {} wrote {}",
                "•".dimmed(),
                display_path(&planner.config().root, &path).cyan()
            );
        }

        eprintln!();

        Ok(())
    }
}

/// Print each page with the chunks it loads
pub(crate) fn print_summary(plan: &BuildPlan, root: &std::path::Path) {
    for page in &plan.pages {
        eprintln!(
            "  {} {} {} {}",
            "•".dimmed(),
            page.filename.cyan(),
            format!("[{}]", page.chunks.as_slice().join(", ")).dimmed(),
            display_path(root, &page.template).dimmed()
        );
    }
}

impl From<&BuildCommand> for PlanOptions {
    fn from(cmd: &BuildCommand) -> Self {
        Self {
            dev: false,
            polyfill: !cmd.no_polyfill,
            host_entry: cmd.host_entry.clone(),
            port: None,
            outdir: cmd.outdir.clone(),
        }
    }
}
