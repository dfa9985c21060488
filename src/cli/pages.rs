//! Pages command implementation

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::planner::{PlanOptions, Planner};
use crate::select::AllPages;

use super::build::print_summary;

/// List discovered pages and the chunks each one loads
#[derive(Args, Debug)]
pub struct PagesCommand {
    /// Show the development view, including the page listing
    #[arg(long)]
    pub dev: bool,

    /// Print the discovered pages as JSON
    #[arg(long)]
    pub json: bool,

    /// Port the dev server runs on, used in the listing notice
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,
}

impl PagesCommand {
    pub async fn execute(&self, config_path: &str) -> Result<()> {
        let config = Config::load_or_default(config_path)?;
        let options = PlanOptions {
            dev: self.dev,
            polyfill: true,
            port: self.port,
            ..Default::default()
        };

        let planner = Planner::new(config, options)?;
        let plan = planner.plan(&AllPages).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&plan.pages)?);
            return Ok(());
        }

        eprintln!(
            "{} {} page(s) in {}\n",
            "→".blue(),
            plan.pages.len(),
            plan.pages_dir.display().to_string().cyan()
        );

        print_summary(&plan, &planner.config().root);

        let orphans: Vec<&str> = plan
            .entry
            .names()
            .filter(|name| !plan.pages.iter().any(|page| page.chunks.contains(name)))
            .collect();
        if !orphans.is_empty() {
            eprintln!(
                "\n  {} entries not loaded by any page: {}",
                "!".yellow(),
                orphans.join(", ")
            );
        }

        if let Some(listing) = &plan.listing {
            let port = self.port.unwrap_or(planner.config().dev.port);
            eprintln!(
                "\n  {} listing page: {}",
                "•".dimmed(),
                format!("http://localhost:{}/{}", port, listing.filename).cyan()
            );
        }

        eprintln!();

        Ok(())
    }
}
