//! Command-line interface for mpa
//!
//! Provides the main CLI structure using clap with subcommands for:
//! - `build`: Production build plan
//! - `dev`: Development build plan with page listing and selection
//! - `pages`: Print discovered pages and their chunks

mod build;
mod dev;
mod pages;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

pub use build::BuildCommand;
pub use dev::DevCommand;
pub use pages::PagesCommand;

/// mpa - multi-page entry planner for webpack-style builds
#[derive(Parser, Debug)]
#[command(name = "mpa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to mpa.toml config file
    #[arg(short, long, global = true, default_value = "mpa.toml")]
    pub config: String,

    /// Don't print the multi-page mode notice
    #[arg(long, global = true, env = "MPA_DISABLE_WARN")]
    pub no_warn: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan a production build
    Build(BuildCommand),

    /// Plan a development build with the page listing
    Dev(DevCommand),

    /// List discovered pages and the chunks each one loads
    Pages(PagesCommand),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        print_banner();

        if !self.no_warn && !matches!(self.command, Commands::Pages(_)) {
            print_notice();
        }

        match &self.command {
            Commands::Build(cmd) => cmd.execute(&self.config).await,
            Commands::Dev(cmd) => cmd.execute(&self.config).await,
            Commands::Pages(cmd) => cmd.execute(&self.config).await,
        }
    }
}

/// Print the mpa banner
fn print_banner() {
    eprintln!(
        "\n{} {} {}\n",
        "⚡".cyan(),
        "mpa".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}

/// Multi-page mode only uses the host framework as a build tool
fn print_notice() {
    eprintln!(
        "{} Multi-page mode uses the host framework as a build tool only:",
        "!".yellow().bold()
    );
    for item in [
        "routing is disabled",
        "global.css and global.js are not loaded",
        "app.js runtime hooks are ignored",
        "runtimePublicPath is not supported",
    ] {
        eprintln!("  {} {}", "•".dimmed(), item);
    }
    eprintln!();
}
