//! mpa library
//!
//! Multi-page planning for webpack-style builds: page discovery, script to
//! template association, chunk injection and entry assembly.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod planner;
pub mod select;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use error::{MpaError, Result};
pub use planner::{BuildPlan, PlanOptions, Planner};
