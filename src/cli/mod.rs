//! Command-line interface for kitsu-import.

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Imports anime, characters and categories from Kitsu into a relational
/// database.
#[derive(Parser)]
#[command(name = "kitsu-import")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default locations
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one import (the default)
    Run {
        /// Number of anime pages to fetch
        #[arg(long)]
        pages: Option<u32>,

        /// Create missing tables before importing
        #[arg(long)]
        create_schema: bool,

        /// Skip the category pass
        #[arg(long)]
        skip_categories: bool,
    },

    /// Write a default config file
    #[command(alias = "--init")]
    Init,
}

impl Cli {
    /// Loads configuration from `--config` or the default search path, then
    /// applies command-line overrides.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = Config::load_from_path(path)?;
                config.apply_env_overrides()?;
                config
            }
            None => Config::load()?,
        };

        if let Some(Commands::Run {
            pages,
            create_schema,
            skip_categories,
        }) = &self.command
        {
            if let Some(pages) = pages {
                config.import.pages = *pages;
            }
            if *create_schema {
                config.database.create_schema = true;
            }
            if *skip_categories {
                config.import.import_categories = false;
            }
        }

        Ok(config)
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
