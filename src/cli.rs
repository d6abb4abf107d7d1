// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! CLI argument definitions using clap derive macros

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sfcms - Salesforce CMS bridge for AI agents
#[derive(Parser)]
#[command(name = "sfcms")]
#[command(author = "Nervosys")]
#[command(version)]
#[command(about = "Operate and serve a Salesforce CMS workspace over MCP", long_about = None)]
pub struct Cli {
    /// Config file (defaults to <config dir>/sfcms/config.json)
    #[arg(long, global = true, env = "SFCMS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server on stdio
    Serve,

    /// Authenticate and show the resolved workspace and channel
    #[command(visible_alias = "whoami")]
    AuthCheck,

    /// Validate an email block tree from a JSON file (no network access)
    Validate {
        /// Path to the block tree JSON ("-" for stdin)
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List content types available in the org
    Types,

    /// List content in the workspace channel
    #[command(visible_alias = "ls")]
    List {
        /// Maximum number of items
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Search content in the workspace channel
    Search {
        /// Search term
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_validate() {
        let cli = Cli::parse_from(["sfcms", "validate", "tree.json", "--json"]);
        match cli.command {
            Commands::Validate { file, json } => {
                assert_eq!(file, PathBuf::from("tree.json"));
                assert!(json);
            }
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn test_parse_search_with_limit() {
        let cli = Cli::parse_from(["sfcms", "--config", "/tmp/c.json", "search", "spring", "-n", "5"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
        assert!(matches!(
            cli.command,
            Commands::Search { ref query, limit: 5 } if query == "spring"
        ));
    }
}
