// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! sfcms - Main entry point
//!
//! Operator CLI for the Salesforce CMS bridge: check credentials, inspect
//! content, validate block trees offline, or run the MCP server.

use anyhow::Result;
use clap::Parser;

use sfcms::cli::{Cli, Commands};
use sfcms::commands;
use sfcms::config::CmsConfig;
use sfcms::context::CmsContext;
use sfcms::mcp::McpServer;

fn build_context(cli: &Cli) -> Result<CmsContext> {
    let config = CmsConfig::load_from(cli.config.as_deref())?;
    Ok(CmsContext::from_config(&config)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Validate { file, json } => {
            let report = commands::validate_file(file, *json)?;
            if !report.valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Serve => {
            let mut server = McpServer::new(build_context(&cli)?);
            server.run().await?;
            Ok(())
        }
        Commands::AuthCheck => commands::auth_check(&mut build_context(&cli)?).await,
        Commands::Types => commands::list_types(&mut build_context(&cli)?).await,
        Commands::List { limit } => commands::list_content(&mut build_context(&cli)?, *limit).await,
        Commands::Search { query, limit } => {
            commands::search_content(&mut build_context(&cli)?, query, *limit).await
        }
    }
}
