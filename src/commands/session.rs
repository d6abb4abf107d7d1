// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Session commands

use anyhow::Result;
use colored::*;

use crate::context::CmsContext;

/// Authenticate and print the resolved session
pub async fn auth_check(ctx: &mut CmsContext) -> Result<()> {
    let session = ctx.client.session_mut();
    session.ensure_authenticated().await?;
    let info = session.info();

    println!("{}", "Authenticated".green().bold());
    println!();
    println!("  User:      {}", info.username);
    println!(
        "  Instance:  {}",
        info.instance_url.as_deref().unwrap_or("(unknown)")
    );
    println!(
        "  Workspace: {} ({})",
        info.workspace_name,
        info.workspace_id.as_deref().unwrap_or("-")
    );
    println!("  Channel:   {}", info.channel_id.as_deref().unwrap_or("-"));
    if let Some(expires_at) = info.expires_at {
        println!(
            "  Expires:   {}",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed()
        );
    }
    Ok(())
}
