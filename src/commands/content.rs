// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Content listing commands

use anyhow::Result;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use crate::client::{ContentSummary, ContentTypeInfo};
use crate::context::CmsContext;

#[derive(Tabled)]
struct ContentRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Content Key")]
    content_key: String,
    #[tabled(rename = "Type")]
    content_type: String,
    #[tabled(rename = "Title")]
    title: String,
}

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Developer Name")]
    developer_name: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Id")]
    id: String,
}

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

fn print_items(items: &[ContentSummary]) {
    if items.is_empty() {
        println!("No content found.");
        return;
    }
    let rows: Vec<ContentRow> = items
        .iter()
        .map(|item| ContentRow {
            id: item.id.clone(),
            content_key: or_dash(&item.content_key),
            content_type: or_dash(&item.content_type),
            title: or_dash(&item.title),
        })
        .collect();
    let table = Table::new(rows)
        .with(TableStyle::ascii_rounded())
        .to_string();
    println!("{}", table);
    println!("\nTotal: {}", items.len());
}

pub async fn list_content(ctx: &mut CmsContext, limit: usize) -> Result<()> {
    let items = ctx.client.list(limit).await?;
    print_items(&items);
    Ok(())
}

pub async fn search_content(ctx: &mut CmsContext, query: &str, limit: usize) -> Result<()> {
    let items = ctx.client.search(query, limit).await?;
    print_items(&items);
    Ok(())
}

pub async fn list_types(ctx: &mut CmsContext) -> Result<()> {
    let types: Vec<ContentTypeInfo> = ctx.client.get_types().await?;
    if types.is_empty() {
        println!("No content types found.");
        return Ok(());
    }
    let rows: Vec<TypeRow> = types
        .iter()
        .map(|t| TypeRow {
            developer_name: t.developer_name.clone(),
            label: or_dash(&t.label),
            id: t.id.clone(),
        })
        .collect();
    let table = Table::new(rows)
        .with(TableStyle::ascii_rounded())
        .to_string();
    println!("{}", table);
    Ok(())
}
