// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Offline block tree validation

use anyhow::{Context, Result};
use colored::*;
use std::io::Read;
use std::path::Path;

use crate::client::BLOCK_TREE_FIELD;
use crate::validate::{validate, ContentNode, ValidationReport};

/// Read a block tree from a file, or stdin for "-".
///
/// Accepts a bare root node, a content body holding one under
/// `sfdc_cms:block`, or a create payload wrapping that body in `contentBody`.
pub fn read_block_tree(path: &Path) -> Result<ContentNode> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    let mut value: serde_json::Value = serde_json::from_str(&raw).context("parsing JSON")?;
    if let Some(body) = value.get_mut("contentBody") {
        value = body.take();
    }
    if let Some(tree) = value.get_mut(BLOCK_TREE_FIELD) {
        value = tree.take();
    }
    serde_json::from_value(value).context("block tree must be { id, definition, children }")
}

/// Validate a block tree file. Returns the report so the caller can set the exit code.
pub fn validate_file(path: &Path, as_json: bool) -> Result<ValidationReport> {
    let tree = read_block_tree(path)?;
    let report = validate(&tree);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.valid {
        print!("{}", report.to_string().green());
    } else {
        print!("{}", report.to_string().red());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_tree(value: &serde_json::Value) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), value.to_string()).unwrap();
        file
    }

    #[test]
    fn test_reads_bare_root() {
        let file = write_tree(&json!({
            "id": "3f2b8c1e-5d4a-4e6f-9a7b-1c2d3e4f5a6b",
            "definition": "sfdc_cms/rootContentBlock"
        }));
        let tree = read_block_tree(file.path()).unwrap();
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_unwraps_content_body() {
        let file = write_tree(&json!({
            "contentBody": {
                "sfdc_cms:block": { "id": "x", "definition": "sfdc_cms/rootContentBlock" }
            }
        }));
        assert_eq!(read_block_tree(file.path()).unwrap().id, "x");
    }

    #[test]
    fn test_rejects_non_tree() {
        let file = write_tree(&json!({ "title": "no tree here" }));
        assert!(read_block_tree(file.path()).is_err());
    }
}
