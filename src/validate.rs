// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Structural checks for email block trees
//!
//! A block tree is `root -> section -> column -> component`. The walk never
//! stops at the first problem; every violation found is reported. The result
//! is advisory: the CMS API remains the final authority.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub const ROOT_DEFINITION: &str = "sfdc_cms/rootContentBlock";
pub const SECTION_DEFINITION: &str = "lightning/section";
pub const COLUMN_DEFINITION: &str = "lightning/column";

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("UUID pattern is valid")
});

pub fn is_valid_uuid(id: &str) -> bool {
    UUID_RE.is_match(id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default)]
    pub children: Vec<ContentNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<String>,
    pub warnings: Vec<String>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            writeln!(f, "Block tree is valid.")?;
        } else {
            writeln!(f, "Block tree has {} violation(s):", self.violations.len())?;
            for v in &self.violations {
                writeln!(f, "  - {}", v)?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(f, "Warnings:")?;
            for w in &self.warnings {
                writeln!(f, "  - {}", w)?;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Findings {
    violations: Vec<String>,
    warnings: Vec<String>,
}

pub fn validate(root: &ContentNode) -> ValidationReport {
    let mut findings = Findings::default();

    if root.definition != ROOT_DEFINITION {
        findings.violations.push(format!(
            "root: definition must be {}, found \"{}\"",
            ROOT_DEFINITION, root.definition
        ));
    }
    if root.children.is_empty() {
        findings
            .warnings
            .push("root: has no sections, the email will render empty".to_string());
    }
    visit(root, None, "root", 0, &mut findings);

    ValidationReport {
        valid: findings.violations.is_empty(),
        violations: findings.violations,
        warnings: findings.warnings,
    }
}

fn visit(
    node: &ContentNode,
    parent: Option<&ContentNode>,
    path: &str,
    depth: usize,
    findings: &mut Findings,
) {
    if !is_valid_uuid(&node.id) {
        findings
            .violations
            .push(format!("{}: invalid UUID \"{}\"", path, node.id));
    }

    match parent {
        Some(_) if depth == 1 && node.definition != SECTION_DEFINITION => {
            findings.violations.push(format!(
                "{}: direct child of root must be {}, found \"{}\"",
                path, SECTION_DEFINITION, node.definition
            ));
        }
        Some(p) if p.definition == SECTION_DEFINITION && node.definition != COLUMN_DEFINITION => {
            findings.violations.push(format!(
                "{}: direct child of {} must be {}, found \"{}\"",
                path, SECTION_DEFINITION, COLUMN_DEFINITION, node.definition
            ));
        }
        _ => {}
    }

    if node.definition == SECTION_DEFINITION && node.children.is_empty() {
        findings
            .warnings
            .push(format!("{}: section has no columns", path));
    }
    let is_component = node.definition != SECTION_DEFINITION
        && node.definition != COLUMN_DEFINITION
        && depth > 0;
    if is_component && node.attributes.as_ref().map_or(true, Map::is_empty) {
        findings.warnings.push(format!(
            "{}: component {} has no attributes",
            path, node.definition
        ));
    }

    for (i, child) in node.children.iter().enumerate() {
        let child_path = format!("{}.children[{}]", path, i);
        visit(child, Some(node), &child_path, depth + 1, findings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uuid() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn node(definition: &str, children: Vec<ContentNode>) -> ContentNode {
        ContentNode {
            id: uuid(),
            definition: definition.to_string(),
            attributes: None,
            children,
        }
    }

    fn component(definition: &str) -> ContentNode {
        let mut attributes = Map::new();
        attributes.insert("text".to_string(), json!("Hello"));
        ContentNode {
            attributes: Some(attributes),
            ..node(definition, vec![])
        }
    }

    fn well_formed() -> ContentNode {
        node(
            ROOT_DEFINITION,
            vec![node(
                SECTION_DEFINITION,
                vec![node(COLUMN_DEFINITION, vec![component("lightning/paragraph")])],
            )],
        )
    }

    #[test]
    fn test_uuid_pattern() {
        assert!(is_valid_uuid("123e4567-e89b-12d3-a456-426614174000"));
        assert!(is_valid_uuid("123E4567-E89B-12D3-A456-426614174000"));
        assert!(!is_valid_uuid("123e4567e89b12d3a456426614174000"));
        assert!(!is_valid_uuid("123e4567-e89b-12d3-a456-42661417400"));
        assert!(!is_valid_uuid("g23e4567-e89b-12d3-a456-426614174000"));
        assert!(!is_valid_uuid(" 123e4567-e89b-12d3-a456-426614174000"));
        assert!(!is_valid_uuid(""));
    }

    #[test]
    fn test_well_formed_tree_is_valid() {
        let report = validate(&well_formed());
        assert!(report.valid, "{}", report);
        assert!(report.violations.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_invalid_root_uuid() {
        let tree: ContentNode = serde_json::from_value(json!({
            "id": "not-a-uuid",
            "definition": "sfdc_cms/rootContentBlock",
            "children": []
        }))
        .unwrap();
        let report = validate(&tree);
        assert!(!report.valid);
        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].contains("invalid UUID"));
    }

    #[test]
    fn test_paragraph_directly_under_root() {
        let tree = node(ROOT_DEFINITION, vec![component("lightning/paragraph")]);
        let report = validate(&tree);
        assert!(!report.valid);
        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].contains("direct child of root must be lightning/section"));
    }

    #[test]
    fn test_all_violations_reported() {
        let mut tree = node(
            "lightning/page",
            vec![
                node(
                    SECTION_DEFINITION,
                    vec![component("lightning/button"), node(COLUMN_DEFINITION, vec![])],
                ),
                node(COLUMN_DEFINITION, vec![]),
            ],
        );
        tree.children[0].children[1].id = "bad".to_string();
        tree.children[0].children[1].children.push(ContentNode {
            id: "also-bad".to_string(),
            ..component("lightning/image")
        });

        // wrong root, button under section, bad column id, column under root, bad image id
        let report = validate(&tree);
        assert!(!report.valid);
        assert_eq!(report.violations.len(), 5, "{:#?}", report.violations);
    }

    #[test]
    fn test_deep_components_not_kind_checked() {
        let tree = node(
            ROOT_DEFINITION,
            vec![node(
                SECTION_DEFINITION,
                vec![node(
                    COLUMN_DEFINITION,
                    vec![ContentNode {
                        children: vec![component("custom/anything")],
                        ..component("lightning/container")
                    }],
                )],
            )],
        );
        assert!(validate(&tree).valid);
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let tree = node(
            ROOT_DEFINITION,
            vec![
                node(SECTION_DEFINITION, vec![]),
                node(
                    SECTION_DEFINITION,
                    vec![node(COLUMN_DEFINITION, vec![node("lightning/divider", vec![])])],
                ),
            ],
        );
        let report = validate(&tree);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.to_string().contains("Warnings:"));
    }

    #[test]
    fn test_empty_root_warns() {
        let report = validate(&node(ROOT_DEFINITION, vec![]));
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
    }
}
