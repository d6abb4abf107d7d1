// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! MCP Resources - guides an agent must read before creating email content

use super::types::*;

struct Guide {
    uri: &'static str,
    name: &'static str,
    description: &'static str,
    text: &'static str,
}

const GUIDES: &[Guide] = &[
    Guide {
        uri: "sfcms://guides/email-structure",
        name: "Email block structure",
        description: "How the block tree of sfdc_cms__email content is laid out",
        text: "\
Email content (content type `sfdc_cms__email`) stores its layout in the
`sfdc_cms:block` field of the content body as a tree of nodes:

  sfdc_cms/rootContentBlock
    lightning/section          (one or more, direct children of the root)
      lightning/column         (one or more, direct children of a section)
        <component>            (lightning/paragraph, lightning/image, lightning/button, ...)

Every node has `id`, `definition`, optional `attributes` and `children`.
Components may nest further; their kinds are checked by the CMS itself.

The body also needs `title` (filled from the tool's title argument when
missing) and usually `subjectLine`.

Workflow:
  1. cms_prepare_email_creation  -> returns a clearance token
  2. cms_validate_block_tree     -> fix every violation it reports
  3. cms_create_content          -> pass the token; it works exactly once
",
    },
    Guide {
        uri: "sfcms://guides/block-ids",
        name: "Block identifiers",
        description: "Identifier rules for block tree nodes",
        text: "\
Every node `id` must be a canonical UUID: five hex groups of 8-4-4-4-12
characters separated by hyphens, e.g. 3f2b8c1e-9d4a-4e7b-a1c2-5d6e7f809a1b.

Generate a fresh UUID for every node. Do not reuse ids between nodes or copy
them from other content items. Upper- and lower-case hex are both accepted.
",
    },
];

pub fn list_resources() -> Vec<Resource> {
    GUIDES
        .iter()
        .map(|g| Resource {
            uri: g.uri.to_string(),
            name: g.name.to_string(),
            description: g.description.to_string(),
            mime_type: "text/markdown".to_string(),
        })
        .collect()
}

pub fn read_resource(uri: &str) -> Option<ReadResourceResult> {
    GUIDES.iter().find(|g| g.uri == uri).map(|g| ReadResourceResult {
        contents: vec![ResourceContent {
            uri: g.uri.to_string(),
            mime_type: "text/markdown".to_string(),
            text: g.text.to_string(),
        }],
    })
}
