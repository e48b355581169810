//! Storage/wire shape for block documents, plus conversion to the domain
//! model.
//!
//! The platform stores articles as JSON arrays of
//! `{type, content, attrs, id}` objects where `content` is either a plain
//! string or a list of `{content}` items depending on the node type. The
//! DTOs here mirror that shape exactly; [`Block`](crate::Block) is the
//! typed model the rest of the code works with.

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockKind};

/// One stored block node, exactly as serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNode {
    /// Missing `type` degrades to the unknown/paragraph path
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<NodeContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<NodeAttrs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Block content: plain text for most node types, item list for lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeContent {
    Text(String),
    Items(Vec<ListItem>),
}

/// One list item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub content: String,
}

/// Node-specific metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl NodeContent {
    /// Flatten to plain text, joining list items with nothing between them
    fn into_text(self) -> String {
        match self {
            NodeContent::Text(text) => text,
            NodeContent::Items(items) => {
                items.into_iter().map(|item| item.content).collect()
            }
        }
    }

    fn into_items(self) -> Vec<String> {
        match self {
            NodeContent::Text(text) => vec![text],
            NodeContent::Items(items) => items.into_iter().map(|item| item.content).collect(),
        }
    }
}

// ========================================
// DTO → Domain
// ========================================

impl From<BlockNode> for Block {
    fn from(node: BlockNode) -> Self {
        let attrs = node.attrs.unwrap_or_default();
        let content = node.content;

        let text = |content: Option<NodeContent>| -> String {
            content.map(NodeContent::into_text).unwrap_or_default()
        };

        let kind = match node.node_type.as_str() {
            "heading" => BlockKind::Heading {
                level: attrs.level.unwrap_or(1).clamp(1, 6),
                text: text(content),
            },
            "paragraph" => BlockKind::Paragraph {
                text: text(content),
            },
            "bulletList" => BlockKind::BulletList {
                items: content.map(NodeContent::into_items).unwrap_or_default(),
            },
            "orderedList" => BlockKind::OrderedList {
                items: content.map(NodeContent::into_items).unwrap_or_default(),
            },
            "blockquote" => BlockKind::Blockquote {
                text: text(content),
            },
            "codeBlock" => BlockKind::CodeBlock {
                language: attrs.language.unwrap_or_default(),
                code: text(content),
            },
            "image" => BlockKind::Image {
                src: attrs.src.unwrap_or_default(),
                alt: attrs.alt.unwrap_or_default(),
            },
            "horizontalRule" => BlockKind::HorizontalRule,
            other => BlockKind::Unknown {
                node_type: other.to_string(),
                text: text(content),
            },
        };

        Block {
            id: node.id,
            kind,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<Block> for BlockNode {
    fn from(block: Block) -> Self {
        let id = block.id;
        match block.kind {
            BlockKind::Heading { level, text } => BlockNode {
                node_type: "heading".to_string(),
                content: Some(NodeContent::Text(text)),
                attrs: Some(NodeAttrs {
                    level: Some(level),
                    ..NodeAttrs::default()
                }),
                id,
            },
            BlockKind::Paragraph { text } => BlockNode {
                node_type: "paragraph".to_string(),
                content: Some(NodeContent::Text(text)),
                attrs: None,
                id,
            },
            BlockKind::BulletList { items } => BlockNode {
                node_type: "bulletList".to_string(),
                content: Some(NodeContent::Items(
                    items.into_iter().map(|content| ListItem { content }).collect(),
                )),
                attrs: None,
                id,
            },
            BlockKind::OrderedList { items } => BlockNode {
                node_type: "orderedList".to_string(),
                content: Some(NodeContent::Items(
                    items.into_iter().map(|content| ListItem { content }).collect(),
                )),
                attrs: None,
                id,
            },
            BlockKind::Blockquote { text } => BlockNode {
                node_type: "blockquote".to_string(),
                content: Some(NodeContent::Text(text)),
                attrs: None,
                id,
            },
            BlockKind::CodeBlock { language, code } => BlockNode {
                node_type: "codeBlock".to_string(),
                content: Some(NodeContent::Text(code)),
                attrs: Some(NodeAttrs {
                    language: Some(language),
                    ..NodeAttrs::default()
                }),
                id,
            },
            BlockKind::Image { src, alt } => BlockNode {
                node_type: "image".to_string(),
                content: None,
                attrs: Some(NodeAttrs {
                    src: Some(src),
                    alt: Some(alt),
                    ..NodeAttrs::default()
                }),
                id,
            },
            BlockKind::HorizontalRule => BlockNode {
                node_type: "horizontalRule".to_string(),
                content: None,
                attrs: None,
                id,
            },
            BlockKind::Unknown { node_type, text } => BlockNode {
                node_type,
                content: Some(NodeContent::Text(text)),
                attrs: None,
                id,
            },
        }
    }
}
