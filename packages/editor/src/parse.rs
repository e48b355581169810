//! Parsing editor HTML fragments back into block documents.
//!
//! Top-level element nodes dispatch on tag name; tags outside the table
//! are not converted themselves — their element children are visited
//! recursively, so structure nested inside an unrecognized wrapper is
//! still found while the wrapper's own semantics are lost. All text is
//! flattened: inline markup inside a handled node is discarded and only
//! the concatenated text survives.

use scraper::{ElementRef, Html};

use crate::block::{Block, BlockKind};

/// Parse an HTML fragment into an ordered block sequence.
///
/// Every produced block receives a freshly generated sequential id
/// (`block-{n}`), monotonically increasing across the whole call. Ids
/// from a previous render are never preserved. Whitespace-only
/// paragraphs are dropped.
pub fn html_to_blocks(html: &str) -> Vec<Block> {
    let fragment = Html::parse_fragment(html);
    let mut blocks = Vec::new();
    let mut next_id = 1usize;

    for node in fragment.root_element().children() {
        if let Some(element) = ElementRef::wrap(node) {
            visit_element(element, &mut blocks, &mut next_id);
        }
    }

    blocks
}

fn visit_element(element: ElementRef<'_>, blocks: &mut Vec<Block>, next_id: &mut usize) {
    let tag = element.value().name();

    let kind = match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            // The numeric suffix is the heading level
            let level = tag[1..].parse::<u8>().unwrap_or(1);
            Some(BlockKind::Heading {
                level,
                text: flattened_text(element),
            })
        }
        "p" => {
            let text = flattened_text(element);
            if text.is_empty() {
                // Empty paragraphs are silently dropped
                None
            } else {
                Some(BlockKind::Paragraph { text })
            }
        }
        "ul" => Some(BlockKind::BulletList {
            items: list_items(element),
        }),
        "ol" => Some(BlockKind::OrderedList {
            items: list_items(element),
        }),
        "blockquote" => Some(BlockKind::Blockquote {
            text: flattened_text(element),
        }),
        "pre" => match code_child(element) {
            Some(code) => Some(BlockKind::CodeBlock {
                language: language_class(code),
                // Whitespace is significant inside code, keep it verbatim
                code: code.text().collect(),
            }),
            None => {
                visit_children(element, blocks, next_id);
                return;
            }
        },
        "img" => Some(BlockKind::Image {
            src: element.value().attr("src").unwrap_or_default().to_string(),
            alt: element.value().attr("alt").unwrap_or_default().to_string(),
        }),
        "hr" => Some(BlockKind::HorizontalRule),
        _ => {
            visit_children(element, blocks, next_id);
            return;
        }
    };

    if let Some(kind) = kind {
        blocks.push(Block::with_id(format!("block-{}", next_id), kind));
        *next_id += 1;
    }
}

fn visit_children(element: ElementRef<'_>, blocks: &mut Vec<Block>, next_id: &mut usize) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            visit_element(child_element, blocks, next_id);
        }
    }
}

/// Concatenated descendant text, trimmed
fn flattened_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Flattened text of each child `li`, in document order
fn list_items(element: ElementRef<'_>) -> Vec<String> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .map(flattened_text)
        .collect()
}

/// First `code` element child of a `pre`, if any
fn code_child(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "code")
}

/// Language from a `language-xxx` class token, else empty string
fn language_class(code: ElementRef<'_>) -> String {
    code.value()
        .classes()
        .find_map(|class| class.strip_prefix("language-"))
        .unwrap_or_default()
        .to_string()
}
