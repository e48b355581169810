//! Rendering block documents to the HTML fragment the editing surface
//! consumes.
//!
//! Every known node type has a fixed template; unknown nodes fall back to
//! the paragraph template. Text and attribute values are HTML-escaped on
//! the way out — the parser decodes the entities again, so escaping does
//! not disturb round trips.

use crate::block::{Block, BlockKind};

/// Render an ordered block sequence to a single HTML fragment string.
///
/// Concatenation order matches array order. This function never fails;
/// nodes the model does not know render as paragraphs.
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut html = String::new();
    for block in blocks {
        render_block(&mut html, &block.kind);
    }
    html
}

fn render_block(out: &mut String, kind: &BlockKind) {
    match kind {
        BlockKind::Heading { level, text } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!(
                "<h{level}>{}</h{level}>",
                escape_html(text)
            ));
        }
        BlockKind::Paragraph { text } => {
            out.push_str(&format!("<p>{}</p>", escape_html(text)));
        }
        BlockKind::BulletList { items } => {
            out.push_str("<ul>");
            for item in items {
                out.push_str(&format!("<li>{}</li>", escape_html(item)));
            }
            out.push_str("</ul>");
        }
        BlockKind::OrderedList { items } => {
            out.push_str("<ol>");
            for item in items {
                out.push_str(&format!("<li>{}</li>", escape_html(item)));
            }
            out.push_str("</ol>");
        }
        BlockKind::Blockquote { text } => {
            out.push_str(&format!(
                "<blockquote><p>{}</p></blockquote>",
                escape_html(text)
            ));
        }
        BlockKind::CodeBlock { language, code } => {
            if language.is_empty() {
                out.push_str(&format!("<pre><code>{}</code></pre>", escape_html(code)));
            } else {
                out.push_str(&format!(
                    "<pre><code class=\"language-{}\">{}</code></pre>",
                    escape_attr(language),
                    escape_html(code)
                ));
            }
        }
        BlockKind::Image { src, alt } => {
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">",
                escape_attr(src),
                escape_attr(alt)
            ));
        }
        BlockKind::HorizontalRule => {
            out.push_str("<hr>");
        }
        BlockKind::Unknown { text, .. } => {
            // Unknown node types degrade to the paragraph template
            out.push_str(&format!("<p>{}</p>", escape_html(text)));
        }
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(input: &str) -> String {
    escape_html(input).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_renders_with_level() {
        // テスト項目: heading が level 付きの hN タグとして描画される
        // given (前提条件):
        let blocks = vec![Block::new(BlockKind::Heading {
            level: 2,
            text: "Hi".to_string(),
        })];

        // when (操作):
        let html = blocks_to_html(&blocks);

        // then (期待する結果):
        assert_eq!(html, "<h2>Hi</h2>");
    }

    #[test]
    fn test_bullet_list_renders_one_li_per_item() {
        // テスト項目: bulletList が項目ごとの li を持つ ul として描画される
        // given (前提条件):
        let blocks = vec![Block::new(BlockKind::BulletList {
            items: vec!["a".to_string(), "b".to_string()],
        })];

        // when (操作):
        let html = blocks_to_html(&blocks);

        // then (期待する結果):
        assert_eq!(html, "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_code_block_renders_language_class() {
        // テスト項目: codeBlock の language が language-xxx クラスとして描画される
        // given (前提条件):
        let blocks = vec![Block::new(BlockKind::CodeBlock {
            language: "python".to_string(),
            code: "print(1)".to_string(),
        })];

        // when (操作):
        let html = blocks_to_html(&blocks);

        // then (期待する結果):
        assert_eq!(
            html,
            "<pre><code class=\"language-python\">print(1)</code></pre>"
        );
    }

    #[test]
    fn test_code_block_without_language_has_no_class() {
        // テスト項目: language が空の codeBlock はクラスなしで描画される
        // given (前提条件):
        let blocks = vec![Block::new(BlockKind::CodeBlock {
            language: String::new(),
            code: "x = 1".to_string(),
        })];

        // when (操作):
        let html = blocks_to_html(&blocks);

        // then (期待する結果):
        assert_eq!(html, "<pre><code>x = 1</code></pre>");
    }

    #[test]
    fn test_unknown_type_falls_back_to_paragraph() {
        // テスト項目: 未知の type が段落テンプレートで描画される
        // given (前提条件):
        let blocks = vec![Block::new(BlockKind::Unknown {
            node_type: "unknownType".to_string(),
            text: "x".to_string(),
        })];

        // when (操作):
        let html = blocks_to_html(&blocks);

        // then (期待する結果):
        assert_eq!(html, "<p>x</p>");
    }

    #[test]
    fn test_blocks_concatenate_in_array_order() {
        // テスト項目: ブロックが配列順に連結される
        // given (前提条件):
        let blocks = vec![
            Block::new(BlockKind::Heading {
                level: 1,
                text: "Title".to_string(),
            }),
            Block::new(BlockKind::HorizontalRule),
            Block::new(BlockKind::Paragraph {
                text: "body".to_string(),
            }),
        ];

        // when (操作):
        let html = blocks_to_html(&blocks);

        // then (期待する結果):
        assert_eq!(html, "<h1>Title</h1><hr><p>body</p>");
    }

    #[test]
    fn test_text_content_is_escaped() {
        // テスト項目: テキスト内の HTML 特殊文字がエスケープされる
        // given (前提条件):
        let blocks = vec![Block::new(BlockKind::Paragraph {
            text: "a < b & c".to_string(),
        })];

        // when (操作):
        let html = blocks_to_html(&blocks);

        // then (期待する結果):
        assert_eq!(html, "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_image_attributes_are_escaped() {
        // テスト項目: 画像属性内の引用符がエスケープされる
        // given (前提条件):
        let blocks = vec![Block::new(BlockKind::Image {
            src: "/a.png".to_string(),
            alt: "say \"hi\"".to_string(),
        })];

        // when (操作):
        let html = blocks_to_html(&blocks);

        // then (期待する結果):
        assert_eq!(html, "<img src=\"/a.png\" alt=\"say &quot;hi&quot;\">");
    }

    #[test]
    fn test_whitespace_paragraph_still_renders() {
        // テスト項目: 空白のみの段落も描画側では落とされない
        // given (前提条件):
        let blocks = vec![
            Block::new(BlockKind::Heading {
                level: 2,
                text: "Hi".to_string(),
            }),
            Block::new(BlockKind::Paragraph {
                text: "   ".to_string(),
            }),
        ];

        // when (操作):
        let html = blocks_to_html(&blocks);

        // then (期待する結果):
        assert_eq!(html, "<h2>Hi</h2><p>   </p>");
    }
}
