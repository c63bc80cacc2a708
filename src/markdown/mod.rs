//! Markdown rendering pipeline for user-authored post content.
//!
//! Converts raw markdown text to a tree of [`RenderedNode`] values for
//! display. The transform is pure and total: it never fails, and malformed
//! or unbalanced markup degrades to literal text.
//!
//! Stages run in a fixed order, each over the output of the previous one,
//! because later stages must not re-interpret markup already consumed by
//! earlier ones:
//!
//! 1. Fenced code blocks and tables are extracted behind opaque
//!    placeholders.
//! 2. Lines are classified into headings, blockquotes, list items, and
//!    horizontal rules.
//! 3. Inline rules apply in strict precedence.
//! 4. Blank lines start new paragraphs; single newlines become line breaks
//!    within the current paragraph.
//! 5. Code-block contents get a best-effort highlighting pass keyed by the
//!    declared language tag.
//!
//! Includes a memoization layer ([`MarkdownCache`]) that caches rendered
//! output keyed by content hash, since reply content re-renders far more
//! often than it changes.

mod blocks;
mod cache;
mod escape;
mod highlight;
mod inline;
mod node;

pub use cache::MarkdownCache;
pub use node::{to_html, CodeSegment, CodeSegmentKind, RenderedNode};

use once_cell::sync::Lazy;
use regex::Regex;

use blocks::ExtractedBlock;

/// Maximum number of entries in the markdown cache before eviction
pub const MARKDOWN_CACHE_MAX_ENTRIES: usize = 500;

/// Headings: one to three `#` at line start, then a space.
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,3})\s+(.*)$").expect("invalid heading pattern"));

/// Unordered list items: `- `, `* `, or `+ ` at line start.
static UNORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*+]\s+(.*)$").expect("invalid unordered item pattern"));

/// Ordered list items: `N. ` at line start.
static ORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s+(.*)$").expect("invalid ordered item pattern"));

/// Render markdown text to structured content nodes.
///
/// Pure and deterministic: the same input always yields a structurally
/// identical node list, and no input can make it panic.
pub fn render(raw: &str) -> Vec<RenderedNode> {
    let (text, extracted) = blocks::extract(raw);

    let mut nodes: Vec<RenderedNode> = Vec::new();
    let mut paragraph: Vec<RenderedNode> = Vec::new();
    let mut quote_lines: Vec<String> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim_end();

        if let Some(rest) = quote_content(trimmed) {
            flush_paragraph(&mut paragraph, &mut nodes);
            quote_lines.push(rest.to_string());
            continue;
        }
        flush_quote(&mut quote_lines, &mut nodes);

        if let Some(caps) = blocks::PLACEHOLDER.captures(trimmed.trim()) {
            flush_paragraph(&mut paragraph, &mut nodes);
            // The index always parses: the placeholder regex only admits digits
            // that extract() itself wrote.
            if let Some(block) = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|idx| extracted.get(idx))
            {
                nodes.push(render_extracted(block));
            }
            continue;
        }

        if trimmed.trim().is_empty() {
            flush_paragraph(&mut paragraph, &mut nodes);
            continue;
        }

        if let Some(caps) = HEADING.captures(trimmed) {
            flush_paragraph(&mut paragraph, &mut nodes);
            nodes.push(RenderedNode::Heading {
                level: caps[1].len() as u8,
                children: inline::parse_inline(&caps[2]),
            });
            continue;
        }

        if trimmed.trim() == "---" {
            flush_paragraph(&mut paragraph, &mut nodes);
            nodes.push(RenderedNode::Rule);
            continue;
        }

        if let Some(caps) = UNORDERED_ITEM.captures(trimmed) {
            flush_paragraph(&mut paragraph, &mut nodes);
            nodes.push(RenderedNode::ListItem {
                ordered: false,
                children: inline::parse_inline(&caps[1]),
            });
            continue;
        }

        if let Some(caps) = ORDERED_ITEM.captures(trimmed) {
            flush_paragraph(&mut paragraph, &mut nodes);
            nodes.push(RenderedNode::ListItem {
                ordered: true,
                children: inline::parse_inline(&caps[1]),
            });
            continue;
        }

        // Plain text line: single newlines fold into the current paragraph
        if !paragraph.is_empty() {
            paragraph.push(RenderedNode::LineBreak);
        }
        paragraph.extend(inline::parse_inline(trimmed));
    }

    flush_quote(&mut quote_lines, &mut nodes);
    flush_paragraph(&mut paragraph, &mut nodes);
    nodes
}

/// Blockquote content for a `> ` line, or None.
fn quote_content(line: &str) -> Option<&str> {
    line.strip_prefix("> ").or_else(|| {
        // A bare ">" quotes an empty line
        (line == ">").then_some("")
    })
}

fn render_extracted(block: &ExtractedBlock) -> RenderedNode {
    match block {
        ExtractedBlock::Code { language, body } => RenderedNode::CodeBlock {
            language: language.clone(),
            segments: highlight::highlight(language.as_deref(), body),
        },
        ExtractedBlock::Table { rows } => RenderedNode::Table { rows: rows.clone() },
    }
}

fn flush_paragraph(paragraph: &mut Vec<RenderedNode>, nodes: &mut Vec<RenderedNode>) {
    if !paragraph.is_empty() {
        nodes.push(RenderedNode::Paragraph {
            children: std::mem::take(paragraph),
        });
    }
}

/// Consecutive quoted lines collapse into a single blockquote with line
/// breaks between them.
fn flush_quote(quote_lines: &mut Vec<String>, nodes: &mut Vec<RenderedNode>) {
    if quote_lines.is_empty() {
        return;
    }
    let mut children: Vec<RenderedNode> = Vec::new();
    for (idx, line) in quote_lines.drain(..).enumerate() {
        if idx > 0 {
            children.push(RenderedNode::LineBreak);
        }
        children.extend(inline::parse_inline(&line));
    }
    nodes.push(RenderedNode::Blockquote { children });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RenderedNode {
        RenderedNode::Text { text: s.to_string() }
    }

    #[test]
    fn test_plain_paragraph() {
        assert_eq!(
            render("Hello, world!"),
            vec![RenderedNode::Paragraph { children: vec![text("Hello, world!")] }]
        );
    }

    #[test]
    fn test_empty_input_renders_nothing() {
        assert!(render("").is_empty());
        assert!(render("\n\n\n").is_empty());
    }

    #[test]
    fn test_bold_paragraph() {
        assert_eq!(
            render("**bold**"),
            vec![RenderedNode::Paragraph {
                children: vec![RenderedNode::Bold { children: vec![text("bold")] }],
            }]
        );
    }

    #[test]
    fn test_triple_emphasis_precedence() {
        assert_eq!(
            render("***both***"),
            vec![RenderedNode::Paragraph {
                children: vec![RenderedNode::Bold {
                    children: vec![RenderedNode::Italic { children: vec![text("both")] }],
                }],
            }]
        );
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            render("# One\n## Two\n### Three"),
            vec![
                RenderedNode::Heading { level: 1, children: vec![text("One")] },
                RenderedNode::Heading { level: 2, children: vec![text("Two")] },
                RenderedNode::Heading { level: 3, children: vec![text("Three")] },
            ]
        );
    }

    #[test]
    fn test_four_hashes_is_not_a_heading() {
        let nodes = render("#### deep");
        assert!(matches!(nodes[0], RenderedNode::Paragraph { .. }));
    }

    #[test]
    fn test_blockquote_coalesces_lines() {
        assert_eq!(
            render("> first\n> second"),
            vec![RenderedNode::Blockquote {
                children: vec![text("first"), RenderedNode::LineBreak, text("second")],
            }]
        );
    }

    #[test]
    fn test_unordered_list_markers() {
        let nodes = render("- one\n* two\n+ three");
        assert_eq!(nodes.len(), 3);
        for node in &nodes {
            assert!(matches!(node, RenderedNode::ListItem { ordered: false, .. }));
        }
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!(
            render("1. first\n2. second"),
            vec![
                RenderedNode::ListItem { ordered: true, children: vec![text("first")] },
                RenderedNode::ListItem { ordered: true, children: vec![text("second")] },
            ]
        );
    }

    #[test]
    fn test_horizontal_rule() {
        assert_eq!(render("above\n\n---\n\nbelow").len(), 3);
        assert!(matches!(render("---")[0], RenderedNode::Rule));
    }

    #[test]
    fn test_paragraph_and_line_break_folding() {
        assert_eq!(
            render("line one\nline two\n\nnew paragraph"),
            vec![
                RenderedNode::Paragraph {
                    children: vec![text("line one"), RenderedNode::LineBreak, text("line two")],
                },
                RenderedNode::Paragraph { children: vec![text("new paragraph")] },
            ]
        );
    }

    #[test]
    fn test_code_block_is_opaque_and_highlighted() {
        let nodes = render("```python\n# comment\nx = 1\n```");
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            RenderedNode::CodeBlock { language, segments } => {
                assert_eq!(language.as_deref(), Some("python"));
                assert!(segments.iter().any(|s| s.kind == CodeSegmentKind::Comment));
            }
            other => panic!("expected code block, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_language_renders_plain() {
        let nodes = render("```brainfuck\n+++\n```");
        match &nodes[0] {
            RenderedNode::CodeBlock { segments, .. } => {
                assert_eq!(segments, &vec![CodeSegment::plain("+++")]);
            }
            other => panic!("expected code block, got {other:?}"),
        }
    }

    #[test]
    fn test_table_contents_never_reinterpreted() {
        let nodes = render("| **a** | b |\n|-----|-----|\n| *c* | d |");
        match &nodes[0] {
            RenderedNode::Table { rows } => {
                assert_eq!(rows[0][0], "**a**");
                assert_eq!(rows[1][0], "*c*");
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_unbalanced_markup_degrades_to_text() {
        assert_eq!(
            render("**unterminated"),
            vec![RenderedNode::Paragraph { children: vec![text("**unterminated")] }]
        );
    }

    #[test]
    fn test_never_panics_on_hostile_input() {
        for input in [
            "```",
            "``````",
            "***",
            "[",
            "![](",
            "| |",
            "> ",
            "\u{0}7\u{0}",
            "1. ",
            "######",
            "- **[`~~",
        ] {
            let _ = render(input);
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let raw = "# Title\n\nSome **bold** and a [link](https://example.com).\n\n```js\nlet x = 1;\n```";
        assert_eq!(render(raw), render(raw));
    }

    #[test]
    fn test_mixed_document_end_to_end() {
        let raw = "## Charging etiquette\n\n> please unplug\n\n- be kind\n- move on\n\n---\n\nDone.";
        let nodes = render(raw);
        let html = to_html(&nodes);
        assert!(html.contains("<h2>Charging etiquette</h2>"));
        assert!(html.contains("<blockquote>please unplug</blockquote>"));
        assert!(html.contains("<ul><li>be kind</li><li>move on</li></ul>"));
        assert!(html.contains("<hr>"));
        assert!(html.ends_with("<p>Done.</p>"));
    }
}
