//! Rendered content nodes and the HTML emitter.
//!
//! [`RenderedNode`] is a closed set of variants produced exclusively by the
//! rendering pipeline; nothing else in the crate constructs them. Output
//! targets match over the variants, so adding a target never touches the
//! parsing stages.

use serde::{Deserialize, Serialize};

use super::escape::escape_html;

/// One unit of structured output from the markdown pipeline.
///
/// Immutable once produced; a reply's rendered content is regenerated
/// wholesale whenever its raw content changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedNode {
    /// A paragraph of inline content
    Paragraph { children: Vec<RenderedNode> },
    /// Heading, levels 1-3
    Heading { level: u8, children: Vec<RenderedNode> },
    /// Fenced code block with optional language tag and highlighted segments
    CodeBlock {
        language: Option<String>,
        segments: Vec<CodeSegment>,
    },
    /// Inline code span; contents are never re-interpreted
    InlineCode { code: String },
    /// Bold emphasis
    Bold { children: Vec<RenderedNode> },
    /// Italic emphasis
    Italic { children: Vec<RenderedNode> },
    /// Strikethrough
    Strikethrough { children: Vec<RenderedNode> },
    /// Hyperlink; `href` has already passed the scheme check
    Link { href: String, children: Vec<RenderedNode> },
    /// Inline image; `src` has already passed the scheme check
    Image { src: String, alt: String },
    /// Quoted block
    Blockquote { children: Vec<RenderedNode> },
    /// One list item; consecutive same-kind items form one list
    ListItem { ordered: bool, children: Vec<RenderedNode> },
    /// Table; the first row is the header
    Table { rows: Vec<Vec<String>> },
    /// Horizontal rule
    Rule,
    /// Line break within a paragraph
    LineBreak,
    /// Literal text
    Text { text: String },
}

/// Highlight classification for a slice of code-block text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CodeSegmentKind {
    /// Unclassified code text
    Plain,
    /// Language keyword
    Keyword,
    /// String or numeric literal
    Literal,
    /// Comment
    Comment,
}

/// A contiguous run of code-block text with one highlight classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeSegment {
    pub kind: CodeSegmentKind,
    pub text: String,
}

impl CodeSegment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: CodeSegmentKind::Plain,
            text: text.into(),
        }
    }
}

/// Emit nodes as an HTML fragment.
///
/// Every literal is entity-escaped here; consecutive same-kind `ListItem`
/// nodes are wrapped in a single `<ul>`/`<ol>`.
pub fn to_html(nodes: &[RenderedNode]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < nodes.len() {
        if let RenderedNode::ListItem { ordered, .. } = &nodes[i] {
            let tag = if *ordered { "ol" } else { "ul" };
            out.push('<');
            out.push_str(tag);
            out.push('>');
            while i < nodes.len() {
                match &nodes[i] {
                    RenderedNode::ListItem { ordered: o, children } if o == ordered => {
                        out.push_str("<li>");
                        out.push_str(&to_html(children));
                        out.push_str("</li>");
                        i += 1;
                    }
                    _ => break,
                }
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        } else {
            emit_node(&nodes[i], &mut out);
            i += 1;
        }
    }
    out
}

fn emit_node(node: &RenderedNode, out: &mut String) {
    match node {
        RenderedNode::Paragraph { children } => {
            out.push_str("<p>");
            out.push_str(&to_html(children));
            out.push_str("</p>");
        }
        RenderedNode::Heading { level, children } => {
            out.push_str(&format!("<h{level}>"));
            out.push_str(&to_html(children));
            out.push_str(&format!("</h{level}>"));
        }
        RenderedNode::CodeBlock { language, segments } => {
            match language {
                Some(lang) => {
                    out.push_str(&format!("<pre><code class=\"language-{}\">", escape_html(lang)))
                }
                None => out.push_str("<pre><code>"),
            }
            for segment in segments {
                match segment.kind {
                    CodeSegmentKind::Plain => out.push_str(&escape_html(&segment.text)),
                    CodeSegmentKind::Keyword => {
                        out.push_str(&format!("<span class=\"hl-keyword\">{}</span>", escape_html(&segment.text)))
                    }
                    CodeSegmentKind::Literal => {
                        out.push_str(&format!("<span class=\"hl-literal\">{}</span>", escape_html(&segment.text)))
                    }
                    CodeSegmentKind::Comment => {
                        out.push_str(&format!("<span class=\"hl-comment\">{}</span>", escape_html(&segment.text)))
                    }
                }
            }
            out.push_str("</code></pre>");
        }
        RenderedNode::InlineCode { code } => {
            out.push_str("<code>");
            out.push_str(&escape_html(code));
            out.push_str("</code>");
        }
        RenderedNode::Bold { children } => {
            out.push_str("<strong>");
            out.push_str(&to_html(children));
            out.push_str("</strong>");
        }
        RenderedNode::Italic { children } => {
            out.push_str("<em>");
            out.push_str(&to_html(children));
            out.push_str("</em>");
        }
        RenderedNode::Strikethrough { children } => {
            out.push_str("<del>");
            out.push_str(&to_html(children));
            out.push_str("</del>");
        }
        RenderedNode::Link { href, children } => {
            out.push_str(&format!(
                "<a href=\"{}\" rel=\"noopener noreferrer\">",
                escape_html(href)
            ));
            out.push_str(&to_html(children));
            out.push_str("</a>");
        }
        RenderedNode::Image { src, alt } => {
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">",
                escape_html(src),
                escape_html(alt)
            ));
        }
        RenderedNode::Blockquote { children } => {
            out.push_str("<blockquote>");
            out.push_str(&to_html(children));
            out.push_str("</blockquote>");
        }
        // Runs are wrapped by to_html; a stray item still emits valid markup
        RenderedNode::ListItem { children, .. } => {
            out.push_str("<li>");
            out.push_str(&to_html(children));
            out.push_str("</li>");
        }
        RenderedNode::Table { rows } => {
            out.push_str("<table>");
            for (row_idx, row) in rows.iter().enumerate() {
                let cell_tag = if row_idx == 0 { "th" } else { "td" };
                if row_idx == 0 {
                    out.push_str("<thead>");
                } else if row_idx == 1 {
                    out.push_str("<tbody>");
                }
                out.push_str("<tr>");
                for cell in row {
                    out.push_str(&format!("<{cell_tag}>{}</{cell_tag}>", escape_html(cell)));
                }
                out.push_str("</tr>");
                if row_idx == 0 {
                    out.push_str("</thead>");
                }
            }
            if rows.len() > 1 {
                out.push_str("</tbody>");
            }
            out.push_str("</table>");
        }
        RenderedNode::Rule => out.push_str("<hr>"),
        RenderedNode::LineBreak => out.push_str("<br>"),
        RenderedNode::Text { text } => out.push_str(&escape_html(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RenderedNode {
        RenderedNode::Text { text: s.to_string() }
    }

    #[test]
    fn test_text_is_escaped() {
        let html = to_html(&[text("<script>alert('x')</script>")]);
        assert!(!html.contains('<') || !html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_bold_wraps_strong() {
        let html = to_html(&[RenderedNode::Bold {
            children: vec![text("bold")],
        }]);
        assert_eq!(html, "<strong>bold</strong>");
    }

    #[test]
    fn test_unordered_run_becomes_one_list() {
        let items = vec![
            RenderedNode::ListItem { ordered: false, children: vec![text("a")] },
            RenderedNode::ListItem { ordered: false, children: vec![text("b")] },
        ];
        assert_eq!(to_html(&items), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_mixed_runs_split_lists() {
        let items = vec![
            RenderedNode::ListItem { ordered: false, children: vec![text("a")] },
            RenderedNode::ListItem { ordered: true, children: vec![text("1")] },
        ];
        assert_eq!(to_html(&items), "<ul><li>a</li></ul><ol><li>1</li></ol>");
    }

    #[test]
    fn test_table_header_and_body() {
        let table = RenderedNode::Table {
            rows: vec![
                vec!["Model".to_string(), "Range".to_string()],
                vec!["Leaf".to_string(), "240 km".to_string()],
            ],
        };
        let html = to_html(&[table]);
        assert!(html.contains("<thead><tr><th>Model</th>"));
        assert!(html.contains("<tbody><tr><td>Leaf</td>"));
    }

    #[test]
    fn test_code_block_segments_carry_classes() {
        let block = RenderedNode::CodeBlock {
            language: Some("python".to_string()),
            segments: vec![
                CodeSegment { kind: CodeSegmentKind::Keyword, text: "def".to_string() },
                CodeSegment::plain(" f(): "),
                CodeSegment { kind: CodeSegmentKind::Comment, text: "# todo".to_string() },
            ],
        };
        let html = to_html(&[block]);
        assert!(html.contains("language-python"));
        assert!(html.contains("<span class=\"hl-keyword\">def</span>"));
        assert!(html.contains("<span class=\"hl-comment\"># todo</span>"));
    }

    #[test]
    fn test_link_attributes_escaped() {
        let link = RenderedNode::Link {
            href: "https://example.com/?a=\"b\"".to_string(),
            children: vec![text("site")],
        };
        let html = to_html(&[link]);
        assert!(html.contains("&quot;b&quot;"));
    }
}
