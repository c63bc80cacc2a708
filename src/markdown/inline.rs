//! Inline rules, applied in strict precedence.
//!
//! At each marker position the longest form wins: `***x***` before `**x**`
//! before `*x*`, then `~~x~~`, then `` `x` ``, then `![alt](src)`, then
//! `[text](href)`. A marker with no closing counterpart is literal text;
//! this parser cannot fail.

use super::escape::{is_safe_href, is_safe_src};
use super::node::RenderedNode;

/// Parse one line (or cell of inline context) into nodes.
pub(crate) fn parse_inline(text: &str) -> Vec<RenderedNode> {
    let bytes = text.as_bytes();
    let mut nodes: Vec<RenderedNode> = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let rest = &text[pos..];
        let matched = match bytes[pos] {
            b'*' => match_emphasis(rest),
            b'~' => match_strikethrough(rest),
            b'`' => match_inline_code(rest),
            b'!' => match_image(rest),
            b'[' => match_link(rest),
            _ => None,
        };

        match matched {
            Some((node, consumed)) => {
                flush_literal(&mut literal, &mut nodes);
                nodes.push(node);
                pos += consumed;
            }
            None => {
                // Walk one full character, not one byte
                let ch = rest.chars().next().unwrap_or('\u{fffd}');
                literal.push(ch);
                pos += ch.len_utf8();
            }
        }
    }

    flush_literal(&mut literal, &mut nodes);
    nodes
}

fn flush_literal(literal: &mut String, nodes: &mut Vec<RenderedNode>) {
    if !literal.is_empty() {
        nodes.push(RenderedNode::Text {
            text: std::mem::take(literal),
        });
    }
}

/// `***x***`, `**x**`, or `*x*`, longest marker first.
fn match_emphasis(rest: &str) -> Option<(RenderedNode, usize)> {
    for (marker, triple) in [("***", true), ("**", false), ("*", false)] {
        if let Some(inner) = delimited(rest, marker) {
            let consumed = marker.len() * 2 + inner.len();
            let node = if triple {
                RenderedNode::Bold {
                    children: vec![RenderedNode::Italic {
                        children: parse_inline(inner),
                    }],
                }
            } else if marker == "**" {
                RenderedNode::Bold {
                    children: parse_inline(inner),
                }
            } else {
                RenderedNode::Italic {
                    children: parse_inline(inner),
                }
            };
            return Some((node, consumed));
        }
    }
    None
}

fn match_strikethrough(rest: &str) -> Option<(RenderedNode, usize)> {
    let inner = delimited(rest, "~~")?;
    Some((
        RenderedNode::Strikethrough {
            children: parse_inline(inner),
        },
        4 + inner.len(),
    ))
}

/// Inline code: contents are taken verbatim, never re-parsed.
fn match_inline_code(rest: &str) -> Option<(RenderedNode, usize)> {
    let inner = delimited(rest, "`")?;
    Some((
        RenderedNode::InlineCode {
            code: inner.to_string(),
        },
        2 + inner.len(),
    ))
}

fn match_image(rest: &str) -> Option<(RenderedNode, usize)> {
    let after_bang = rest.strip_prefix('!')?;
    let (alt, src, consumed) = bracket_pair(after_bang)?;
    if !is_safe_src(src) {
        // Unsafe destination: the whole construct stays literal
        return Some((
            RenderedNode::Text {
                text: rest[..1 + consumed].to_string(),
            },
            1 + consumed,
        ));
    }
    Some((
        RenderedNode::Image {
            src: src.trim().to_string(),
            alt: alt.to_string(),
        },
        1 + consumed,
    ))
}

fn match_link(rest: &str) -> Option<(RenderedNode, usize)> {
    let (label, href, consumed) = bracket_pair(rest)?;
    if !is_safe_href(href) {
        return Some((
            RenderedNode::Text {
                text: rest[..consumed].to_string(),
            },
            consumed,
        ));
    }
    Some((
        RenderedNode::Link {
            href: href.trim().to_string(),
            children: parse_inline(label),
        },
        consumed,
    ))
}

/// Find `marker…marker` at the start of `rest`; the inner text must be
/// non-empty and not itself begin with the marker character.
fn delimited<'a>(rest: &'a str, marker: &str) -> Option<&'a str> {
    let after = rest.strip_prefix(marker)?;
    let close = after.find(marker)?;
    if close == 0 {
        return None;
    }
    Some(&after[..close])
}

/// Parse `[label](target)` at the start of `rest`.
///
/// Returns (label, target, bytes consumed). Nested brackets are not
/// supported; the first `]` closes the label.
fn bracket_pair(rest: &str) -> Option<(&str, &str, usize)> {
    let after_open = rest.strip_prefix('[')?;
    let close_bracket = after_open.find(']')?;
    let label = &after_open[..close_bracket];
    let after_label = &after_open[close_bracket + 1..];
    let after_paren = after_label.strip_prefix('(')?;
    let close_paren = after_paren.find(')')?;
    let target = &after_paren[..close_paren];
    // [ + label + ]( + target + )
    let consumed = 1 + close_bracket + 2 + close_paren + 1;
    Some((label, target, consumed))
}
