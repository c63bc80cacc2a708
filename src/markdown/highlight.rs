//! Best-effort code-block highlighting.
//!
//! Classifies keywords, string/number literals, and comments for the
//! handful of languages the platform's authors actually post
//! (`javascript`, `typescript`, `python`, `json`). Anything else renders
//! as one plain segment; this pass can annotate but never fail.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use super::node::{CodeSegment, CodeSegmentKind};

static JS_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "function", "const", "let", "var", "return", "if", "else", "for", "while", "do",
        "switch", "case", "break", "continue", "class", "new", "delete", "import", "export",
        "from", "default", "async", "await", "try", "catch", "finally", "throw", "typeof",
        "instanceof", "this", "null", "undefined", "true", "false", "of", "in", "yield",
    ]
    .into_iter()
    .collect()
});

static TS_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    JS_KEYWORDS
        .iter()
        .copied()
        .chain([
            "interface", "type", "enum", "implements", "extends", "readonly", "public",
            "private", "protected", "abstract", "namespace", "declare", "as", "satisfies",
        ])
        .collect()
});

static PYTHON_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "def", "return", "if", "elif", "else", "for", "while", "break", "continue", "class",
        "import", "from", "as", "with", "try", "except", "finally", "raise", "lambda",
        "pass", "yield", "async", "await", "global", "nonlocal", "del", "not", "and", "or",
        "in", "is", "None", "True", "False", "assert", "match", "case",
    ]
    .into_iter()
    .collect()
});

static JSON_LITERALS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["true", "false", "null"].into_iter().collect());

/// Which comment markers a language uses.
#[derive(Clone, Copy)]
struct CommentSyntax {
    line: Option<&'static str>,
    block: Option<(&'static str, &'static str)>,
}

/// Highlight `code` according to its declared language tag.
///
/// Unrecognized or absent tags return the whole body as one plain segment.
pub(crate) fn highlight(language: Option<&str>, code: &str) -> Vec<CodeSegment> {
    let (keywords, comments) = match language {
        Some("javascript") | Some("js") => (
            &*JS_KEYWORDS,
            CommentSyntax { line: Some("//"), block: Some(("/*", "*/")) },
        ),
        Some("typescript") | Some("ts") => (
            &*TS_KEYWORDS,
            CommentSyntax { line: Some("//"), block: Some(("/*", "*/")) },
        ),
        Some("python") | Some("py") => (
            &*PYTHON_KEYWORDS,
            CommentSyntax { line: Some("#"), block: None },
        ),
        Some("json") => (
            &*JSON_LITERALS,
            CommentSyntax { line: None, block: None },
        ),
        _ => {
            if code.is_empty() {
                return Vec::new();
            }
            return vec![CodeSegment::plain(code)];
        }
    };

    // JSON "keywords" are literals, not keywords
    let keyword_kind = if language == Some("json") {
        CodeSegmentKind::Literal
    } else {
        CodeSegmentKind::Keyword
    };

    let mut segments: Vec<CodeSegment> = Vec::new();
    let mut plain = String::new();
    let bytes = code.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let rest = &code[pos..];

        if let Some(line_marker) = comments.line {
            if rest.starts_with(line_marker) {
                let end = rest.find('\n').unwrap_or(rest.len());
                push_segment(&mut segments, &mut plain, CodeSegmentKind::Comment, &rest[..end]);
                pos += end;
                continue;
            }
        }

        if let Some((open, close)) = comments.block {
            if rest.starts_with(open) {
                let end = rest[open.len()..]
                    .find(close)
                    .map(|i| open.len() + i + close.len())
                    .unwrap_or(rest.len());
                push_segment(&mut segments, &mut plain, CodeSegmentKind::Comment, &rest[..end]);
                pos += end;
                continue;
            }
        }

        let ch = rest.chars().next().unwrap_or('\u{fffd}');

        if ch == '"' || ch == '\'' || ch == '`' {
            let end = string_end(rest, ch);
            push_segment(&mut segments, &mut plain, CodeSegmentKind::Literal, &rest[..end]);
            pos += end;
            continue;
        }

        if ch.is_ascii_digit() {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '_'))
                .unwrap_or(rest.len());
            push_segment(&mut segments, &mut plain, CodeSegmentKind::Literal, &rest[..end]);
            pos += end;
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let word = &rest[..end];
            if keywords.contains(word) {
                push_segment(&mut segments, &mut plain, keyword_kind, word);
            } else {
                plain.push_str(word);
            }
            pos += end;
            continue;
        }

        plain.push(ch);
        pos += ch.len_utf8();
    }

    flush_plain(&mut segments, &mut plain);
    segments
}

/// Byte offset one past the closing quote, honoring backslash escapes.
/// An unterminated string runs to the end of the body.
fn string_end(rest: &str, quote: char) -> usize {
    let mut escaped = false;
    for (idx, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return idx + c.len_utf8();
        }
    }
    rest.len()
}

fn push_segment(segments: &mut Vec<CodeSegment>, plain: &mut String, kind: CodeSegmentKind, text: &str) {
    flush_plain(segments, plain);
    segments.push(CodeSegment {
        kind,
        text: text.to_string(),
    });
}

fn flush_plain(segments: &mut Vec<CodeSegment>, plain: &mut String) {
    if !plain.is_empty() {
        segments.push(CodeSegment::plain(std::mem::take(plain)));
    }
}
