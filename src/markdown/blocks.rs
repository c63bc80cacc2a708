//! Stage 1 of the pipeline: block extraction.
//!
//! Fenced code blocks and tables are pulled out of the input before any
//! other stage runs and replaced with opaque placeholders, so the inline
//! rules can never rewrite their contents. Placeholders are NUL-delimited
//! indices; NUL bytes in the input are stripped first so a placeholder can
//! never be forged from user text.

use once_cell::sync::Lazy;
use regex::Regex;

/// A block lifted out of the text during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExtractedBlock {
    /// Fenced code block with its optional language tag
    Code {
        language: Option<String>,
        body: String,
    },
    /// Table rows (header first; the separator row is consumed)
    Table { rows: Vec<Vec<String>> },
}

/// Matches a table separator row: `|----|:---:|` and friends.
static TABLE_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\|?\s*:?-{3,}:?\s*(\|\s*:?-{3,}:?\s*)*\|?\s*$").expect("invalid table separator pattern")
});

/// Matches a placeholder line produced by [`extract`].
pub(crate) static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new("^\u{0}(\\d+)\u{0}$").expect("invalid placeholder pattern"));

fn placeholder_for(index: usize) -> String {
    format!("\u{0}{index}\u{0}")
}

/// Pull fenced code blocks and tables out of `raw`.
///
/// Returns the text with each extracted block replaced by a placeholder on
/// its own line, plus the blocks in placeholder order. Unterminated fences
/// run to the end of input rather than failing.
pub(crate) fn extract(raw: &str) -> (String, Vec<ExtractedBlock>) {
    let cleaned: String = raw.chars().filter(|&c| c != '\u{0}').collect();
    let lines: Vec<&str> = cleaned.lines().collect();

    let mut out_lines: Vec<String> = Vec::with_capacity(lines.len());
    let mut blocks: Vec<ExtractedBlock> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();

        if let Some(rest) = trimmed.strip_prefix("```") {
            let language = {
                let tag = rest.trim();
                if tag.is_empty() {
                    None
                } else {
                    Some(tag.to_ascii_lowercase())
                }
            };
            let mut body_lines: Vec<&str> = Vec::new();
            i += 1;
            while i < lines.len() && lines[i].trim() != "```" {
                body_lines.push(lines[i]);
                i += 1;
            }
            // Skip the closing fence when present
            if i < lines.len() {
                i += 1;
            }
            out_lines.push(placeholder_for(blocks.len()));
            blocks.push(ExtractedBlock::Code {
                language,
                body: body_lines.join("\n"),
            });
            continue;
        }

        if is_table_header(line) && i + 1 < lines.len() && TABLE_SEPARATOR.is_match(lines[i + 1]) {
            let mut rows = vec![split_row(line)];
            i += 2;
            while i < lines.len() && lines[i].contains('|') && !lines[i].trim().is_empty() {
                rows.push(split_row(lines[i]));
                i += 1;
            }
            out_lines.push(placeholder_for(blocks.len()));
            blocks.push(ExtractedBlock::Table { rows });
            continue;
        }

        out_lines.push(line.to_string());
        i += 1;
    }

    (out_lines.join("\n"), blocks)
}

/// A header row needs at least one pipe and some cell content.
fn is_table_header(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('|') && !trimmed.chars().all(|c| matches!(c, '|' | ' ' | '-' | ':'))
}

/// Split a table row into trimmed cells, dropping the empty edges produced
/// by leading/trailing pipes.
fn split_row(line: &str) -> Vec<String> {
    let mut cells: Vec<&str> = line.split('|').map(str::trim).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells.into_iter().map(str::to_string).collect()
}
