//! Escaping and URL scheme checks for rendered output.

/// Escape the five HTML metacharacters in literal text.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Whether a link destination may be emitted as an `href`.
///
/// Allows `http:`, `https:`, `mailto:` and scheme-less (relative) targets;
/// everything else (`javascript:`, `data:`, ...) is refused and the link
/// construct degrades to literal text.
pub(crate) fn is_safe_href(url: &str) -> bool {
    match url_scheme(url) {
        Some(scheme) => matches!(scheme.as_str(), "http" | "https" | "mailto"),
        None => true,
    }
}

/// Whether an image destination may be emitted as a `src`.
///
/// Same policy as [`is_safe_href`] minus `mailto:`.
pub(crate) fn is_safe_src(url: &str) -> bool {
    match url_scheme(url) {
        Some(scheme) => matches!(scheme.as_str(), "http" | "https"),
        None => true,
    }
}

/// Extract the URL scheme, lowercased, if the value has one.
fn url_scheme(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return None,
    }
    let colon = trimmed.find(':')?;
    let candidate = &trimmed[..colon];
    if candidate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        Some(candidate.to_ascii_lowercase())
    } else {
        None
    }
}
