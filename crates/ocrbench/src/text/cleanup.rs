//! Normalization of reader output.

/// Drop every character that is not printable ASCII and trim the result.
///
/// Tabs count as whitespace and are kept inside the line; other control
/// characters and all non-ASCII characters are removed.
pub fn cleanup_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Split raw reader output into cleaned, non-empty lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(cleanup_text).filter(|line| !line.is_empty()).collect()
}

/// Clean every line a reader produced, dropping the ones left empty.
///
/// Lines that still contain line breaks are split further, so the result always
/// holds one visual line per element.
pub fn normalize_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines.into_iter().flat_map(|line| split_lines(line.as_ref())).collect()
}
