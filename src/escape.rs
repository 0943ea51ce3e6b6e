//! HTML entity escaping for untrusted form text.

/// Escape the five HTML-significant characters as entity references.
///
/// Applied to every free-text field before it is interpolated into a
/// generated HTML email body. Single pass, so entities in the input are
/// themselves escaped rather than interpreted.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
