//! Escaping helpers shared by the admin pages and the reply email template.

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escapes and turns newlines into `<br>`.
pub(crate) fn linebreaks(raw: &str) -> String {
    escape_html(raw).replace("\r\n", "\n").replace('\n', "<br>")
}
