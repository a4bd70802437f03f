//! Small HTML helpers for descriptions and outgoing e-mail.

/// Remove every `<...>` tag from `input`, keeping the text between tags.
///
/// A `<` with no closing `>` after it is kept as text.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('<') {
        match rest[start..].find('>') {
            Some(len) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + len + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Tag-stripped description for listings; absent descriptions become `""`.
pub fn strip_description(description: Option<&str>) -> String {
    description.map(strip_tags).unwrap_or_default()
}

/// Escape text for interpolation into HTML element content or a quoted
/// attribute value.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("<p>Market <b>size</b> grew</p>"),
            "Market size grew"
        );
        assert_eq!(strip_tags("a < b"), "a < b");
        assert_eq!(strip_tags("<br/>"), "");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn test_absent_description_is_empty() {
        assert_eq!(strip_description(None), "");
        assert_eq!(strip_description(Some("<i>x</i>")), "x");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }
}
