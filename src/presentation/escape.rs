//! Entity escaping for text built into fragments outside askama templates.

/// Replace `& < > " '` with their entities. `&` goes first so entities are never doubled.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(escaped: &str) -> String {
        escaped
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#039;", "'")
            .replace("&amp;", "&")
    }

    #[test]
    fn escapes_markup() {
        insta::assert_snapshot!(
            escape_html(r#"<img src=x onerror="alert('x')"> & co"#),
            @"&lt;img src=x onerror=&quot;alert(&#039;x&#039;)&quot;&gt; &amp; co"
        );
    }

    #[test]
    fn escaped_output_has_no_raw_specials_and_round_trips() {
        let samples = [
            "",
            "plain text",
            "&amp; already escaped",
            "<<>>\"\"''&&",
            "Pump #3 'intake' <blocked> & leaking \"badly\"",
            "ünïcödé <b>bold</b>",
        ];

        for sample in samples {
            let escaped = escape_html(sample);
            assert!(!escaped.contains(['<', '>', '"', '\'']), "{escaped}");
            let stripped = escaped
                .replace("&amp;", "")
                .replace("&lt;", "")
                .replace("&gt;", "")
                .replace("&quot;", "")
                .replace("&#039;", "");
            assert!(!stripped.contains('&'), "{escaped}");
            assert_eq!(unescape(&escaped), sample);
        }
    }
}
