use mailparse::{MailHeader, MailHeaderMap};

pub const SNIPPET_MAX_CHARS: usize = 300;
pub const ELLIPSIS: &str = "...";

/// First header named `name`, decoded with [`decode_header_words`].
pub fn header_text(headers: &[MailHeader], name: &str) -> String {
    headers
        .get_first_header(name)
        .map(|h| decode_header_words(&String::from_utf8_lossy(h.get_value_raw())))
        .unwrap_or_default()
}

/// Decodes every RFC 2047 encoded-word in a raw header value and joins the
/// decoded pieces and the surrounding plain text with single spaces.
///
/// Words in an unknown charset are kept verbatim.
pub fn decode_header_words(raw: &str) -> String {
    let unfolded = raw.replace("\r\n", "").replace('\n', "");

    let mut parts: Vec<String> = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;
    while let Some(off) = unfolded[pos..].find("=?") {
        let start = pos + off;
        match encoded_word_len(&unfolded[start..]) {
            Some(len) => {
                push_plain(&mut parts, &unfolded[plain_start..start]);
                parts.push(decode_mime_word(&unfolded[start..start + len]));
                pos = start + len;
                plain_start = pos;
            }
            None => pos = start + 2,
        }
    }
    push_plain(&mut parts, &unfolded[plain_start..]);

    parts.join(" ")
}

fn push_plain(parts: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        parts.push(text.to_string());
    }
}

// Length of the `=?charset?q|b?text?=` token at the start of `s`, if any.
fn encoded_word_len(s: &str) -> Option<usize> {
    let rest = s.strip_prefix("=?")?;
    let charset_end = rest.find('?')?;
    let charset = &rest[..charset_end];
    if charset.is_empty() || charset.contains(char::is_whitespace) {
        return None;
    }

    let after = &rest[charset_end + 1..];
    let mut chars = after.chars();
    if !matches!(chars.next()?, 'q' | 'Q' | 'b' | 'B') || chars.next()? != '?' {
        return None;
    }

    let text = &after[2..];
    let text_end = text.find("?=")?;
    if text[..text_end].contains(char::is_whitespace) {
        return None;
    }
    Some(2 + charset_end + 1 + 2 + text_end + 2)
}

fn decode_mime_word(word: &str) -> String {
    // mailparse expects a full "Key: value" header line
    let line = format!("X: {word}\r\n");
    match mailparse::parse_header(line.as_bytes()) {
        Ok((h, _idx)) => h.get_value(),
        Err(_) => word.to_string(),
    }
}

/// Flattens a body to one line and caps it at `SNIPPET_MAX_CHARS` characters,
/// ending in `...` when cut.
pub fn normalize_snippet(body: &str) -> String {
    let mut flat = String::with_capacity(body.len());
    let mut in_break = false;
    for ch in body.trim().chars() {
        if ch == '\r' || ch == '\n' {
            if !in_break {
                flat.push(' ');
                in_break = true;
            }
        } else {
            flat.push(ch);
            in_break = false;
        }
    }

    if flat.chars().count() <= SNIPPET_MAX_CHARS {
        return flat;
    }
    let mut cut: String = flat
        .chars()
        .take(SNIPPET_MAX_CHARS - ELLIPSIS.len())
        .collect();
    cut.push_str(ELLIPSIS);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_become_single_spaces() {
        assert_eq!(
            normalize_snippet("  Hi team,\r\n\r\nStandup moved\nto 10.\r\n"),
            "Hi team, Standup moved to 10."
        );
    }

    #[test]
    fn short_bodies_are_untouched() {
        let body = "x".repeat(SNIPPET_MAX_CHARS);
        assert_eq!(normalize_snippet(&body), body);
    }

    #[test]
    fn long_bodies_are_cut_with_ellipsis() {
        let body = "y".repeat(SNIPPET_MAX_CHARS + 1);
        let snippet = normalize_snippet(&body);
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS);
        assert!(snippet.ends_with(ELLIPSIS));
        assert!(snippet.starts_with(&"y".repeat(SNIPPET_MAX_CHARS - 3)));
    }

    #[test]
    fn length_is_counted_in_characters() {
        // 300 multi-byte characters must not be cut.
        let body = "é".repeat(SNIPPET_MAX_CHARS);
        assert_eq!(normalize_snippet(&body), body);

        let body = "日本".repeat(200);
        let snippet = normalize_snippet(&body);
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS);
        assert!(snippet.ends_with(ELLIPSIS));
    }

    #[test]
    fn encoded_headers_are_decoded() {
        let raw = concat!(
            "Subject: =?utf-8?q?R=C3=A9union_de_lundi?=\r\n",
            "From: =?iso-8859-1?q?J=F6rg?= <jorg@example.com>\r\n",
            "\r\n",
            "body\r\n",
        );
        let parsed = mailparse::parse_mail(raw.as_bytes()).unwrap();
        assert_eq!(header_text(&parsed.headers, "Subject"), "Réunion de lundi");
        assert_eq!(
            header_text(&parsed.headers, "From"),
            "Jörg <jorg@example.com>"
        );
        assert_eq!(header_text(&parsed.headers, "Date"), "");
    }

    #[test]
    fn adjacent_encoded_words_are_space_separated() {
        assert_eq!(
            decode_header_words("=?utf-8?q?Hello?= =?iso-8859-1?q?J=F6rg?="),
            "Hello Jörg"
        );
        assert_eq!(
            decode_header_words("Re: =?utf-8?b?Q2Fmw6k=?=\r\n =?utf-8?q?ce_soir?="),
            "Re: Café ce soir"
        );
    }

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(decode_header_words("  Weekly sync  "), "Weekly sync");
        assert_eq!(decode_header_words("cost =?5 dollars"), "cost =?5 dollars");
        assert_eq!(decode_header_words(""), "");
    }

    #[test]
    fn unknown_charset_word_is_kept() {
        assert_eq!(decode_header_words("=?x-bogus?q?abc?="), "=?x-bogus?q?abc?=");
        assert_eq!(
            decode_header_words("=?x-bogus?q?abc?= =?utf-8?q?ok?="),
            "=?x-bogus?q?abc?= ok"
        );
    }
}
