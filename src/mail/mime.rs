use mailparse::ParsedMail;

/// A MIME tree node detached from the parser's own types.
///
/// `body` is the decoded text of `text/*` leaves. It is `None` for container
/// parts, non-text leaves, and text leaves whose payload could not be decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePart {
    pub content_type: String,
    pub body: Option<String>,
    pub children: Vec<MessagePart>,
}

impl MessagePart {
    pub fn leaf(content_type: &str, body: impl Into<String>) -> Self {
        Self {
            content_type: content_type.to_ascii_lowercase(),
            body: Some(body.into()),
            children: Vec::new(),
        }
    }

    pub fn container(content_type: &str, children: Vec<MessagePart>) -> Self {
        Self {
            content_type: content_type.to_ascii_lowercase(),
            body: None,
            children,
        }
    }

    pub fn from_parsed(parsed: &ParsedMail) -> Self {
        let content_type = parsed.ctype.mimetype.to_ascii_lowercase();

        if !parsed.subparts.is_empty() {
            let children = parsed.subparts.iter().map(Self::from_parsed).collect();
            return Self::container(&content_type, children);
        }

        let body = if content_type.starts_with("text/") {
            match parsed.get_body() {
                Ok(text) => Some(text),
                Err(e) => {
                    log::debug!("could not decode {content_type} part: {e}");
                    None
                }
            }
        } else {
            None
        };

        Self {
            content_type,
            body,
            children: Vec::new(),
        }
    }

    /// Depth-first, document-order search for the first decodable
    /// `text/plain` part (the part itself included).
    pub fn first_plain_text(&self) -> Option<&str> {
        let mut stack = vec![self];
        while let Some(part) = stack.pop() {
            if part.content_type == "text/plain"
                && let Some(body) = part.body.as_deref()
            {
                return Some(body);
            }
            stack.extend(part.children.iter().rev());
        }
        None
    }
}
