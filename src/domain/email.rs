pub const NO_SUBJECT: &str = "(no subject)";
pub const UNKNOWN_SENDER: &str = "(unknown sender)";
pub const NO_PREVIEW: &str = "(no preview available)";

/// One unread message, normalized for the prompt.
///
/// Subject, sender and snippet are never empty: a placeholder stands in for
/// missing values. `date` is the raw `Date:` header text and may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRecord {
    subject: String,
    sender: String,
    date: String,
    snippet: String,
}

impl EmailRecord {
    pub fn new(
        subject: impl Into<String>,
        sender: impl Into<String>,
        date: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            subject: or_placeholder(subject.into(), NO_SUBJECT),
            sender: or_placeholder(sender.into(), UNKNOWN_SENDER),
            date: date.into().trim().to_string(),
            snippet: or_placeholder(snippet.into(), NO_PREVIEW),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }
}

fn or_placeholder(value: String, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_get_placeholders() {
        let rec = EmailRecord::new("", "  ", "", "\r\n");
        assert_eq!(rec.subject(), NO_SUBJECT);
        assert_eq!(rec.sender(), UNKNOWN_SENDER);
        assert_eq!(rec.snippet(), NO_PREVIEW);
        assert_eq!(rec.date(), "");
    }

    #[test]
    fn real_values_are_kept() {
        let rec = EmailRecord::new(
            "Invoice Due",
            "Billing <billing@example.com>",
            "Mon, 8 Dec 2025 09:00:00 +0000",
            "Please pay by Friday.",
        );
        assert_eq!(rec.subject(), "Invoice Due");
        assert_eq!(rec.sender(), "Billing <billing@example.com>");
        assert_eq!(rec.date(), "Mon, 8 Dec 2025 09:00:00 +0000");
        assert_eq!(rec.snippet(), "Please pay by Friday.");
    }
}
