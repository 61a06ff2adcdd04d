use crate::domain::email::EmailRecord;

pub const NO_EMAILS_PROMPT: &str = "There are no unread emails.";

const INSTRUCTIONS: &[&str] = &[
    "You are an assistant that summarizes unread emails for a busy developer.",
    "",
    "Summarize the following emails into:",
    "1) A short overview (3–5 bullet points).",
    "2) A list of concrete action items with owners and due dates if mentioned.",
    "3) A quick priority ranking: HIGH / MEDIUM / LOW buckets.",
    "",
    "Emails:",
];

/// Renders the instruction text sent to the model, one block per email in
/// fetch order.
pub fn build_prompt(emails: &[EmailRecord]) -> String {
    if emails.is_empty() {
        return NO_EMAILS_PROMPT.to_string();
    }

    let mut lines: Vec<String> = INSTRUCTIONS.iter().map(|l| l.to_string()).collect();
    for (idx, em) in emails.iter().enumerate() {
        lines.push(format!("\nEmail #{}", idx + 1));
        lines.push(format!("From: {}", em.sender()));
        lines.push(format!("Date: {}", em.date()));
        lines.push(format!("Subject: {}", em.subject()));
        lines.push(format!("Snippet: {}", em.snippet()));
    }
    lines.join("\n")
}
