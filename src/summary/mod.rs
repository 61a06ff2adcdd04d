pub mod bedrock;
pub mod prompt;

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::BedrockConfig;
use crate::domain::email::EmailRecord;

pub use bedrock::{BedrockInvoker, ModelInvoker};
pub use prompt::build_prompt;

pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
pub const MAX_TOKENS: u32 = 1024;
pub const TEMPERATURE: f64 = 0.2;

pub const NO_UNREAD_SUMMARY: &str = "No unread emails found in the selected time window.";
pub const EMPTY_TEXT_SUMMARY: &str = "No summary generated.";
pub const NO_CONTENT_SUMMARY: &str = "Model returned no content.";

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("model invocation failed: {0:#}")]
    Invoke(anyhow::Error),

    #[error("response is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

// Claude messages envelope as accepted by Bedrock's InvokeModel.
#[derive(Serialize)]
struct InvokeRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    temperature: f64,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: [TextBlock<'a>; 1],
}

#[derive(Serialize)]
struct TextBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

impl<'a> InvokeRequest<'a> {
    fn for_prompt(prompt: &'a str) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: [UserMessage {
                role: "user",
                content: [TextBlock {
                    kind: "text",
                    text: prompt,
                }],
            }],
        }
    }
}

/// JSON request body for `prompt`.
pub fn request_body(prompt: &str) -> Result<Vec<u8>, SummaryError> {
    serde_json::to_vec(&InvokeRequest::for_prompt(prompt)).map_err(SummaryError::Encode)
}

/// Summarizes `emails` with the configured model.
///
/// An empty list never reaches the model. Any failure comes back as
/// `SummaryError`; pair it with [`fallback_summary`] to keep the run going.
pub fn summarize<M>(
    invoker: &M,
    cfg: &BedrockConfig,
    emails: &[EmailRecord],
) -> Result<String, SummaryError>
where
    M: ModelInvoker + ?Sized,
{
    if emails.is_empty() {
        return Ok(NO_UNREAD_SUMMARY.to_string());
    }

    let prompt = build_prompt(emails);
    let body = request_body(&prompt)?;
    debug!(
        "invoking {} in {} ({} emails, {} byte request)",
        cfg.model_id,
        cfg.region,
        emails.len(),
        body.len()
    );

    let raw = invoker
        .invoke(&cfg.model_id, body)
        .map_err(SummaryError::Invoke)?;
    extract_summary(&raw)
}

/// Pulls the first text block out of a Claude response body.
pub fn extract_summary(raw: &[u8]) -> Result<String, SummaryError> {
    let resp: Value = serde_json::from_slice(raw).map_err(SummaryError::Decode)?;

    let first = match resp.get("content").and_then(Value::as_array) {
        Some(blocks) if !blocks.is_empty() => &blocks[0],
        _ => return Ok(NO_CONTENT_SUMMARY.to_string()),
    };
    let block = first
        .as_object()
        .ok_or_else(|| SummaryError::Malformed("first content block is not an object".into()))?;

    let text = block.get("text").and_then(Value::as_str).unwrap_or("").trim();
    if text.is_empty() {
        Ok(EMPTY_TEXT_SUMMARY.to_string())
    } else {
        Ok(text.to_string())
    }
}

/// Subject-only summary used when the model call failed.
pub fn fallback_summary(err: &SummaryError, emails: &[EmailRecord]) -> String {
    let mut lines = vec![
        "⚠️ Bedrock call failed, falling back to a simple subject-only summary.".to_string(),
        format!("Error: {err}"),
        String::new(),
        "Unread emails:".to_string(),
    ];
    for em in emails {
        lines.push(format!("- {} — {}", em.subject(), em.sender()));
    }
    lines.join("\n")
}

/// Summary text for one run.
///
/// `connect` builds the model client and is only called when there is mail
/// to summarize. A failed model call degrades to [`fallback_summary`]; only a
/// failure to build the client is returned as an error.
pub fn summarize_unread<M, F>(
    connect: F,
    cfg: &BedrockConfig,
    emails: &[EmailRecord],
) -> anyhow::Result<String>
where
    M: ModelInvoker,
    F: FnOnce(&BedrockConfig) -> anyhow::Result<M>,
{
    if emails.is_empty() {
        return Ok(NO_UNREAD_SUMMARY.to_string());
    }

    let invoker = connect(cfg)?;
    Ok(summarize(&invoker, cfg, emails).unwrap_or_else(|err| {
        warn!("summarization failed, using fallback: {err}");
        fallback_summary(&err, emails)
    }))
}
