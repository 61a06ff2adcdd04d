use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use email_summarizer::config::load_config;
use email_summarizer::mail::fetch_unread_since;
use email_summarizer::report::{REPORTS_DIR, emit_report};
use email_summarizer::summary::{BedrockInvoker, summarize_unread};

#[derive(Parser)]
#[command(name = "email-summarizer")]
#[command(about = "Summarize unread emails using Amazon Bedrock (Claude).", long_about = None)]
struct Cli {
    /// Look back this many hours for unread emails (default from env or 24; 0 means default)
    #[arg(long)]
    hours: Option<u32>,
}

/// `--hours` wins unless it is absent or 0.
fn resolve_hours(flag: Option<u32>, configured: u32) -> u32 {
    flag.filter(|h| *h > 0).unwrap_or(configured)
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = load_config().context("Configuration error")?;
    let since_hours = resolve_hours(cli.hours, cfg.summary_since_hours);

    println!("🔍 Fetching unread emails from last {since_hours} hours...");
    let emails = fetch_unread_since(&cfg.email, since_hours)?;
    println!("📨 Found {} unread email(s).", emails.len());

    let summary = summarize_unread(|b| BedrockInvoker::new(&b.region), &cfg.bedrock, &emails)?;

    emit_report(Path::new(REPORTS_DIR), &summary, emails.len(), since_hours)?;
    Ok(())
}
