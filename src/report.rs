use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORTS_DIR: &str = "reports";

pub fn render_report(
    summary: &str,
    count: usize,
    hours: u32,
    generated_at: NaiveDateTime,
) -> String {
    format!(
        "# Email Summary Report\n\
         \n\
         Generated at: **{}**\n\
         Time window: **last {hours} hours**\n\
         Unread emails considered: **{count}**\n\
         \n\
         ---\n\
         \n\
         ## AI Summary\n\
         \n\
         {summary}\n",
        generated_at.format("%Y-%m-%d %H:%M"),
    )
}

pub fn report_file_name(generated_at: NaiveDateTime) -> String {
    format!("email_summary_{}.md", generated_at.format("%Y%m%d_%H%M"))
}

/// Writes the report into `dir` (created if missing) and returns its path.
pub fn write_report(
    dir: &Path,
    summary: &str,
    count: usize,
    hours: u32,
    generated_at: NaiveDateTime,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report directory {}", dir.display()))?;

    let path = dir.join(report_file_name(generated_at));
    fs::write(&path, render_report(summary, count, hours, generated_at))
        .with_context(|| format!("failed to write report {}", path.display()))?;

    info!("wrote {} ({count} emails, {hours}h window)", path.display());
    Ok(path)
}

/// Writes the report stamped with the local time, then prints the summary.
pub fn emit_report(dir: &Path, summary: &str, count: usize, hours: u32) -> Result<PathBuf> {
    let path = write_report(dir, summary, count, hours, Local::now().naive_local())?;

    println!("✅ Summary generated: {}", path.display());
    println!("\n---\n");
    println!("{summary}");
    Ok(path)
}
