// SPDX-License-Identifier: MIT

//! Human- and JSON-formatted rendering of lifecycle records, shared across
//! every `cairn` subcommand that prints one.

use cairn_core::{LifecycleRecord, LifecycleState};
use clap::ValueEnum;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format a millisecond epoch timestamp as relative time ("5s", "2m", "3h", "1d").
pub fn format_time_ago(epoch_ms: u64) -> String {
    if epoch_ms == 0 {
        return "-".to_string();
    }
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let elapsed_secs = now_ms.saturating_sub(epoch_ms) / 1000;
    if elapsed_secs < 60 {
        format!("{elapsed_secs}s")
    } else if elapsed_secs < 60 * 60 {
        format!("{}m", elapsed_secs / 60)
    } else if elapsed_secs < 24 * 60 * 60 {
        format!("{}h", elapsed_secs / (60 * 60))
    } else {
        format!("{}d", elapsed_secs / (24 * 60 * 60))
    }
}

fn state_label(state: LifecycleState) -> &'static str {
    match state {
        LifecycleState::Queued => "queued",
        LifecycleState::Running => "running",
        LifecycleState::Completed => "completed",
        LifecycleState::Accepted => "accepted",
        LifecycleState::Rejected => "rejected",
    }
}

/// Print one lifecycle record, either as a short human summary or as JSON.
pub fn print_lifecycle(record: &LifecycleRecord, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "{} {} ({})",
                crate::color::header(record.agent_id.as_str()),
                crate::color::literal(state_label(record.state)),
                crate::color::muted(&format!("{} ago", format_time_ago(record.updated_at_ms)))
            );
            println!("  {}", crate::color::context(&record.task_text));
            if let Some(summary) = &record.submission_summary {
                println!("  {summary}");
            }
            if let Some(files) = &record.changed_files {
                for file in files {
                    println!("    {} {}", crate::color::muted("~"), file);
                }
            }
            if let Some(error) = &record.error {
                println!("  {}", crate::color::muted(&format!("error: {error}")));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record)?);
        }
    }
    Ok(())
}

/// Print a list of lifecycle records, either as a one-line-per-agent table
/// or as a JSON array.
pub fn print_lifecycles(records: &[LifecycleRecord], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No agents");
                return Ok(());
            }
            for record in records {
                println!(
                    "{:<40} {:<10} {:<8} {}",
                    crate::color::header(record.agent_id.as_str()),
                    crate::color::literal(state_label(record.state)),
                    crate::color::muted(&format_time_ago(record.updated_at_ms)),
                    crate::color::context(&record.task_text)
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
    }
    Ok(())
}

/// Print the agent id a `spawn` call was assigned, in text or JSON.
pub fn print_spawned(agent_id: &cairn_core::AgentId, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Spawned {}", crate::color::header(agent_id.as_str()));
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({ "agent_id": agent_id.as_str() });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
    }
    Ok(())
}
