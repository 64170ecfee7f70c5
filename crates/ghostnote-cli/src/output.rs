//! Output formatting for client commands.
//!
//! Pretty mode (stdout is a terminal) prints labelled fields and a bordered
//! table; plain mode prints `key=value` lines for scripts.

use std::io::IsTerminal;

use chrono::{DateTime, SecondsFormat, Utc};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use ghostnote_core::{CreatedNote, NoteMetadata, StatsSnapshot};
use serde::Serialize;

use crate::protocol::RevealedBody;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Pretty,
    Plain,
}

impl Mode {
    pub fn detect() -> Self {
        if std::io::stdout().is_terminal() {
            Mode::Pretty
        } else {
            Mode::Plain
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn kv(mode: Mode, key: &str, value: &str) -> String {
    match mode {
        Mode::Pretty => format!("{}: {}", key, value),
        Mode::Plain => format!("{}={}", key.to_lowercase().replace(' ', "_"), value),
    }
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub fn created_lines(mode: Mode, note: &CreatedNote) -> Vec<String> {
    vec![
        kv(mode, "ID", &note.id),
        kv(mode, "Expires", &timestamp(&note.expires_at)),
        kv(mode, "TTL hours", &note.ttl_hours.to_string()),
        kv(mode, "Password", yes_no(note.has_password)),
    ]
}

pub fn metadata_lines(mode: Mode, metadata: &NoteMetadata) -> Vec<String> {
    vec![
        kv(mode, "ID", &metadata.id),
        kv(mode, "Created", &timestamp(&metadata.created_at)),
        kv(mode, "Expires", &timestamp(&metadata.expires_at)),
        kv(mode, "Time remaining", &metadata.time_remaining_label()),
        kv(mode, "Password", yes_no(metadata.has_password)),
    ]
}

/// Details printed to stderr after a reveal so stdout carries only content.
pub fn revealed_lines(mode: Mode, body: &RevealedBody) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(preview) = &body.preview {
        lines.push(kv(mode, "Preview", preview));
    }
    lines.push(kv(mode, "Destroyed", &timestamp(&body.destroyed_at)));
    lines.push(kv(mode, "Was due to expire", &timestamp(&body.expires_at)));
    lines
}

pub fn stats_table(mode: Mode, stats: &StatsSnapshot) -> String {
    let rows = [
        ("Total notes", stats.total_notes),
        ("Total views", stats.total_views),
        ("Active notes", stats.active_notes),
        ("Expired notes", stats.expired_notes),
        ("Cancelled notes", stats.cancelled_notes),
    ];

    match mode {
        Mode::Pretty => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Counter", "Value"]);
            for (label, value) in rows {
                table.add_row(vec![label.to_string(), value.to_string()]);
            }
            table.to_string()
        }
        Mode::Plain => rows
            .iter()
            .map(|(label, value)| kv(mode, label, &value.to_string()))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_kv() {
        assert_eq!(kv(Mode::Plain, "Time remaining", "1h 0m"), "time_remaining=1h 0m");
        assert_eq!(kv(Mode::Pretty, "ID", "abc"), "ID: abc");
    }

    #[test]
    fn test_plain_stats() {
        let stats = StatsSnapshot {
            total_notes: 3,
            total_views: 1,
            active_notes: 1,
            expired_notes: 1,
            cancelled_notes: 0,
        };
        let output = stats_table(Mode::Plain, &stats);
        assert!(output.contains("total_notes=3"));
        assert!(output.contains("cancelled_notes=0"));

        let pretty = stats_table(Mode::Pretty, &stats);
        assert!(pretty.contains("Active notes"));
    }
}
