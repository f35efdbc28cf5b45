//! Change event storage

use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use crate::types::ChangeEvent;

pub fn events_file(output_dir: &Path) -> PathBuf {
    output_dir
        .join("events")
        .join(format!("events_{}.jsonl", Utc::now().format("%Y-%m-%d")))
}

/// Appends events, one JSON object per line, to today's events file.
pub fn save_change_events(output_dir: &Path, events: &[ChangeEvent]) -> Result<()> {
    if events.is_empty() {
        return Ok(());
    }

    let filename = events_file(output_dir);
    if let Some(parent) = filename.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    for event in events {
        writeln!(file, "{}", serde_json::to_string(event)?)?;

        info!(
            event_id = %event.id,
            monitor_type = %event.monitor_type,
            entity = ?event.entity_id,
            "Saved change event"
        );
    }

    Ok(())
}
