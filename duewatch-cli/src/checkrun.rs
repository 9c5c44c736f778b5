//! One reminder pass: roster → per-project Gantt → grouped notifications.
//!
//! Failure isolation: a bad roster row or a broken project spreadsheet
//! produces one operator diagnostic and the loop moves on. Only an
//! unreadable roster aborts the pass. Recipients never see error text.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use duewatch_core::{ProjectEntry, TopicRegistry, extract_deadlines, group_by_area, render};
use tracing::{info, warn};

use crate::config::Config;
use crate::sheets_api::{RenderOption, SheetsClient};
use crate::telegram::TelegramClient;

pub async fn check_deadlines(
    cfg: &Config,
    sheets: &SheetsClient,
    telegram: &TelegramClient,
    registry: &TopicRegistry,
    today: NaiveDate,
) -> Result<()> {
    let roster = match sheets
        .fetch_range(
            &cfg.roster_spreadsheet_id,
            &cfg.roster_range,
            RenderOption::Formatted,
        )
        .await
    {
        Ok(rows) => rows,
        Err(err) => {
            telegram
                .report_error(cfg.error_chat_id, "⚠️ Could not read the project roster.")
                .await;
            return Err(err.context("reading project roster"));
        }
    };

    info!(projects = roster.len(), %today, "starting reminder pass");

    let first_row = cfg.roster_first_row();
    for (idx, row) in roster.iter().enumerate() {
        // Label entries with the actual sheet row for diagnostics.
        let entry = match ProjectEntry::from_row(first_row + idx, row) {
            Ok(Some(entry)) => entry,
            Ok(None) => continue,
            Err(err) => {
                warn!(row = first_row + idx, %err, "invalid roster row");
                telegram
                    .report_error(cfg.error_chat_id, &format!("⚠️ {err}"))
                    .await;
                continue;
            }
        };

        if let Err(err) = process_project(cfg, sheets, telegram, registry, &entry, today).await {
            warn!(project = %entry.name, row = entry.row, %err, "project pass failed");
            telegram
                .report_error(
                    cfg.error_chat_id,
                    &format!("⚠️ Project '{}' (roster row {}): {err:#}", entry.name, entry.row),
                )
                .await;
        }
    }

    Ok(())
}

async fn process_project(
    cfg: &Config,
    sheets: &SheetsClient,
    telegram: &TelegramClient,
    registry: &TopicRegistry,
    entry: &ProjectEntry,
    today: NaiveDate,
) -> Result<()> {
    let start_date = sheets
        .read_start_date(
            &entry.spreadsheet_key,
            &cfg.worksheet,
            &cfg.start_date_cell,
            today,
        )
        .await;

    let rows = sheets
        .fetch_range(
            &entry.spreadsheet_key,
            &cfg.gantt_range(),
            RenderOption::Unformatted,
        )
        .await
        .context("fetching gantt block")?;

    let records = extract_deadlines(&rows, start_date);
    let grouped = group_by_area(&records, today, &entry.custom_offsets);

    info!(
        project = %entry.name,
        services = records.len(),
        areas_due = grouped.len(),
        "project scanned"
    );

    for digest in &grouped {
        let text = render(&entry.name, digest);
        let topic = registry.get(entry.chat_id, &digest.area);
        telegram
            .send_message(entry.chat_id, topic, &text)
            .await
            .with_context(|| format!("sending area '{}'", digest.area))?;
    }

    Ok(())
}
