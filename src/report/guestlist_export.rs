//! Per-day guest list JSON export and upload command list
//!
//! Every document is built and validated before anything is written, so a
//! missing day configuration or a file name collision leaves no files behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::warn;
use serde::Serialize;

use crate::config::{DayConfig, ExportSettings};
use crate::error::{GuestlistError, Result};
use crate::pipeline::{DayBucket, DayBuckets};
use crate::report::{day_file_paths, ensure_dir, write_files, WrittenDay};

/// Name of the upload command list written next to the JSON files.
pub const COMMANDS_FILE: &str = "cmds.sh";

/// What to do when one day's guest list holds the same email twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DuplicatePolicy {
    /// Keep the last entry and log a warning.
    #[default]
    Warn,
    /// Abort the run.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuestDetail {
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub affiliation: String,
}

/// Body accepted by the guest list upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestlistDocument {
    pub api_key: String,
    pub space_id: String,
    pub overwrite: bool,
    /// Keyed by email.
    pub guestlist: BTreeMap<String, GuestDetail>,
}

/// A validated document and where it will be written.
#[derive(Debug, Clone)]
pub struct PlannedDay {
    pub ticket_type: String,
    pub path: PathBuf,
    pub document: GuestlistDocument,
    /// Whether an upload command is emitted for this day.
    pub upload: bool,
}

/// Convert one bucket into a guest list document.
pub fn build_document(
    bucket: &DayBucket,
    space_id: &str,
    overwrite: bool,
    api_key: &str,
    policy: DuplicatePolicy,
) -> Result<GuestlistDocument> {
    let mut guestlist = BTreeMap::new();
    for g in &bucket.members {
        let detail = GuestDetail {
            name: g.name.clone(),
            role: g.role.clone(),
            affiliation: g.affiliation.clone(),
        };
        if let Some(previous) = guestlist.insert(g.email.clone(), detail) {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(GuestlistError::DuplicateEmail {
                        ticket_type: bucket.ticket_type.clone(),
                        email: g.email.clone(),
                    })
                }
                DuplicatePolicy::Warn => warn!(
                    "duplicate email {} in '{}': replacing {} ({}) with {} ({})",
                    g.email, bucket.ticket_type, previous.name, previous.role, g.name, g.role
                ),
            }
        }
    }

    Ok(GuestlistDocument {
        api_key: api_key.to_string(),
        space_id: space_id.to_string(),
        overwrite,
        guestlist,
    })
}

/// Build and validate the documents for every day without touching the disk.
pub fn plan_guestlists(
    days: &DayBuckets,
    config: &DayConfig,
    settings: &ExportSettings,
    dir: &Path,
    policy: DuplicatePolicy,
) -> Result<Vec<PlannedDay>> {
    if settings.api_key.is_empty() {
        return Err(GuestlistError::EmptyValue {
            field: "API key",
            context: None,
        });
    }

    let paths = day_file_paths(days, dir, "json")?;
    let mut plan = Vec::with_capacity(days.len());
    for (bucket, path) in days.iter().zip(paths) {
        let space = config.space_for(&bucket.ticket_type)?;
        let document = build_document(
            bucket,
            &space.space_id,
            space.overwrite,
            &settings.api_key,
            policy,
        )?;
        plan.push(PlannedDay {
            ticket_type: bucket.ticket_type.clone(),
            path,
            upload: space.space_id != settings.placeholder_space_id,
            document,
        });
    }
    Ok(plan)
}

/// Shell command posting `path` to the upload endpoint.
///
/// The `@path` argument and the endpoint are shell-quoted.
pub fn upload_command(path: &Path, endpoint: &str) -> String {
    let data = format!("@{}", path.display());
    format!(
        "curl -i -H \"Content-Type: application/json\" --data {} {}",
        shell_words::quote(&data),
        shell_words::quote(endpoint)
    )
}

/// Write planned documents into `dir` plus the upload command list.
///
/// Returns the written day files and the path of the command list. A failed
/// write removes the files already written in this run.
pub fn write_guestlists(
    plan: &[PlannedDay],
    dir: &Path,
    settings: &ExportSettings,
) -> Result<(Vec<WrittenDay>, PathBuf)> {
    let cmd_path = dir.join(COMMANDS_FILE);
    let mut commands = String::new();
    let mut files = Vec::with_capacity(plan.len() + 1);
    let mut written = Vec::with_capacity(plan.len());

    for day in plan {
        let buf = serde_json::to_vec(&day.document).map_err(|source| GuestlistError::Encode {
            ticket_type: day.ticket_type.clone(),
            source,
        })?;
        files.push((day.path.clone(), buf));

        if day.upload {
            commands.push_str(&upload_command(&day.path, &settings.upload_endpoint));
            commands.push('\n');
        }

        written.push(WrittenDay {
            ticket_type: day.ticket_type.clone(),
            path: day.path.clone(),
            guests: day.document.guestlist.len(),
        });
    }
    files.push((cmd_path.clone(), commands.into_bytes()));

    ensure_dir(dir)?;
    write_files(&files)?;
    Ok((written, cmd_path))
}
