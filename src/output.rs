//! Rendering of model search results.
//!
//! Both renderers produce the same seven fields per model:
//!
//! | Field | Format |
//! |-------|--------|
//! | Model Name | as stored |
//! | Short Model ID | as stored |
//! | Repository | `owner\repository`, or [`NO_REMOTE_VCS`] |
//! | Branch | as stored |
//! | Git SHA | first 7 characters |
//! | Size | binary-prefixed, one decimal ([`format_size`]) |
//! | Creation Time | `DD/MM/YYYY HH:MM:SS`, local time |

use chrono::{Local, TimeZone};
use colored::Colorize;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::Result;
use crate::config::OutputFormat;
use crate::search::{ModelSearchResult, VcsInfo};

/// Repository text for models without a remote repository.
pub const NO_REMOTE_VCS: &str = "No Remote VCS Configured";

const SIZE_UNITS: [&str; 8] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB"];

const TABLE_HEADERS: [&str; 7] = [
    "Model Name",
    "Short Model ID",
    "Repository",
    "Branch",
    "Git SHA",
    "Size",
    "Creation Time",
];

/// Index of the right-aligned Size column.
const SIZE_COLUMN: usize = 5;

/// Format a byte count with binary (1024-based) units and one decimal.
///
/// Scales through B..ZiB and stops at the first unit below 1024; anything
/// larger is shown in YiB without further scaling.
///
/// ```
/// use corvus::output::format_size;
///
/// assert_eq!(format_size(1023), "1023.0 B");
/// assert_eq!(format_size(1536), "1.5 KiB");
/// ```
pub fn format_size(bytes: u128) -> String {
    // Lossy above 2^53, which only affects digits past the first decimal.
    let mut value = bytes as f64;
    for unit in SIZE_UNITS {
        if value.abs() < 1024.0 {
            return format!("{:.1} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1} YiB", value)
}

/// Format epoch seconds as `DD/MM/YYYY HH:MM:SS` in the local time zone.
///
/// Timestamps outside chrono's range are shown as the raw number.
pub fn format_creation_time(epoch_seconds: i64) -> String {
    match Local.timestamp_opt(epoch_seconds, 0).single() {
        Some(time) => time.format("%d/%m/%Y %H:%M:%S").to_string(),
        None => epoch_seconds.to_string(),
    }
}

fn format_repository(vcs: &VcsInfo) -> String {
    match vcs.remote_repository {
        Some(ref remote) => format!("{}\\{}", remote.owner, remote.repository),
        None => NO_REMOTE_VCS.to_string(),
    }
}

fn short_sha(sha: &str) -> String {
    sha.chars().take(7).collect()
}

/// One display row, shared by the table and JSON renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelRow {
    pub model_name: String,
    pub short_model_id: String,
    pub repository: String,
    pub branch: String,
    pub git_sha: String,
    pub size: String,
    pub creation_time: String,
}

impl From<&ModelSearchResult> for ModelRow {
    fn from(model: &ModelSearchResult) -> Self {
        Self {
            model_name: model.model_id.name.clone(),
            short_model_id: model.model_id.short_schema_id.clone(),
            repository: format_repository(&model.vcs_info),
            branch: model.vcs_info.branch.clone(),
            git_sha: short_sha(&model.vcs_info.sha),
            size: format_size(u128::from(model.model_id.model_size)),
            creation_time: format_creation_time(model.creation_time),
        }
    }
}

impl ModelRow {
    fn cells(&self) -> [&str; 7] {
        [
            self.model_name.as_str(),
            self.short_model_id.as_str(),
            self.repository.as_str(),
            self.branch.as_str(),
            self.git_sha.as_str(),
            self.size.as_str(),
            self.creation_time.as_str(),
        ]
    }
}

/// Render models in the given output format.
pub fn render(models: &[ModelSearchResult], format: OutputFormat, color: bool) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(models, color)),
        OutputFormat::Json => render_json(models),
    }
}

/// Render models as a pretty-printed JSON array.
pub fn render_json(models: &[ModelSearchResult]) -> Result<String> {
    let rows: Vec<ModelRow> = models.iter().map(ModelRow::from).collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

/// Render models as an aligned table with one row per model.
///
/// With `color`, the header is styled cyan.
pub fn render_table(models: &[ModelSearchResult], color: bool) -> String {
    let rows: Vec<ModelRow> = models.iter().map(ModelRow::from).collect();

    let mut widths = TABLE_HEADERS.map(|h| h.width());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = String::new();

    let header = format_line(&TABLE_HEADERS, &widths);
    if color {
        out.push_str(&header.cyan().bold().to_string());
    } else {
        out.push_str(&header);
    }
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for row in &rows {
        out.push_str(&format_line(&row.cells(), &widths));
        out.push('\n');
    }

    out
}

fn format_line(cells: &[&str; 7], widths: &[usize; 7]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| {
            let pad = " ".repeat(width.saturating_sub(cell.width()));
            if i == SIZE_COLUMN {
                format!("{}{}", pad, cell)
            } else {
                format!("{}{}", cell, pad)
            }
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}
