//! Presentation strings for listing rows
//!
//! Pure derivations from an entry and explicit display settings: a short
//! date for the modification time and a human-readable size for files.

use crate::services::accessor::Entry;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::SystemTime;

const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

fn default_date_format() -> String {
    // Short date style, e.g. 3/7/24
    "%-m/%-d/%y".to_string()
}

/// How byte counts are scaled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteCountStyle {
    /// Decimal units (1 KB = 1000 bytes), as file managers show sizes
    #[default]
    File,
    /// Binary units (1 KB = 1024 bytes)
    Memory,
}

impl ByteCountStyle {
    fn unit(self) -> u64 {
        match self {
            ByteCountStyle::File => 1000,
            ByteCountStyle::Memory => 1024,
        }
    }
}

/// Display settings for listing rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// strftime-style pattern for the date column (date only, no time)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Fixed UTC offset for dates, in minutes; local time when unset
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,

    #[serde(default)]
    pub byte_count_style: ByteCountStyle,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            utc_offset_minutes: None,
            byte_count_style: ByteCountStyle::default(),
        }
    }
}

impl DisplayConfig {
    /// Whether `date_format` parses as a strftime pattern
    pub fn date_format_is_valid(&self) -> bool {
        !self.date_format.is_empty()
            && !StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error))
    }
}

/// Short, date-only representation of a timestamp
pub fn format_date(time: SystemTime, config: &DisplayConfig) -> String {
    let utc: DateTime<Utc> = time.into();
    match config.utc_offset_minutes {
        Some(minutes) => {
            let offset = FixedOffset::east_opt(minutes.saturating_mul(60))
                .unwrap_or_else(|| Utc.fix());
            render_date(&utc.with_timezone(&offset), &config.date_format)
        }
        None => render_date(&utc.with_timezone(&Local), &config.date_format),
    }
}

fn render_date<Tz>(date: &DateTime<Tz>, pattern: &str) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_ok() {
        return out;
    }

    // Invalid patterns are rejected by config validation; don't panic if one slips through
    out.clear();
    let _ = write!(out, "{}", date.format(FALLBACK_DATE_FORMAT));
    out
}

/// Human-readable byte count
pub fn format_size(size: u64, style: ByteCountStyle) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

    let unit = style.unit();
    if size == 1 {
        return "1 byte".to_string();
    }
    if size < unit {
        return format!("{} bytes", size);
    }

    let unit = unit as f64;
    let mut value = size as f64 / unit;
    let mut idx = 0;
    while value >= unit && idx < UNITS.len() - 1 {
        value /= unit;
        idx += 1;
    }

    // 999_999 bytes rounds to "1000 KB"; show it as "1.0 MB" instead
    if round_to(value, size_decimals(idx)) >= unit && idx < UNITS.len() - 1 {
        value /= unit;
        idx += 1;
    }

    format!("{:.*} {}", size_decimals(idx), value, UNITS[idx])
}

fn size_decimals(unit_index: usize) -> usize {
    match unit_index {
        0 => 0,
        1 => 1,
        _ => 2,
    }
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// What the display collaborator renders for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub name: String,
    pub is_directory: bool,
    pub date: String,
    /// Present for files only
    pub size: Option<String>,
}

impl DisplayRow {
    pub fn from_entry(entry: &Entry, config: &DisplayConfig) -> Self {
        let size = if entry.is_directory {
            None
        } else {
            Some(format_size(entry.size, config.byte_count_style))
        };

        Self {
            name: entry.name.clone(),
            is_directory: entry.is_directory,
            date: format_date(entry.last_modified, config),
            size,
        }
    }

    /// Subtitle line: the date for folders, "date - size" for files
    pub fn secondary_text(&self) -> String {
        match &self.size {
            Some(size) => format!("{} - {}", self.date, size),
            None => self.date.clone(),
        }
    }
}

pub fn display_rows(entries: &[Entry], config: &DisplayConfig) -> Vec<DisplayRow> {
    entries
        .iter()
        .map(|entry| DisplayRow::from_entry(entry, config))
        .collect()
}
