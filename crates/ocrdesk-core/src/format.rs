//! Display formatting shared by the dashboard pages and the CLI.
//!
//! The status table and the byte-size rules must match the behaviour operators
//! already know from the browser dashboard, including its Portuguese copy.

use crate::model::DocumentStatus;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Datelike};

/// Placeholder for values the backend did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

// =============================================================================
// Status
// =============================================================================

/// Portuguese label for a document status.
pub fn status_label(status: &DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Completed => "Concluído",
        DocumentStatus::Processing => "Processando",
        DocumentStatus::Error => "Erro",
        _ => "Desconhecido",
    }
}

/// Badge color for a document status.
pub fn status_color(status: &DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Completed => "green",
        DocumentStatus::Processing => "yellow",
        DocumentStatus::Error => "red",
        _ => "gray",
    }
}

// =============================================================================
// Sizes
// =============================================================================

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human readable byte count with base 1024 and at most two decimals.
///
/// Trailing zeros are dropped: 1024 is "1 KB" and 1536 is "1.5 KB".
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut threshold: u64 = 1024;
    while unit < SIZE_UNITS.len() - 1 && bytes >= threshold {
        unit += 1;
        threshold = threshold.saturating_mul(1024);
    }
    let value = bytes as f64 / 1024f64.powi(unit as i32);
    format!("{} {}", trim_decimals(value), SIZE_UNITS[unit])
}

/// Size of an optional byte count, or "N/A".
pub fn format_optional_size(bytes: Option<u64>) -> String {
    bytes.map_or_else(|| NOT_AVAILABLE.to_string(), format_file_size)
}

fn trim_decimals(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

// =============================================================================
// Dates
// =============================================================================

const MONTHS_SHORT: [&str; 12] = [
    "jan.", "fev.", "mar.", "abr.", "mai.", "jun.", "jul.", "ago.", "set.", "out.", "nov.", "dez.",
];

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 (offset kept as wall-clock time), naive ISO date-times with
/// or without fractional seconds, and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Short pt-BR date, e.g. "15 de jan. de 2024, 14:30".
pub fn format_date_short(raw: Option<&str>) -> String {
    match raw.and_then(parse_timestamp) {
        Some(dt) => format!(
            "{} de {} de {}, {:02}:{:02}",
            dt.day(),
            MONTHS_SHORT[dt.month0() as usize],
            dt.year(),
            dt.hour(),
            dt.minute()
        ),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Full pt-BR date-time, e.g. "15/01/2024, 14:30:00".
pub fn format_datetime_long(raw: Option<&str>) -> String {
    match raw.and_then(parse_timestamp) {
        Some(dt) => dt.format("%d/%m/%Y, %H:%M:%S").to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

// =============================================================================
// Confidence
// =============================================================================

/// How a confidence value is scaled by its producer.
///
/// The list view and the statistics cards treat scores as 0-1 fractions, while
/// the gallery view treats them as 0-100 percentages. Both are kept until the
/// backend settles on one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceScale {
    /// 0-1, displayed as `round(s * 100)%`.
    Fraction,
    /// 0-100, displayed as `round(s)%`.
    Percent,
}

impl ConfidenceScale {
    /// Whole percentage for a score on this scale.
    pub fn percent(self, score: f64) -> i64 {
        let value = match self {
            ConfidenceScale::Fraction => score * 100.0,
            ConfidenceScale::Percent => score,
        };
        js_round(value)
    }

    /// "87%" for a score on this scale.
    pub fn format(self, score: f64) -> String {
        format!("{}%", self.percent(score))
    }
}

/// Rounds half up, like `Math.round` (so -0.5 rounds to 0, not -1).
fn js_round(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Confidence in the list view: fraction scale, "N/A" when missing.
pub fn format_list_confidence(score: Option<f64>) -> String {
    score.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |s| ConfidenceScale::Fraction.format(s),
    )
}

/// Confidence in the gallery view: percent scale, "N/A" when missing or not positive.
pub fn format_gallery_confidence(score: Option<f64>) -> String {
    match score {
        Some(s) if s > 0.0 => ConfidenceScale::Percent.format(s),
        _ => NOT_AVAILABLE.to_string(),
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination window shown under the document list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32, total: u64, total_pages: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
            total,
            total_pages,
        }
    }

    /// Controls are only rendered when there is more than one page.
    pub fn is_visible(&self) -> bool {
        self.total_pages > 1
    }

    /// 1-based index of the first item on the page.
    pub fn first_item(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page) + 1
    }

    /// 1-based index of the last item on the page.
    pub fn last_item(&self) -> u64 {
        (u64::from(self.page) * u64::from(self.per_page)).min(self.total)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// "Mostrando 21 a 25 de 25 documentos"
    pub fn summary(&self) -> String {
        format!(
            "Mostrando {} a {} de {} documentos",
            self.first_item(),
            self.last_item(),
            self.total
        )
    }
}
