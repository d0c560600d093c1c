// Report output: one xlsx sheet per metric with the decumulated rows and a column chart.

mod chart;
mod workbook;

pub use chart::ColumnChart;
pub use workbook::{Workbook, WorkbookSink};

use crate::histogram::HistogramReport;
use crate::models::GroupCoverage;

/// Header row of every sheet: group, bucket bound, per-bucket value.
pub const COLUMNS: [&str; 3] = ["MZONE", "LE", "Metrics"];

/// Header of the host coverage table written beside the chart.
pub const COVERAGE_COLUMNS: [&str; 3] = ["MZONE", "Hosts", "Invalid hosts"];

/// Excel's limit on sheet name length, in characters.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Anything that can persist a finished sheet.
pub trait ReportSink {
    fn write_sheet(&mut self, sheet: &SheetReport) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetReport {
    pub name: String,
    /// (group, le, value) in output order.
    pub rows: Vec<(String, String, f64)>,
    pub coverage: Vec<GroupCoverage>,
}

impl SheetReport {
    pub fn new(name: &str, report: &HistogramReport) -> Self {
        Self {
            name: name.to_string(),
            rows: report
                .rows
                .iter()
                .map(|r| (r.group.clone(), r.le.clone(), r.value))
                .collect(),
            coverage: report.coverage.summary(),
        }
    }

    pub fn chart(&self) -> ColumnChart {
        ColumnChart::for_sheet(&self.name, self.rows.len())
    }
}

/// Checks a user-supplied sheet name against Excel's rules.
pub fn check_sheet_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("sheet name must be non-empty".into());
    }
    let len = name.chars().count();
    if len > MAX_SHEET_NAME_LEN {
        return Err(format!(
            "sheet name '{}' is {} characters, max {}",
            name, len, MAX_SHEET_NAME_LEN
        ));
    }
    if let Some(c) = name.chars().find(|c| INVALID_SHEET_CHARS.contains(c)) {
        return Err(format!("sheet name '{}' contains '{}'", name, c));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(format!("sheet name '{}' starts or ends with an apostrophe", name));
    }
    Ok(())
}

/// Builds a valid sheet name from `base` + `suffix`. Invalid characters become `_`; when
/// too long, the start of `base` is dropped (metric names share long prefixes) so the
/// distinguishing tail and the suffix survive.
pub fn fit_sheet_name(base: &str, suffix: &str) -> String {
    let cleaned: Vec<char> = base
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let room = MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count());
    let start = cleaned.len().saturating_sub(room);
    let tail: String = cleaned[start..].iter().collect();
    let name = format!("{}{}", tail.trim_matches('\''), suffix);
    if name.is_empty() { "Sheet1".to_string() } else { name }
}
