// xlsx workbook on disk: opened if it exists, created otherwise; one sheet per metric.
// Sheets are read back into memory, so writing one replaces it and keeps the others.

use std::path::{Path, PathBuf};

use anyhow::Context;
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use chrono::{DateTime, Local};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook as XlsxWorkbook, Worksheet};

use crate::config::OutputConfig;
use crate::models::GroupCoverage;

use super::chart::{ANCHOR, OFFSET};
use super::{COLUMNS, COVERAGE_COLUMNS, ReportSink, SheetReport};

/// First column of the coverage table (M), to the right of the chart.
const COVERAGE_COL: ColNum = 12;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<SheetReport>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let mut xlsx: Xlsx<_> = open_workbook(path)
            .with_context(|| format!("opening workbook {}", path.display()))?;
        let mut sheets = Vec::new();
        for name in xlsx.sheet_names() {
            let range = xlsx
                .worksheet_range(&name)
                .with_context(|| format!("reading sheet {} of {}", name, path.display()))?;
            sheets.push(read_sheet(name, &range));
        }
        Ok(Self { sheets })
    }

    /// Existing workbook at `path`, or a fresh one if there is no file yet.
    pub fn open_or_create(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::open(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Sheet names are case-insensitive in Excel.
    pub fn sheet(&self, name: &str) -> Option<&SheetReport> {
        self.sheets.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Adds the sheet, replacing one with the same name in place.
    pub fn upsert(&mut self, sheet: SheetReport) {
        match self
            .sheets
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(&sheet.name))
        {
            Some(existing) => *existing = sheet,
            None => self.sheets.push(sheet),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating output dir {}", dir.display()))?;
        }
        let mut xlsx = XlsxWorkbook::new();
        let header = Format::new().set_bold();
        for sheet in &self.sheets {
            let worksheet = xlsx.add_worksheet();
            write_sheet(worksheet, sheet, &header)
                .with_context(|| format!("rendering sheet {}", sheet.name))?;
        }
        xlsx.save(path)
            .with_context(|| format!("writing workbook {}", path.display()))
    }
}

fn write_sheet(
    ws: &mut Worksheet,
    sheet: &SheetReport,
    header: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    ws.set_name(&sheet.name)?;
    for (col, title) in (0..).zip(COLUMNS) {
        ws.write_string_with_format(0, col, title, header)?;
    }
    for (row, (group, le, value)) in (1..).zip(&sheet.rows) {
        ws.write_string(row, 0, group)?;
        ws.write_string(row, 1, le)?;
        ws.write_number(row, 2, *value)?;
    }

    for (col, title) in (COVERAGE_COL..).zip(COVERAGE_COLUMNS) {
        ws.write_string_with_format(0, col, title, header)?;
    }
    for (row, c) in (1..).zip(&sheet.coverage) {
        ws.write_string(row, COVERAGE_COL, &c.group)?;
        ws.write_number(row, COVERAGE_COL + 1, count_cell(c.total_hosts))?;
        ws.write_number(row, COVERAGE_COL + 2, count_cell(c.invalid_hosts))?;
    }

    if !sheet.rows.is_empty() {
        let chart = sheet.chart().build();
        ws.insert_chart_with_offset(ANCHOR.0, ANCHOR.1, &chart, OFFSET.0, OFFSET.1)?;
    }
    Ok(())
}

/// Reads back what `write_sheet` laid out: data rows until column A runs out, then the
/// coverage table until column M does.
fn read_sheet(name: String, range: &Range<Data>) -> SheetReport {
    let mut rows = Vec::new();
    for row in 1.. {
        let Some(group) = cell_string(range, row, 0) else {
            break;
        };
        let le = cell_string(range, row, 1).unwrap_or_default();
        let value = cell_number(range, row, 2).unwrap_or(0.0);
        rows.push((group, le, value));
    }

    let mut coverage = Vec::new();
    for row in 1.. {
        let Some(group) = cell_string(range, row, COVERAGE_COL) else {
            break;
        };
        coverage.push(GroupCoverage {
            group,
            total_hosts: cell_count(range, row, COVERAGE_COL + 1),
            invalid_hosts: cell_count(range, row, COVERAGE_COL + 2),
        });
    }

    SheetReport { name, rows, coverage }
}

fn cell_string(range: &Range<Data>, row: RowNum, col: ColNum) -> Option<String> {
    match range.get_value((row, u32::from(col)))? {
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        _ => None,
    }
}

fn cell_number(range: &Range<Data>, row: RowNum, col: ColNum) -> Option<f64> {
    match range.get_value((row, u32::from(col)))? {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn cell_count(range: &Range<Data>, row: RowNum, col: ColNum) -> usize {
    match cell_number(range, row, col) {
        Some(n) if n.is_finite() && n >= 0.0 => n.round() as usize,
        _ => 0,
    }
}

/// Host counts are small; anything past f64's exact integer range is clamped.
fn count_cell(n: usize) -> f64 {
    u32::try_from(n).map_or(f64::from(u32::MAX), f64::from)
}

/// Writes every sheet straight through to one workbook file.
#[derive(Debug, Clone)]
pub struct WorkbookSink {
    path: PathBuf,
}

impl WorkbookSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/<file_prefix>_<YYYYMMDDHHMMSS>.xlsx`, stamped with the run's start time.
    pub fn for_run(output: &OutputConfig, started: DateTime<Local>) -> Self {
        let file = format!(
            "{}_{}.xlsx",
            output.file_prefix,
            started.format("%Y%m%d%H%M%S")
        );
        Self::new(Path::new(&output.dir).join(file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for WorkbookSink {
    fn write_sheet(&mut self, sheet: &SheetReport) -> anyhow::Result<()> {
        let mut workbook = Workbook::open_or_create(&self.path)?;
        workbook.upsert(sheet.clone());
        workbook.save(&self.path)
    }
}
