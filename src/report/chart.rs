// Column chart over a sheet's data range: categories are MZONE+LE, values the Metrics column.

use rust_xlsxwriter::{Chart, ChartType, ColNum, RowNum};

/// Top-left cell of the chart (E1), to the right of the three data columns.
pub const ANCHOR: (RowNum, ColNum) = (0, 4);
/// Pixel offset from the anchor cell.
pub const OFFSET: (u32, u32) = (15, 10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChart {
    pub sheet: String,
    pub title: String,
    /// Zero-based rows of the data; row 0 is the header.
    pub first_row: RowNum,
    pub last_row: RowNum,
}

impl ColumnChart {
    /// Chart for a sheet with a header row followed by `rows` data rows.
    pub fn for_sheet(sheet: &str, rows: usize) -> Self {
        Self {
            sheet: sheet.to_string(),
            title: sheet.to_string(),
            first_row: 1,
            last_row: RowNum::try_from(rows).unwrap_or(RowNum::MAX),
        }
    }

    /// Category range in A1 notation, e.g. `'lat_1'!$A$2:$B$5`.
    pub fn categories_ref(&self) -> String {
        format!(
            "{}!$A${}:$B${}",
            quote_sheet(&self.sheet),
            self.first_row + 1,
            self.last_row + 1
        )
    }

    /// Value range in A1 notation, e.g. `'lat_1'!$C$2:$C$5`.
    pub fn values_ref(&self) -> String {
        format!(
            "{}!$C${}:$C${}",
            quote_sheet(&self.sheet),
            self.first_row + 1,
            self.last_row + 1
        )
    }

    /// Native column chart: one series, no legend.
    pub fn build(&self) -> Chart {
        let mut chart = Chart::new(ChartType::Column);
        chart
            .add_series()
            .set_categories((self.sheet.as_str(), self.first_row, 0, self.last_row, 1))
            .set_values((self.sheet.as_str(), self.first_row, 2, self.last_row, 2));
        chart.title().set_name(&self.title);
        chart.legend().set_hidden();
        chart
    }
}

/// Spreadsheet-style sheet reference: `'name'`, with embedded quotes doubled.
fn quote_sheet(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}
