//! Excel workbook export with `Data`, `Summary` and `Missing_Analysis` sheets.

use crate::analyser::logic::{Dataset, NumericSummary, Stats};
use crate::error::{Result, SifterError};
use crate::utils::percentage;
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, Worksheet};

const SUMMARY_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

fn row_index(row: usize) -> Result<u32> {
    u32::try_from(row)
        .map_err(|_| SifterError::Export(format!("Row {row} exceeds the worksheet limit")))
}

fn column_index(column: usize) -> Result<u16> {
    u16::try_from(column)
        .map_err(|_| SifterError::Export(format!("Column {column} exceeds the worksheet limit")))
}

fn summary_values(summary: &NumericSummary) -> [Option<f64>; 8] {
    [
        Some(summary.count as f64),
        summary.mean,
        summary.std,
        summary.min,
        summary.q1,
        summary.median,
        summary.q3,
        summary.max,
    ]
}

fn write_data_sheet(sheet: &mut Worksheet, dataset: &Dataset, header: &Format) -> Result<()> {
    sheet.set_name("Data")?;
    for (c, column) in dataset.columns().iter().enumerate() {
        let col = column_index(c)?;
        sheet.write_string_with_format(0, col, column.name(), header)?;

        for row in 0..dataset.row_count() {
            let r = row_index(row + 1)?;
            match (column.number(row), column.cell(row)) {
                (Some(v), _) if v.is_finite() => {
                    sheet.write_number(r, col, v)?;
                }
                (_, Some(text)) => {
                    sheet.write_string(r, col, text)?;
                }
                (_, None) => {}
            }
        }
    }
    Ok(())
}

fn write_summary_sheet(sheet: &mut Worksheet, stats: &Stats, header: &Format) -> Result<()> {
    sheet.set_name("Summary")?;
    sheet.write_string_with_format(0, 0, "statistic", header)?;
    for (r, label) in SUMMARY_ROWS.iter().enumerate() {
        sheet.write_string_with_format(row_index(r + 1)?, 0, *label, header)?;
    }

    for (c, (name, summary)) in stats.numeric_summary.iter().enumerate() {
        let col = column_index(c + 1)?;
        sheet.write_string_with_format(0, col, name, header)?;
        for (r, value) in summary_values(summary).into_iter().enumerate() {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                sheet.write_number(row_index(r + 1)?, col, v)?;
            }
        }
    }
    Ok(())
}

fn write_missing_sheet(sheet: &mut Worksheet, stats: &Stats, header: &Format) -> Result<()> {
    sheet.set_name("Missing_Analysis")?;
    sheet.write_string_with_format(0, 0, "Column", header)?;
    sheet.write_string_with_format(0, 1, "Missing_Count", header)?;
    sheet.write_string_with_format(0, 2, "Missing_Percentage", header)?;

    for (i, (name, &missing)) in stats.missing_values.iter().enumerate() {
        let r = row_index(i + 1)?;
        sheet.write_string(r, 0, name)?;
        sheet.write_number(r, 1, missing as f64)?;
        sheet.write_number(r, 2, percentage(missing, stats.rows))?;
    }
    Ok(())
}

/// # Errors
///
/// Returns an export error if the dataset exceeds worksheet limits or the
/// workbook cannot be serialized.
pub fn render_workbook(dataset: &Dataset, stats: &Stats) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    // A fixed creation date keeps the output identical across runs.
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));
    let header = Format::new().set_bold();

    write_data_sheet(workbook.add_worksheet(), dataset, &header)?;
    write_summary_sheet(workbook.add_worksheet(), stats, &header)?;
    write_missing_sheet(workbook.add_worksheet(), stats, &header)?;

    Ok(workbook.save_to_buffer()?)
}
