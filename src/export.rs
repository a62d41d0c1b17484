use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;

use crate::error::{Result, ScrapeError};
use crate::record::{JobRecord, NOT_AVAILABLE, Variant};

/// Extra characters added to the widest cell of each column
pub const COLUMN_PADDING: usize = 2;
/// Excel's hard limit on column width
const MAX_COLUMN_WIDTH: usize = 255;
const SALARY_COLUMN: usize = 4;
/// Excel's per-cell string limit, in characters
pub const MAX_CELL_CHARS: usize = 32_767;

fn clamp_cell(cell: &mut String) {
    if let Some((cut, _)) = cell.char_indices().nth(MAX_CELL_CHARS) {
        cell.truncate(cut);
    }
}

/// Cells for every record, in column order, with export-time cleanup applied.
///
/// Cells longer than Excel allows are cut to `MAX_CELL_CHARS`.
pub fn rows(records: &[JobRecord]) -> Vec<[String; 7]> {
    records
        .iter()
        .map(|record| {
            let mut cells = record.cells();
            if cells[SALARY_COLUMN] == NOT_AVAILABLE {
                cells[SALARY_COLUMN].clear();
            }
            cells.iter_mut().for_each(clamp_cell);
            cells
        })
        .collect()
}

fn rendered_width(cell: &str) -> usize {
    cell.lines().map(|line| line.chars().count()).max().unwrap_or(0)
}

/// Widest rendered cell (header included) per column, plus padding.
pub fn column_widths(header: &[&str], rows: &[[String; 7]]) -> Vec<usize> {
    header
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let widest = rows
                .iter()
                .map(|row| rendered_width(&row[col]))
                .fold(rendered_width(name), usize::max);
            (widest + COLUMN_PADDING).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Write one sheet (header row + one row per record) to `path`, replacing any existing file.
pub fn export(records: &[JobRecord], variant: Variant, path: &Path) -> Result<()> {
    write_workbook(records, variant, path).map_err(|source| ScrapeError::Export {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

fn write_workbook(
    records: &[JobRecord],
    variant: Variant,
    path: &Path,
) -> std::result::Result<(), XlsxError> {
    let header = variant.columns();
    let rows = rows(records);
    let widths = column_widths(&header, &rows);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Jobs")?;

    let bold = Format::new().set_bold();
    for (col, name) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_num = (index + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            worksheet.write_string(row_num, col as u16, cell.as_str())?;
        }
    }

    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width as f64)?;
    }

    workbook.save(path)
}
