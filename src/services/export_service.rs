use rust_xlsxwriter::{Format, Workbook};

use crate::errors::AppError;
use crate::models::{FieldValue, ReportTable, PROFILE_COLUMNS};

pub const EXCEL_FILENAME: &str = "stock_data.xlsx";
pub const CSV_FILENAME: &str = "stock_data.csv";

/// Writes the table to a single-sheet workbook: a bold header row, then one
/// row per profile. Numbers stay numeric cells.
pub fn to_xlsx(table: &ReportTable) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, name) in PROFILE_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, profile) in table.rows.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, cell) in profile.cells().iter().enumerate() {
            let col = col as u16;
            match cell {
                FieldValue::Number(n) => sheet.write_number(row, col, *n)?,
                other => sheet.write_string(row, col, other.to_string())?,
            };
        }
    }

    sheet.autofit();
    Ok(workbook.save_to_buffer()?)
}

pub fn to_csv(table: &ReportTable) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(PROFILE_COLUMNS)?;

    for profile in &table.rows {
        writer.write_record(profile.cells().iter().map(|cell| cell.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Export(e.to_string()))
}

/// Reads the first worksheet back as rows of cell values.
#[cfg(test)]
pub(crate) fn read_xlsx_rows(bytes: &[u8]) -> Vec<Vec<calamine::Data>> {
    use calamine::{open_workbook_from_rs, Reader, Xlsx};

    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(std::io::Cursor::new(bytes.to_vec())).expect("valid xlsx");
    let range = workbook
        .worksheet_range_at(0)
        .expect("workbook has a sheet")
        .expect("sheet is readable");
    range.rows().map(|row| row.to_vec()).collect()
}
