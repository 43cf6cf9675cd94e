//! Comment extraction from uploaded Excel workbooks.
//!
//! The first row of the first worksheet is a header. Every later row is a
//! data row, and the first column (column A) of each data row holds one
//! comment. Empty cells are skipped; other cell types are rendered as text,
//! dates as `YYYY-MM-DD HH:MM:SS`.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use crate::error::{Result, VisentError};

/// File extensions accepted by the batch endpoint.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".xlsx", ".xls"];

/// Message returned when a workbook has no data rows.
pub const EMPTY_WORKBOOK_MESSAGE: &str = "File Excel rỗng.";

/// Rendering of date and time cells.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Comments extracted from a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentColumn {
    /// Header cell of the comment column, if any.
    pub header: Option<String>,
    /// Number of data rows below the header, including rows with a blank comment.
    pub data_rows: usize,
    /// Non-empty comments in row order.
    pub comments: Vec<String>,
}

/// Whether a filename carries a supported spreadsheet extension.
///
/// The comparison ignores ASCII case.
pub fn is_supported_filename(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Read the comment column from raw workbook bytes.
///
/// Fails with [`VisentError::EmptyInput`] when the first worksheet has no
/// data rows, and [`VisentError::Spreadsheet`] when the bytes are not a
/// readable workbook.
pub fn read_comments(bytes: &[u8]) -> Result<CommentColumn> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(VisentError::EmptyInput(EMPTY_WORKBOOK_MESSAGE.to_string())),
    };

    let Some((_, first_col)) = range.start() else {
        return Err(VisentError::EmptyInput(EMPTY_WORKBOOK_MESSAGE.to_string()));
    };

    let (height, _) = range.get_size();
    let data_rows = height.saturating_sub(1);
    if data_rows == 0 {
        return Err(VisentError::EmptyInput(EMPTY_WORKBOOK_MESSAGE.to_string()));
    }

    // The used range may begin right of column A, in which case column A is blank throughout.
    if first_col != 0 {
        return Ok(CommentColumn {
            header: None,
            data_rows,
            comments: Vec::new(),
        });
    }

    let mut rows = range.rows();
    let header = rows.next().and_then(|row| row.first()).and_then(cell_text);
    let comments = rows
        .filter_map(|row| row.first().and_then(cell_text))
        .collect();

    Ok(CommentColumn {
        header,
        data_rows,
        comments,
    })
}

/// Render a cell as comment text, or `None` for cells that count as missing.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(datetime) => datetime.format(DATETIME_FORMAT).to_string(),
            None => dt.to_string(),
        }),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    #[test]
    fn accepts_excel_extensions() {
        assert!(is_supported_filename("binh_luan.xlsx"));
        assert!(is_supported_filename("old.xls"));
        assert!(is_supported_filename("UPPER.XLSX"));
    }

    #[test]
    fn rejects_other_extensions() {
        assert!(!is_supported_filename("data.csv"));
        assert!(!is_supported_filename("report.xlsx.txt"));
        assert!(!is_supported_filename("xlsx"));
        assert!(!is_supported_filename(""));
    }

    #[test]
    fn cell_text_skips_missing_cells() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String(String::new())), None);
        assert_eq!(
            cell_text(&Data::Error(calamine::CellErrorType::NA)),
            None
        );
    }

    #[test]
    fn cell_text_coerces_values() {
        assert_eq!(cell_text(&Data::String("Tốt".into())), Some("Tốt".into()));
        assert_eq!(cell_text(&Data::Int(42)), Some("42".into()));
        assert_eq!(cell_text(&Data::Float(1.5)), Some("1.5".into()));
        assert_eq!(cell_text(&Data::Bool(true)), Some("true".into()));
        // whitespace-only text is kept, like any other string
        assert_eq!(cell_text(&Data::String("  ".into())), Some("  ".into()));
    }

    #[test]
    fn cell_text_renders_dates() {
        let new_year = ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(
            cell_text(&Data::DateTime(new_year)),
            Some("2024-01-01 00:00:00".into())
        );

        let afternoon = ExcelDateTime::new(45292.75, ExcelDateTimeType::DateTime, false);
        assert_eq!(
            cell_text(&Data::DateTime(afternoon)),
            Some("2024-01-01 18:00:00".into())
        );
    }

    #[test]
    fn garbage_bytes_are_a_spreadsheet_error() {
        let err = read_comments(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, VisentError::Spreadsheet(_)));
    }
}
