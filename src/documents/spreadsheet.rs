//! Tabular extraction for CSV and Excel workbooks.
//!
//! Both paths build a [`TextTable`] (header row plus data rows) and render it
//! as right-aligned, space-separated columns so the model sees every cell in
//! the original row and column order.

use std::io::{Read, Seek};

use calamine::{Data, Range, Reader, Xls, Xlsx};
use chrono::Timelike;
use csv::ReaderBuilder;
use tracing::debug;

use super::DocumentError;

/// Placeholder rendered for a missing or empty cell
pub const MISSING_CELL: &str = "NaN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    /// Build a table from a header row and data rows.
    ///
    /// Short rows are padded with `NaN`; cells beyond the header get an
    /// `Unnamed: <index>` column.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, DocumentError> {
        if headers.is_empty() {
            return Err(DocumentError::EmptyTable);
        }

        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);

        let mut headers: Vec<String> = headers
            .into_iter()
            .enumerate()
            .map(|(idx, name)| header_name(idx, name))
            .collect();
        while headers.len() < width {
            headers.push(format!("Unnamed: {}", headers.len()));
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, MISSING_CELL.to_string());
                row
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Whitespace-aligned rendering, header first.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }

        std::iter::once(&self.headers)
            .chain(self.rows.iter())
            .map(|row| {
                row.iter()
                    .zip(&widths)
                    .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn header_name(idx: usize, name: String) -> String {
    if name.trim().is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        name
    }
}

fn cell_text(value: &str) -> String {
    if value.is_empty() {
        MISSING_CELL.to_string()
    } else {
        value.to_string()
    }
}

/// Parse CSV with its first row as the header.
pub fn read_csv<R: Read>(reader: R) -> Result<TextTable, DocumentError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(cell_text).collect());
    }

    debug!(columns = headers.len(), rows = rows.len(), "Parsed CSV");
    TextTable::new(headers, rows)
}

pub fn csv_to_text<R: Read>(reader: R) -> Result<String, DocumentError> {
    Ok(read_csv(reader)?.render())
}

/// Display text of one worksheet cell.
///
/// Date cells are stored as serial numbers; they are shown as
/// `YYYY-MM-DD`, with a time part only when it is not midnight.
fn data_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(value) if value.is_duration() => match value.as_duration() {
            Some(duration) => {
                let secs = duration.num_seconds();
                format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
            }
            None => value.to_string(),
        },
        Data::DateTime(value) => match value.as_datetime() {
            Some(dt) if dt.num_seconds_from_midnight() == 0 => dt.format("%Y-%m-%d").to_string(),
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => value.to_string(),
        },
        Data::DateTimeIso(text) | Data::DurationIso(text) => text.clone(),
        other => other.to_string(),
    }
}

/// First worksheet of a workbook as a table; its first row is the header.
pub fn range_to_table(range: &Range<Data>) -> Result<TextTable, DocumentError> {
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(first) => first.iter().map(data_text).collect(),
        None => return Err(DocumentError::EmptyTable),
    };
    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(|cell| cell_text(&data_text(cell))).collect())
        .collect();

    debug!(rows = rows.len(), "Parsed worksheet");
    TextTable::new(headers, rows)
}

pub fn xlsx_to_text<RS: Read + Seek>(reader: RS) -> Result<String, DocumentError> {
    let mut workbook: Xlsx<RS> = Xlsx::new(reader).map_err(calamine::Error::Xlsx)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DocumentError::NoWorksheet)?
        .map_err(calamine::Error::Xlsx)?;
    Ok(range_to_table(&range)?.render())
}

pub fn xls_to_text<RS: Read + Seek>(reader: RS) -> Result<String, DocumentError> {
    let mut workbook: Xls<RS> = Xls::new(reader).map_err(calamine::Error::Xls)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DocumentError::NoWorksheet)?
        .map_err(calamine::Error::Xls)?;
    Ok(range_to_table(&range)?.render())
}
