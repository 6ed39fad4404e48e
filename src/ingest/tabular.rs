//! Decoding of uploaded spreadsheets into loosely-typed rows.
//!
//! Both formats produce the same thing: one [`RawRow`] per data row, keyed
//! by the header text exactly as it appears in the first row.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::error::{AppError, Result};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const CSV_MIMES: &[&str] = &["text/csv", "application/csv", "application/vnd.ms-excel"];

/// The spreadsheet formats accepted by the importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    /// Picks the format from the declared file name and content type.
    ///
    /// The file-name suffix wins when it is recognised; otherwise the
    /// content type decides.
    ///
    /// # Returns
    ///
    /// `AppError::UnsupportedFormat` when neither identifies CSV or XLSX.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Result<Self> {
        if let Some(name) = file_name {
            let lower = name.trim().to_ascii_lowercase();
            if lower.ends_with(".csv") {
                return Ok(FileFormat::Csv);
            }
            if lower.ends_with(".xlsx") {
                return Ok(FileFormat::Xlsx);
            }
        }

        if let Some(content_type) = content_type {
            let essence = content_type
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            if essence == XLSX_MIME {
                return Ok(FileFormat::Xlsx);
            }
            if CSV_MIMES.contains(&essence.as_str()) {
                return Ok(FileFormat::Csv);
            }
        }

        Err(AppError::UnsupportedFormat(format!(
            "name={:?}, content_type={:?}",
            file_name, content_type
        )))
    }
}

/// One data row: header text → cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    /// Builds a row by zipping `headers` with `values` positionally.
    ///
    /// Empty headers are ignored, the first of two identical headers wins and
    /// missing trailing values become empty strings.
    pub fn from_positional(headers: &[String], values: &[String]) -> Self {
        let mut cells = HashMap::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            cells
                .entry(header.clone())
                .or_insert_with(|| values.get(i).cloned().unwrap_or_default());
        }
        Self { cells }
    }

    /// Returns the cell under `header`, matched case-sensitively.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parses `bytes` as `format` into ordered rows.
pub fn parse(bytes: &[u8], format: FileFormat) -> Result<Vec<RawRow>> {
    match format {
        FileFormat::Csv => parse_csv(bytes),
        FileFormat::Xlsx => parse_xlsx(bytes),
    }
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| AppError::Parse(format!("File is not valid UTF-8 text: {}", e)))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    check_quoting(text)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Parse(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::Parse(e.to_string()))?;
        let values: Vec<String> = record.iter().map(str::to_string).collect();
        rows.push(RawRow::from_positional(&headers, &values));
    }

    tracing::debug!("📄 Parsed CSV: {} columns, {} rows", headers.len(), rows.len());
    Ok(rows)
}

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted { opened_on: usize },
    QuoteInQuoted { opened_on: usize },
}

/// Rejects CSV text whose quoting is malformed.
///
/// The `csv` reader is lenient: an unterminated quote swallows every later
/// line into one field and a stray quote inside a bare field is kept as
/// data. A quote may only open a field, and a closing quote must be
/// followed by a delimiter, a line break or the end of input.
fn check_quoting(text: &str) -> Result<()> {
    use QuoteState::*;

    let mut state = FieldStart;
    let mut line = 1;

    for c in text.chars() {
        if c == '\n' {
            line += 1;
        }

        state = match (state, c) {
            (FieldStart, '"') => Quoted { opened_on: line },
            (FieldStart | Unquoted | QuoteInQuoted { .. }, ',' | '\r' | '\n') => FieldStart,
            (Unquoted, '"') => {
                return Err(AppError::Parse(format!(
                    "Unexpected quote inside an unquoted field on line {}",
                    line
                )));
            }
            (FieldStart | Unquoted, _) => Unquoted,
            (Quoted { opened_on }, '"') => QuoteInQuoted { opened_on },
            (Quoted { opened_on }, _) => Quoted { opened_on },
            (QuoteInQuoted { opened_on }, '"') => Quoted { opened_on },
            (QuoteInQuoted { .. }, _) => {
                return Err(AppError::Parse(format!(
                    "Unexpected character after a closing quote on line {}",
                    line
                )));
            }
        };
    }

    match state {
        Quoted { opened_on } => Err(AppError::Parse(format!(
            "Unterminated quoted field starting on line {}",
            opened_on
        ))),
        _ => Ok(()),
    }
}

fn parse_xlsx(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let looks_like_workbook = infer::get(bytes)
        .map(|kind| kind.mime_type() == XLSX_MIME || kind.mime_type() == "application/zip")
        .unwrap_or(false);
    if !looks_like_workbook {
        return Err(AppError::Parse("File is not a valid XLSX workbook".to_string()));
    }

    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| AppError::Parse(format!("Cannot open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Parse("Workbook contains no worksheets".to_string()))?
        .map_err(|e| AppError::Parse(format!("Cannot read first worksheet: {}", e)))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header_row) => header_row.iter().map(cell_text).collect(),
        None => return Ok(Vec::new()),
    };

    let rows: Vec<RawRow> = sheet_rows
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|values| values.iter().any(|v| !v.is_empty()))
        .map(|values| RawRow::from_positional(&headers, &values))
        .collect();

    tracing::debug!("📊 Parsed XLSX: {} columns, {} rows", headers.len(), rows.len());
    Ok(rows)
}

/// Renders a cell the way it would read in the spreadsheet UI.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
