//! CSV readers for the two import files.
//!
//! Registrations: `student_no,event_name,group_name` (group may be blank).
//! Results: `student_no,event_name,value`.
//!
//! A line that cannot be read is kept as a row error and the rest of the file
//! still goes through.

use std::io::Read;
use std::str::FromStr;

use rust_decimal::Decimal;
use storage::dto::import::{ImportReport, RegistrationImportRow, RowError, ScoreImportRow};

use crate::{ImporterError, Result};

/// Rows read from a file, the file line each came from, and lines that failed.
#[derive(Debug)]
pub struct ParsedFile<T> {
    pub rows: Vec<T>,
    pub lines: Vec<usize>,
    pub errors: Vec<RowError>,
}

impl<T> ParsedFile<T> {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            lines: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn push(&mut self, line: usize, row: T) {
        self.rows.push(row);
        self.lines.push(line);
    }

    fn reject(&mut self, line: usize, message: impl Into<String>) {
        self.errors.push(RowError {
            row: line,
            message: message.into(),
        });
    }

    /// Rewrites an import report so row numbers point at file lines, then
    /// adds the lines that never made it into the batch.
    pub fn merge_report(&self, mut report: ImportReport) -> ImportReport {
        for error in &mut report.errors {
            if let Some(line) = self.lines.get(error.row.saturating_sub(1)) {
                error.row = *line;
            }
        }

        for error in &self.errors {
            report.record_failure(error.row, error.message.clone());
        }

        report.errors.sort_by_key(|error| error.row);
        report
    }
}

struct Columns {
    student_no: usize,
    event_name: usize,
    third: Option<usize>,
}

fn columns(headers: &csv::StringRecord, third: &'static str, third_required: bool) -> Result<Columns> {
    let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

    let third_index = find(third);
    if third_required && third_index.is_none() {
        return Err(ImporterError::MissingColumn(third));
    }

    Ok(Columns {
        student_no: find("student_no").ok_or(ImporterError::MissingColumn("student_no"))?,
        event_name: find("event_name").ok_or(ImporterError::MissingColumn("event_name"))?,
        third: third_index,
    })
}

fn field<'r>(record: &'r csv::StringRecord, index: usize) -> &'r str {
    record.get(index).map(str::trim).unwrap_or("")
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input)
}

pub fn read_registrations(input: impl Read) -> Result<ParsedFile<RegistrationImportRow>> {
    let mut reader = reader(input);
    let columns = columns(reader.headers()?, "group_name", false)?;
    let mut parsed = ParsedFile::new();

    for (index, record) in reader.records().enumerate() {
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                parsed.reject(line, e.to_string());
                continue;
            }
        };

        let student_no = field(&record, columns.student_no);
        let event_name = field(&record, columns.event_name);
        if student_no.is_empty() || event_name.is_empty() {
            parsed.reject(line, "student_no and event_name are required");
            continue;
        }

        let group_name = columns
            .third
            .map(|index| field(&record, index))
            .filter(|name| !name.is_empty())
            .map(String::from);

        parsed.push(
            line,
            RegistrationImportRow {
                student_no: student_no.to_string(),
                event_name: event_name.to_string(),
                group_name,
            },
        );
    }

    Ok(parsed)
}

pub fn read_scores(input: impl Read) -> Result<ParsedFile<ScoreImportRow>> {
    let mut reader = reader(input);
    let columns = columns(reader.headers()?, "value", true)?;
    let value_index = columns.third.ok_or(ImporterError::MissingColumn("value"))?;
    let mut parsed = ParsedFile::new();

    for (index, record) in reader.records().enumerate() {
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                parsed.reject(line, e.to_string());
                continue;
            }
        };

        let student_no = field(&record, columns.student_no);
        let event_name = field(&record, columns.event_name);
        if student_no.is_empty() || event_name.is_empty() {
            parsed.reject(line, "student_no and event_name are required");
            continue;
        }

        let raw_value = field(&record, value_index);
        let value = match Decimal::from_str(raw_value) {
            Ok(value) => value,
            Err(_) => {
                parsed.reject(line, format!("'{raw_value}' is not a number"));
                continue;
            }
        };

        parsed.push(
            line,
            ScoreImportRow {
                student_no: student_no.to_string(),
                event_name: event_name.to_string(),
                value,
            },
        );
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrations_with_optional_group() {
        let csv = "student_no,event_name,group_name\n\
                   0001,100m,Boys\n\
                   0002, Long jump ,\n";

        let parsed = read_registrations(csv.as_bytes()).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].group_name.as_deref(), Some("Boys"));
        assert_eq!(parsed.rows[1].event_name, "Long jump");
        assert_eq!(parsed.rows[1].group_name, None);
        assert_eq!(parsed.lines, vec![2, 3]);
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_group_column_may_be_absent() {
        let parsed = read_registrations("student_no,event_name\n0001,200m\n".as_bytes()).unwrap();

        assert_eq!(parsed.rows[0].group_name, None);
    }

    #[test]
    fn test_scores_keep_decimal_precision() {
        let csv = "student_no,event_name,value\n0001,100m,12.95\n0002,100m,13.20\n";

        let parsed = read_scores(csv.as_bytes()).unwrap();

        assert_eq!(parsed.rows[0].value, Decimal::from_str("12.95").unwrap());
        assert_eq!(parsed.rows[1].value.to_string(), "13.20");
    }

    #[test]
    fn test_unreadable_lines_are_reported_with_line_number() {
        let csv = "student_no,event_name,value\n\
                   0001,100m,fast\n\
                   ,100m,12.0\n\
                   0003,100m,11.9\n";

        let parsed = read_scores(csv.as_bytes()).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.lines, vec![4]);
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].row, 2);
        assert!(parsed.errors[0].message.contains("fast"));
        assert_eq!(parsed.errors[1].row, 3);
    }

    #[test]
    fn test_missing_value_column_fails_the_file() {
        let error = read_scores("student_no,event_name\n0001,100m\n".as_bytes()).unwrap_err();

        assert!(matches!(error, ImporterError::MissingColumn("value")));
    }

    #[test]
    fn test_report_rows_are_mapped_back_to_file_lines() {
        let csv = "student_no,event_name,value\n\
                   0001,100m,12.95\n\
                   0002,100m,oops\n\
                   0003,100m,13.50\n";
        let parsed = read_scores(csv.as_bytes()).unwrap();

        let mut report = ImportReport {
            succeeded: 1,
            ..Default::default()
        };
        report.record_failure(2, "Student 0003 not found");

        let merged = parsed.merge_report(report);

        assert_eq!(merged.failed, 2);
        assert_eq!(merged.errors[0].row, 3);
        assert_eq!(merged.errors[1].row, 4);
        assert_eq!(merged.errors[1].message, "Student 0003 not found");
        assert_eq!(merged.total(), 3);
    }
}
