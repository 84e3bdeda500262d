//! CSV import of application exports for offline ranking.

mod parser;

use std::io::Read;
use std::path::Path;

use crate::workflows::merit::domain::{
    Application, ApplicationId, ApplicationStatus, ScholarshipId, StudentRegNo,
};
use parser::{ApplicationRow, REGNO_COLUMN};

#[derive(Debug)]
pub enum ApplicationImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(&'static str),
    MissingRegNo { line: usize },
    InvalidStatus { line: usize, value: String },
}

impl std::fmt::Display for ApplicationImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationImportError::Io(err) => {
                write!(f, "failed to read application export: {}", err)
            }
            ApplicationImportError::Csv(err) => write!(f, "invalid application CSV data: {}", err),
            ApplicationImportError::MissingColumn(column) => {
                write!(f, "application export is missing the '{column}' column")
            }
            ApplicationImportError::MissingRegNo { line } => {
                write!(f, "line {line}: student_regno is blank")
            }
            ApplicationImportError::InvalidStatus { line, value } => write!(
                f,
                "line {line}: unknown application status '{value}' (expected pending, approved, or rejected)"
            ),
        }
    }
}

impl std::error::Error for ApplicationImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicationImportError::Io(err) => Some(err),
            ApplicationImportError::Csv(err) => Some(err),
            ApplicationImportError::MissingColumn(_)
            | ApplicationImportError::MissingRegNo { .. }
            | ApplicationImportError::InvalidStatus { .. } => None,
        }
    }
}

impl From<std::io::Error> for ApplicationImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ApplicationImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Builds [`Application`] records from a CSV export.
///
/// `student_regno` is required; `id` defaults to `row-<line>` and `status`
/// to `approved`. Every other non-blank cell lands in `application_data` as a
/// string, keyed by its header.
pub struct ApplicationCsvImporter;

impl ApplicationCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        scholarship_id: &ScholarshipId,
    ) -> Result<Vec<Application>, ApplicationImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, scholarship_id)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        scholarship_id: &ScholarshipId,
    ) -> Result<Vec<Application>, ApplicationImportError> {
        let export = parser::parse_rows(reader)?;
        if !export.has_regno_column {
            return Err(ApplicationImportError::MissingColumn(REGNO_COLUMN));
        }

        export
            .rows
            .into_iter()
            .map(|row| build_application(row, scholarship_id))
            .collect()
    }
}

fn build_application(
    row: ApplicationRow,
    scholarship_id: &ScholarshipId,
) -> Result<Application, ApplicationImportError> {
    let ApplicationRow {
        line,
        id,
        student_regno,
        status,
        data,
    } = row;

    let student_regno =
        student_regno.ok_or(ApplicationImportError::MissingRegNo { line })?;
    let status = match status {
        Some(raw) => ApplicationStatus::parse(&raw)
            .ok_or(ApplicationImportError::InvalidStatus { line, value: raw })?,
        None => ApplicationStatus::Approved,
    };

    Ok(Application {
        id: ApplicationId(id.unwrap_or_else(|| format!("row-{line}"))),
        scholarship_id: scholarship_id.clone(),
        student_regno: StudentRegNo(student_regno),
        status,
        application_data: data,
    })
}
