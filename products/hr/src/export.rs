//! Delimited text rendering of a roster view.

use std::io;

use chrono::NaiveDate;
use csv::{Terminator, WriterBuilder};
use thiserror::Error;

use crate::model::Employee;

pub const CSV_HEADERS: [&str; 6] = [
    "Employee ID",
    "Full Name",
    "Gender",
    "Date of Birth",
    "State",
    "Status",
];

const DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("export io failed: {0}")]
    Io(#[from] io::Error),
    #[error("export produced invalid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Writes a header line and one row per employee, in the given order.
pub fn write_csv<W: io::Write>(writer: W, employees: &[Employee]) -> Result<(), ExportError> {
    let mut csv = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    csv.write_record(CSV_HEADERS)?;
    for employee in employees {
        let date_of_birth = employee.date_of_birth.format(DATE_FORMAT).to_string();
        csv.write_record([
            employee.id.as_str(),
            employee.full_name.as_str(),
            employee.gender.as_str(),
            date_of_birth.as_str(),
            employee.state.name(),
            employee.status_label(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn to_csv_string(employees: &[Employee]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, employees)?;
    Ok(String::from_utf8(buffer)?)
}

/// `employees_YYYY-MM-DD.csv` for the given export date.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("employees_{}.csv", date.format("%Y-%m-%d"))
}
