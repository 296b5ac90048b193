//! Tabular artifact writer.
//!
//! Columns are fixed: `Title, Company, Location, Posted Text, Actual Date,
//! Search Query, Job Type, Salary, Description, Link`. A field is quoted
//! only when it contains a comma, a double quote or a line break.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{JobRecord, NOT_AVAILABLE, UploadReceipt};
use crate::traits::Uploader;

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Company")]
    company: &'a str,
    #[serde(rename = "Location")]
    location: &'a str,
    #[serde(rename = "Posted Text")]
    posted_text: &'a str,
    #[serde(rename = "Actual Date")]
    actual_date: String,
    #[serde(rename = "Search Query")]
    search_query: &'a str,
    #[serde(rename = "Job Type")]
    job_type: &'a str,
    #[serde(rename = "Salary")]
    salary: &'a str,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Link")]
    link: &'a str,
}

impl<'a> From<&'a JobRecord> for CsvRow<'a> {
    fn from(record: &'a JobRecord) -> Self {
        let stub = &record.stub;
        let details = record.details.as_ref();
        Self {
            title: &stub.title,
            company: &stub.company,
            location: &stub.location,
            posted_text: &stub.posted_text,
            actual_date: format_actual_date(stub.posted_date),
            search_query: &stub.search_query,
            job_type: details.map_or(NOT_AVAILABLE, |d| d.job_type.as_str()),
            salary: details.map_or(NOT_AVAILABLE, |d| d.salary.as_str()),
            description: details.map_or(NOT_AVAILABLE, |d| d.description.as_str()),
            link: &stub.link,
        }
    }
}

/// Renders a date like `Thu Mar 14 2024`.
pub fn format_actual_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Writes the header row and one row per record.
pub fn write_csv<W: Write>(records: &[JobRecord], writer: W) -> Result<(), AppError> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for record in records {
        wtr.serialize(CsvRow::from(record))?;
    }
    if records.is_empty() {
        wtr.write_record([
            "Title",
            "Company",
            "Location",
            "Posted Text",
            "Actual Date",
            "Search Query",
            "Job Type",
            "Salary",
            "Description",
            "Link",
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Renders the records into an in-memory CSV string.
pub fn to_csv_string(records: &[JobRecord]) -> Result<String, AppError> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    String::from_utf8(buf).map_err(|e| AppError::ExportError(e.to_string()))
}

/// Artifact file name, e.g. `seek-jobs-WITH-DETAILS-2024-03-14T09-05-00.csv`.
pub fn artifact_file_name(with_details: bool, at: DateTime<Utc>) -> String {
    let timestamp = at.format("%Y-%m-%dT%H-%M-%S");
    if with_details {
        format!("seek-jobs-WITH-DETAILS-{timestamp}.csv")
    } else {
        format!("seek-jobs-{timestamp}.csv")
    }
}

/// Writes the artifact to `dir/file_name` and returns its path.
pub fn write_artifact(
    records: &[JobRecord],
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, AppError> {
    let path = dir.join(file_name);
    let file = std::fs::File::create(&path)?;
    write_csv(records, std::io::BufWriter::new(file))?;
    Ok(path)
}

/// Ships a written artifact. A missing uploader or a failed upload is
/// logged and yields `None`; the artifact on disk stays valid either way.
pub async fn upload_artifact<U: Uploader>(
    uploader: Option<&U>,
    path: &Path,
    file_name: &str,
) -> Option<UploadReceipt> {
    let Some(uploader) = uploader else {
        tracing::warn!("No upload credential configured, skipping upload");
        return None;
    };

    match uploader.upload(path, file_name).await {
        Ok(receipt) => {
            tracing::info!(
                path = %receipt.path_display,
                size = %format!("{:.2} KB", receipt.size as f64 / 1024.0),
                "Artifact uploaded"
            );
            Some(receipt)
        }
        Err(e) => {
            tracing::error!(file = file_name, error = %e, "Upload failed");
            None
        }
    }
}
