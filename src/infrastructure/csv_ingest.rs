// CSV ingestion - Turns an uploaded file into a raw dataset
use crate::domain::telemetry::Dataset;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IngestError {
    #[error("unsupported file '{filename}': only .csv uploads are accepted")]
    UnsupportedExtension { filename: String },

    #[error("upload '{filename}' is empty")]
    EmptyUpload { filename: String },

    #[error("malformed CSV at line {line}: {message}")]
    Csv { line: u64, message: String },
}

/// Parse an uploaded delimited file. Column names and row order are kept as
/// they appear; cells are trimmed but otherwise left untyped.
pub fn parse_upload(filename: &str, bytes: &[u8]) -> Result<Dataset, IngestError> {
    if !filename.to_ascii_lowercase().ends_with(".csv") {
        return Err(IngestError::UnsupportedExtension {
            filename: filename.to_string(),
        });
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::EmptyUpload {
            filename: filename.to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    tracing::debug!(
        "Parsed {}: {} columns, {} rows",
        filename,
        columns.len(),
        rows.len()
    );
    Ok(Dataset::new(columns, rows))
}

fn csv_error(err: csv::Error) -> IngestError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    IngestError::Csv {
        line,
        message: err.to_string(),
    }
}
