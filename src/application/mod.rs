// Application layer - Detection and attribution pipeline
pub mod anomaly_detector;
pub mod attribution;
pub mod diagnostic_service;
pub mod feature_extractor;
pub mod normalizer;
pub mod severity;

use crate::domain::error::DiagnosticError;

/// Smallest batch a model can be fitted on.
pub const MIN_ROWS: usize = 2;

pub(crate) fn check_row_count(rows: usize) -> Result<(), DiagnosticError> {
    match rows {
        0 => Err(DiagnosticError::EmptyDataset),
        n if n < MIN_ROWS => Err(DiagnosticError::InsufficientData {
            rows: n,
            minimum: MIN_ROWS,
        }),
        _ => Ok(()),
    }
}
