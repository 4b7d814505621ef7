// Feature extractor - Projects a raw dataset onto the detection feature vector
use crate::domain::error::SchemaError;
use crate::domain::telemetry::{Dataset, Feature, FeatureMatrix, NUM_FEATURES};

/// Select the six detection columns, in fixed order, as a dense matrix.
pub fn extract(dataset: &Dataset) -> Result<FeatureMatrix, SchemaError> {
    let mut indices = [0usize; NUM_FEATURES];
    for feature in Feature::ALL {
        indices[feature.index()] = dataset
            .column_index(feature.column())
            .ok_or(SchemaError::MissingColumn {
                column: feature.column(),
            })?;
    }

    let mut rows = Vec::with_capacity(dataset.len());
    for (row_idx, cells) in dataset.rows().enumerate() {
        let mut values = [0.0; NUM_FEATURES];
        for feature in Feature::ALL {
            let cell = cells.get(indices[feature.index()]).map(String::as_str).unwrap_or("");
            values[feature.index()] = parse_cell(feature, row_idx, cell)?;
        }
        rows.push(values);
    }

    tracing::debug!("Extracted {} rows x {} features", rows.len(), NUM_FEATURES);
    Ok(FeatureMatrix::new(rows))
}

fn parse_cell(feature: Feature, row: usize, cell: &str) -> Result<f64, SchemaError> {
    let column = feature.column();
    let value = cell
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SchemaError::NonNumeric {
            column,
            row,
            value: cell.to_string(),
        })?;

    match feature {
        Feature::MissingCanFrames | Feature::CanIntervalStd if value < 0.0 => {
            Err(SchemaError::Negative { column, row, value })
        }
        Feature::MissingCanFrames if value.fract() != 0.0 => {
            Err(SchemaError::Fractional { column, row, value })
        }
        _ => Ok(value),
    }
}
