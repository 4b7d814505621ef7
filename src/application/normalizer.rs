// Normalizer - Per-batch z-score scaling of the feature matrix
use crate::application::check_row_count;
use crate::domain::error::DiagnosticError;
use crate::domain::telemetry::{FeatureMatrix, NUM_FEATURES};

/// Columns whose spread is below this fraction of their magnitude are treated
/// as constant.
///
/// "Near-identical" rows means identical up to this tolerance: a std within
/// `1e-9 * max(1, |mean|)` is rounding noise and scales to 0. Anything wider,
/// such as 1e-6 jitter, is real spread and gets unit variance like any
/// other column, so a batch of such rows can still yield anomalies.
const ZERO_VARIANCE_TOLERANCE: f64 = 1e-9;

/// Per-column mean and population standard deviation of one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationParams {
    pub means: [f64; NUM_FEATURES],
    pub stds: [f64; NUM_FEATURES],
}

impl NormalizationParams {
    pub fn fit(matrix: &FeatureMatrix) -> Result<Self, DiagnosticError> {
        check_row_count(matrix.n_rows())?;
        let n = matrix.n_rows() as f64;

        let mut means = [0.0; NUM_FEATURES];
        for row in matrix.rows() {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut stds = [0.0; NUM_FEATURES];
        for row in matrix.rows() {
            for j in 0..NUM_FEATURES {
                let delta = row[j] - means[j];
                stds[j] += delta * delta;
            }
        }
        for std in &mut stds {
            *std = (*std / n).sqrt();
        }

        Ok(Self { means, stds })
    }

    fn is_constant(&self, column: usize) -> bool {
        self.stds[column] <= ZERO_VARIANCE_TOLERANCE * self.means[column].abs().max(1.0)
    }

    /// Scale every entry to `(value - mean) / std`; constant columns scale to 0.
    pub fn transform(&self, matrix: &FeatureMatrix) -> FeatureMatrix {
        let rows = matrix
            .rows()
            .iter()
            .map(|row| {
                let mut scaled = [0.0; NUM_FEATURES];
                for j in 0..NUM_FEATURES {
                    if !self.is_constant(j) {
                        scaled[j] = (row[j] - self.means[j]) / self.stds[j];
                    }
                }
                scaled
            })
            .collect();
        FeatureMatrix::new(rows)
    }
}

/// Fit on the batch and scale it. Parameters never outlive the call.
pub fn normalize(matrix: &FeatureMatrix) -> Result<(FeatureMatrix, NormalizationParams), DiagnosticError> {
    let params = NormalizationParams::fit(matrix)?;
    let constant: Vec<usize> = (0..NUM_FEATURES).filter(|&j| params.is_constant(j)).collect();
    if !constant.is_empty() {
        tracing::debug!("Constant feature columns scaled to zero: {:?}", constant);
    }
    Ok((params.transform(matrix), params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::Feature;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_scaled_columns_have_zero_mean_unit_variance() {
        let matrix = FeatureMatrix::new(vec![
            [1.0, 10.0, -2.0, 0.5, 0.0, 0.1],
            [2.0, 20.0, -4.0, 0.7, 3.0, 0.2],
            [3.0, 30.0, -6.0, 0.9, 9.0, 0.6],
            [6.0, 40.0, -8.0, 0.1, 0.0, 0.3],
        ]);

        let (scaled, params) = normalize(&matrix).unwrap();
        assert_close(params.means[0], 3.0);

        for feature in Feature::ALL {
            let column: Vec<f64> = scaled.column(feature).collect();
            let mean = column.iter().sum::<f64>() / 4.0;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
            assert_close(mean, 0.0);
            assert_close(var, 1.0);
        }
    }

    #[test]
    fn test_standardized_input_is_unchanged() {
        let matrix = FeatureMatrix::new(vec![[1.0; NUM_FEATURES], [-1.0; NUM_FEATURES]]);

        let (scaled, _) = normalize(&matrix).unwrap();
        for (a, b) in scaled.rows().iter().zip(matrix.rows()) {
            for j in 0..NUM_FEATURES {
                assert_close(a[j], b[j]);
            }
        }
    }

    #[test]
    fn test_constant_column_scales_to_zero() {
        let matrix = FeatureMatrix::new(vec![
            [1.0, 5.0, 0.0, 0.0, 2.0, 0.1],
            [2.0, 5.0, 0.0, 0.0, 2.0, 0.1],
            [3.0, 5.0, 0.0, 0.0, 2.0, 0.1],
        ]);

        let (scaled, params) = normalize(&matrix).unwrap();
        assert_eq!(params.stds[1], 0.0);
        for row in scaled.rows() {
            assert_eq!(&row[1..], &[0.0; 5]);
            assert!(row[0].is_finite());
        }
    }

    #[test]
    fn test_near_constant_column_scales_to_zero() {
        let matrix = FeatureMatrix::new(
            (0..5)
                .map(|i| [100.0 + i as f64 * 1e-12, 1.0, 1.0, 1.0, 0.0, 0.0])
                .collect(),
        );

        let (scaled, _) = normalize(&matrix).unwrap();
        assert!(scaled.rows().iter().all(|row| row == &[0.0; NUM_FEATURES]));
    }

    #[test]
    fn test_jitter_above_tolerance_is_still_scaled() {
        let matrix = FeatureMatrix::new(
            (0..5)
                .map(|i| [0.5 + i as f64 * 1e-6, 1.0, 1.0, 1.0, 0.0, 0.0])
                .collect(),
        );

        let (scaled, params) = normalize(&matrix).unwrap();
        assert!(!params.is_constant(0));
        let column: Vec<f64> = scaled.column(Feature::RpmResidual).collect();
        let var = column.iter().map(|v| v * v).sum::<f64>() / 5.0;
        assert!((var - 1.0).abs() < 1e-6, "variance {var}");
        assert!(params.is_constant(1));
    }

    #[test]
    fn test_fit_requires_two_rows() {
        assert_eq!(
            NormalizationParams::fit(&FeatureMatrix::default()),
            Err(DiagnosticError::EmptyDataset)
        );
        assert_eq!(
            NormalizationParams::fit(&FeatureMatrix::new(vec![[0.0; NUM_FEATURES]])),
            Err(DiagnosticError::InsufficientData { rows: 1, minimum: 2 })
        );
    }
}
