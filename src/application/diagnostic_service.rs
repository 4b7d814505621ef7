// Diagnostic service - Use case for diagnosing one telemetry batch
use crate::application::{attribution, feature_extractor, normalizer, severity};
use crate::domain::diagnostic::{DiagnosticResult, Severity};
use crate::domain::error::DiagnosticError;
use crate::domain::telemetry::Dataset;
use crate::infrastructure::config::DetectorConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct DiagnosticService {
    config: DetectorConfig,
}

impl DiagnosticService {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline on one batch with a generator seeded from config.
    pub fn diagnose(&self, dataset: &Dataset) -> Result<DiagnosticResult, DiagnosticError> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.diagnose_with_rng(dataset, &mut rng)
    }

    pub fn diagnose_with_rng<R: Rng>(
        &self,
        dataset: &Dataset,
        rng: &mut R,
    ) -> Result<DiagnosticResult, DiagnosticError> {
        let start_time = Instant::now();
        let forest = self.config.forest();
        forest.validate()?;

        let raw = feature_extractor::extract(dataset)?;
        let (scaled, _) = normalizer::normalize(&raw)?;
        let detection = forest.detect(&scaled, rng)?;

        let sensor_issues = attribution::attribute(&raw, &detection);
        let top = sensor_issues.top().copied();
        let severity = severity::classify(top.as_ref());

        tracing::info!(
            "Diagnosed {} rows: {} anomalous (threshold {:.4}), top sensor {:?}, severity {:?} in {}ms",
            raw.n_rows(),
            detection.anomaly_count,
            detection.threshold,
            top.map(|t| t.sensor.display_name()),
            severity.map(Severity::as_str),
            start_time.elapsed().as_millis()
        );

        for issue in sensor_issues.iter() {
            tracing::debug!("{}: mean |residual| {:.4}", issue.sensor, issue.magnitude);
        }

        Ok(DiagnosticResult {
            total: Some(raw.n_rows()),
            anomaly_count: Some(detection.anomaly_count),
            sensor_issues,
            top_sensor: top.map(|t| t.sensor),
            severity,
            recommendation: severity.map(Severity::recommendation),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::SchemaError;
    use crate::domain::sensor::SensorChannel;
    use crate::domain::telemetry::Record;

    fn baseline() -> Record {
        Record {
            rpm_residual: 1.0,
            temp_residual: 1.0,
            load_residual: 1.0,
            voltage_residual: 1.0,
            missing_can_frames: 1,
            can_interval_std: 1.0,
        }
    }

    fn rpm_fault_batch() -> Dataset {
        let records: Vec<Record> = (0..10)
            .map(|i| Record {
                rpm_residual: if i < 2 { 50.0 } else { 1.0 },
                ..baseline()
            })
            .collect();
        Dataset::from_records(&records)
    }

    fn service() -> DiagnosticService {
        DiagnosticService::new(DetectorConfig::default())
    }

    #[test]
    fn test_rpm_fault_is_attributed_with_high_severity() {
        let result = service().diagnose(&rpm_fault_batch()).unwrap();

        assert_eq!(result.total, Some(10));
        assert_eq!(result.anomaly_count, Some(2));
        assert_eq!(result.top_sensor, Some(SensorChannel::EngineRpm));
        assert_eq!(result.sensor_issues.magnitude_of(SensorChannel::EngineRpm), Some(50.0));
        assert_eq!(result.sensor_issues.magnitude_of(SensorChannel::EngineTemperature), Some(1.0));
        assert_eq!(result.severity, Some(Severity::High));
        assert_eq!(
            result.recommendation,
            Some("Immediate inspection required. Vehicle operation may be unsafe.")
        );
    }

    #[test]
    fn test_near_identical_batch_has_no_anomalies() {
        let records: Vec<Record> = (0..20)
            .map(|i| {
                let jitter = i as f64 * 1e-12;
                Record {
                    rpm_residual: 0.5 + jitter,
                    temp_residual: -0.25 + jitter,
                    load_residual: 2.0 - jitter,
                    voltage_residual: 0.1 + jitter,
                    missing_can_frames: 2,
                    can_interval_std: 0.03 + jitter,
                }
            })
            .collect();

        let result = service().diagnose(&Dataset::from_records(&records)).unwrap();

        assert_eq!(result.total, Some(20));
        assert_eq!(result.anomaly_count, Some(0));
        assert!(result.sensor_issues.is_empty());
        assert_eq!(result.top_sensor, None);
        assert_eq!(result.severity, None);
        assert_eq!(result.recommendation, None);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let records: Vec<Record> = (0..40)
            .map(|i| {
                let t = i as f64;
                Record {
                    rpm_residual: (t * 0.9).sin() * 3.0,
                    temp_residual: (t * 0.4).cos() * 2.0 + if i == 17 { 30.0 } else { 0.0 },
                    load_residual: (t * 1.3).sin(),
                    voltage_residual: (t * 0.2).cos() * 0.5,
                    missing_can_frames: (i % 4) as u64,
                    can_interval_std: 0.02 + (t * 0.7).sin().abs() * 0.01,
                }
            })
            .collect();
        let dataset = Dataset::from_records(&records);

        let first = service().diagnose(&dataset).unwrap();
        let second = service().diagnose(&dataset).unwrap();
        assert_eq!(first, second);
        assert!(first.anomaly_count.unwrap() >= 6);
    }

    #[test]
    fn test_large_batch_with_periodic_rpm_fault() {
        let records: Vec<Record> = (0..600)
            .map(|i| {
                let t = i as f64;
                Record {
                    rpm_residual: if i % 100 == 0 { 200.0 } else { (t * 0.9).sin() },
                    temp_residual: (t * 0.4).cos(),
                    load_residual: (t * 1.3).sin() * 0.8,
                    voltage_residual: (t * 0.2).cos() * 0.5,
                    missing_can_frames: (i % 4) as u64,
                    can_interval_std: 0.02 + (t * 0.7).sin().abs() * 0.01,
                }
            })
            .collect();

        let result = service().diagnose(&Dataset::from_records(&records)).unwrap();

        assert_eq!(result.total, Some(600));
        assert!(result.anomaly_count.unwrap() >= 90);
        assert_eq!(result.top_sensor, Some(SensorChannel::EngineRpm));
        assert!(result.severity.is_some());
    }

    #[test]
    fn test_missing_column_fails_before_detection() {
        let dataset = Dataset::new(
            vec!["rpm_residual".to_string()],
            vec![vec!["1".to_string()], vec!["2".to_string()]],
        );

        assert_eq!(
            service().diagnose(&dataset),
            Err(DiagnosticError::Schema(SchemaError::MissingColumn {
                column: "temp_residual"
            }))
        );
    }

    #[test]
    fn test_row_count_preconditions() {
        assert_eq!(
            service().diagnose(&Dataset::from_records(&[])),
            Err(DiagnosticError::EmptyDataset)
        );
        assert_eq!(
            service().diagnose(&Dataset::from_records(&[baseline()])),
            Err(DiagnosticError::InsufficientData { rows: 1, minimum: 2 })
        );
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let service = DiagnosticService::new(DetectorConfig {
            contamination: 0.0,
            ..DetectorConfig::default()
        });

        assert!(matches!(
            service.diagnose(&rpm_fault_batch()),
            Err(DiagnosticError::InvalidConfig(_))
        ));
    }
}
