// Attribution engine - Ranks sensors by residual magnitude over anomalous rows
use crate::application::anomaly_detector::Detection;
use crate::domain::diagnostic::{SensorIssue, SensorIssueReport};
use crate::domain::sensor::SensorChannel;
use crate::domain::telemetry::FeatureMatrix;

/// Mean absolute residual per sensor, restricted to rows labeled anomalous.
///
/// `raw` must be the unscaled matrix the detection was computed from. Returns
/// an empty report when nothing was flagged.
pub fn attribute(raw: &FeatureMatrix, detection: &Detection) -> SensorIssueReport {
    debug_assert_eq!(raw.n_rows(), detection.labels.len());

    let anomalous: Vec<usize> = detection.anomalous_rows().collect();
    if anomalous.is_empty() {
        return SensorIssueReport::empty();
    }

    let count = anomalous.len() as f64;
    let issues = SensorChannel::ALL
        .iter()
        .map(|&sensor| {
            let total: f64 = anomalous
                .iter()
                .map(|&i| sensor.residual(&raw.record(i)).abs())
                .sum();
            SensorIssue {
                sensor,
                magnitude: total / count,
            }
        })
        .collect();

    SensorIssueReport::ranked(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagnostic::AnomalyLabel;
    use crate::domain::telemetry::NUM_FEATURES;

    fn detection(flags: &[bool]) -> Detection {
        let labels: Vec<AnomalyLabel> = flags
            .iter()
            .map(|&anomalous| AnomalyLabel {
                anomalous,
                score: if anomalous { 0.8 } else { 0.4 },
            })
            .collect();
        let anomaly_count = flags.iter().filter(|&&f| f).count();
        Detection {
            labels,
            threshold: 0.8,
            anomaly_count,
        }
    }

    #[test]
    fn test_mean_absolute_residual_over_anomalous_rows_only() {
        let raw = FeatureMatrix::new(vec![
            [10.0, -2.0, 1.0, 0.0, 5.0, 0.1],
            [-20.0, 4.0, -1.0, 0.5, 5.0, 0.1],
            [1000.0, 1000.0, 1000.0, 1000.0, 0.0, 0.0],
        ]);

        let report = attribute(&raw, &detection(&[true, true, false]));

        assert_eq!(report.len(), 4);
        assert_eq!(report.magnitude_of(SensorChannel::EngineRpm), Some(15.0));
        assert_eq!(report.magnitude_of(SensorChannel::EngineTemperature), Some(3.0));
        assert_eq!(report.magnitude_of(SensorChannel::EngineLoad), Some(1.0));
        assert_eq!(report.magnitude_of(SensorChannel::BatteryVoltage), Some(0.25));
        assert_eq!(report.top().map(|e| e.sensor), Some(SensorChannel::EngineRpm));
    }

    #[test]
    fn test_equal_magnitudes_keep_fixed_sensor_order() {
        let raw = FeatureMatrix::new(vec![[3.0; NUM_FEATURES], [0.0; NUM_FEATURES]]);

        let report = attribute(&raw, &detection(&[true, false]));
        let order: Vec<_> = report.iter().map(|e| e.sensor).collect();
        assert_eq!(order, SensorChannel::ALL.to_vec());
    }

    #[test]
    fn test_no_anomalies_gives_empty_report() {
        let raw = FeatureMatrix::new(vec![[3.0; NUM_FEATURES], [0.0; NUM_FEATURES]]);

        let report = attribute(&raw, &detection(&[false, false]));
        assert!(report.is_empty());
        assert!(report.top().is_none());
    }
}
