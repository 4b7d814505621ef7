// Diagnostic result domain models
use super::sensor::SensorChannel;
use serde::Serialize;

/// Detector verdict for one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyLabel {
    pub anomalous: bool,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorIssue {
    pub sensor: SensorChannel,
    pub magnitude: f64,
}

/// Sensors ranked by mean absolute residual over anomalous rows, largest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SensorIssueReport {
    entries: Vec<SensorIssue>,
}

impl SensorIssueReport {
    /// Sorts by descending magnitude. The sort is stable, so equal magnitudes
    /// keep the order they were given in.
    pub fn ranked(mut entries: Vec<SensorIssue>) -> Self {
        entries.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn top(&self) -> Option<&SensorIssue> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorIssue> {
        self.entries.iter()
    }
}

#[cfg(test)]
impl SensorIssueReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn magnitude_of(&self, sensor: SensorChannel) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.sensor == sensor)
            .map(|e| e.magnitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Severity::High => "Immediate inspection required. Vehicle operation may be unsafe.",
            Severity::Medium => "Schedule maintenance soon to avoid system failure.",
            Severity::Low => "Monitor sensor behavior during next vehicle cycle.",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final output of one diagnostic run.
///
/// `total` and `anomaly_count` are set whenever a batch was processed. The
/// attribution fields stay empty unless at least one row was anomalous.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagnosticResult {
    pub total: Option<usize>,
    pub anomaly_count: Option<usize>,
    pub sensor_issues: SensorIssueReport,
    pub top_sensor: Option<SensorChannel>,
    pub severity: Option<Severity>,
    pub recommendation: Option<&'static str>,
}

impl DiagnosticResult {
    /// State before any batch has been submitted.
    pub fn not_processed() -> Self {
        Self::default()
    }
}
