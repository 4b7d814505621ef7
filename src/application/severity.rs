// Severity classifier - Maps the top sensor magnitude to a tier
use crate::domain::diagnostic::{SensorIssue, Severity};

pub const HIGH_THRESHOLD: f64 = 15.0;
pub const MEDIUM_THRESHOLD: f64 = 8.0;

pub fn classify_magnitude(magnitude: f64) -> Severity {
    if magnitude > HIGH_THRESHOLD {
        Severity::High
    } else if magnitude > MEDIUM_THRESHOLD {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// No top sensor means nothing was anomalous, which has no tier at all.
pub fn classify(top: Option<&SensorIssue>) -> Option<Severity> {
    top.map(|issue| classify_magnitude(issue.magnitude))
}
