// Telemetry batch domain models

/// Number of columns in the detection feature vector.
pub const NUM_FEATURES: usize = 6;

/// Detection feature columns, in the fixed order used by every matrix.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "rpm_residual",
    "temp_residual",
    "load_residual",
    "voltage_residual",
    "missing_can_frames",
    "can_interval_std",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    RpmResidual,
    TempResidual,
    LoadResidual,
    VoltageResidual,
    MissingCanFrames,
    CanIntervalStd,
}

impl Feature {
    pub const ALL: [Feature; NUM_FEATURES] = [
        Feature::RpmResidual,
        Feature::TempResidual,
        Feature::LoadResidual,
        Feature::VoltageResidual,
        Feature::MissingCanFrames,
        Feature::CanIntervalStd,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn column(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }
}

/// One telemetry sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub rpm_residual: f64,
    pub temp_residual: f64,
    pub load_residual: f64,
    pub voltage_residual: f64,
    pub missing_can_frames: u64,
    pub can_interval_std: f64,
}

impl Record {
    /// Reads a row of a raw (unscaled) feature matrix.
    ///
    /// `missing_can_frames` must already be a non-negative whole number; the
    /// feature extractor rejects anything else, so only validated rows reach
    /// here.
    pub fn from_features(values: &[f64; NUM_FEATURES]) -> Self {
        let frames = values[Feature::MissingCanFrames.index()];
        debug_assert!(
            frames >= 0.0 && frames.fract() == 0.0 && frames <= u64::MAX as f64,
            "missing_can_frames must be a whole non-negative count, got {frames}"
        );
        Self {
            rpm_residual: values[0],
            temp_residual: values[1],
            load_residual: values[2],
            voltage_residual: values[3],
            missing_can_frames: values[4] as u64,
            can_interval_std: values[5],
        }
    }
}

#[cfg(test)]
impl Record {
    pub fn features(&self) -> [f64; NUM_FEATURES] {
        [
            self.rpm_residual,
            self.temp_residual,
            self.load_residual,
            self.voltage_residual,
            self.missing_can_frames as f64,
            self.can_interval_std,
        ]
    }
}

/// Tabular batch as ingested: named columns of raw cells, rows in source order.
///
/// Cells stay untyped until the feature extractor projects them, so schema
/// problems surface as typed failures from the core rather than at intake.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
impl Dataset {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn from_records(records: &[Record]) -> Self {
        let columns = FEATURE_NAMES.iter().map(|c| c.to_string()).collect();
        let rows = records
            .iter()
            .map(|r| r.features().iter().map(|v| v.to_string()).collect())
            .collect();
        Self::new(columns, rows)
    }
}

/// Dense row-major matrix over the six detection features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    rows: Vec<[f64; NUM_FEATURES]>,
}

impl FeatureMatrix {
    pub fn new(rows: Vec<[f64; NUM_FEATURES]>) -> Self {
        Self { rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> &[f64; NUM_FEATURES] {
        &self.rows[index]
    }

    pub fn rows(&self) -> &[[f64; NUM_FEATURES]] {
        &self.rows
    }

    pub fn record(&self, index: usize) -> Record {
        Record::from_features(&self.rows[index])
    }
}

#[cfg(test)]
impl FeatureMatrix {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, feature: Feature) -> impl Iterator<Item = f64> + '_ {
        let j = feature.index();
        self.rows.iter().map(move |row| row[j])
    }
}
