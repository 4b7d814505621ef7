// Anomaly detector - Isolation forest fitted and scored on a single batch
use crate::application::check_row_count;
use crate::domain::diagnostic::AnomalyLabel;
use crate::domain::error::DiagnosticError;
use crate::domain::telemetry::{FeatureMatrix, NUM_FEATURES};
use rand::Rng;
use rand::seq::index;

pub const DEFAULT_N_ESTIMATORS: usize = 200;
pub const DEFAULT_MAX_SAMPLES: usize = 256;
pub const DEFAULT_CONTAMINATION: f64 = 0.15;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful search in a random BST of `n`
/// nodes, used to normalize isolation depths.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsolationForest {
    n_estimators: usize,
    max_samples: usize,
    contamination: f64,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_samples: DEFAULT_MAX_SAMPLES,
            contamination: DEFAULT_CONTAMINATION,
        }
    }
}

impl IsolationForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    pub fn validate(&self) -> Result<(), DiagnosticError> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(DiagnosticError::InvalidConfig(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }
        if self.n_estimators == 0 {
            return Err(DiagnosticError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.max_samples < 2 {
            return Err(DiagnosticError::InvalidConfig(format!(
                "max_samples must be at least 2, got {}",
                self.max_samples
            )));
        }
        Ok(())
    }

    /// Build the tree ensemble. All randomness is drawn from `rng`.
    pub fn fit<R: Rng>(
        &self,
        matrix: &FeatureMatrix,
        rng: &mut R,
    ) -> Result<IsolationEnsemble, DiagnosticError> {
        self.validate()?;
        check_row_count(matrix.n_rows())?;

        let sample_size = self.max_samples.min(matrix.n_rows());
        let max_depth = (sample_size as f64).log2().ceil() as usize;

        let mut trees = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            let sample = index::sample(rng, matrix.n_rows(), sample_size).into_vec();
            trees.push(IsolationTree::build(matrix, sample, max_depth, rng));
        }

        tracing::debug!(
            "Fitted {} isolation trees (sample size {}, max depth {})",
            self.n_estimators,
            sample_size,
            max_depth
        );

        Ok(IsolationEnsemble { trees, sample_size })
    }

    /// Fit on the batch, score every row of it and label the top
    /// contamination fraction as anomalous.
    pub fn detect<R: Rng>(
        &self,
        matrix: &FeatureMatrix,
        rng: &mut R,
    ) -> Result<Detection, DiagnosticError> {
        let ensemble = self.fit(matrix, rng)?;
        let scores = ensemble.score_all(matrix);
        Ok(Detection::from_scores(&scores, self.contamination))
    }
}

#[derive(Debug, Clone)]
pub struct IsolationEnsemble {
    trees: Vec<IsolationTree>,
    sample_size: usize,
}

impl IsolationEnsemble {
    /// Anomaly score in (0, 1]; shorter average isolation paths score higher.
    pub fn score(&self, row: &[f64; NUM_FEATURES]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.path_length(row)).sum();
        let mean_depth = total / self.trees.len() as f64;
        2f64.powf(-mean_depth / average_path_length(self.sample_size))
    }

    pub fn score_all(&self, matrix: &FeatureMatrix) -> Vec<f64> {
        matrix.rows().iter().map(|row| self.score(row)).collect()
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        value: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

/// Arena-allocated isolation tree; node 0 is the root.
#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn build<R: Rng>(
        matrix: &FeatureMatrix,
        sample: Vec<usize>,
        max_depth: usize,
        rng: &mut R,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(matrix, sample, 0, max_depth, rng);
        tree
    }

    fn grow<R: Rng>(
        &mut self,
        matrix: &FeatureMatrix,
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut R,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: rows.len() });
        if rows.len() <= 1 || depth >= max_depth {
            return id;
        }

        // Only columns with spread inside this node can separate its rows.
        let splittable: Vec<(usize, f64, f64)> = (0..NUM_FEATURES)
            .filter_map(|j| {
                let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                    let v = matrix.row(i)[j];
                    (lo.min(v), hi.max(v))
                });
                (max > min).then_some((j, min, max))
            })
            .collect();
        if splittable.is_empty() {
            return id;
        }

        let (feature, min, max) = splittable[rng.gen_range(0..splittable.len())];
        let value = rng.gen_range(min..max);
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&i| matrix.row(i)[feature] <= value);

        let left = self.grow(matrix, left_rows, depth + 1, max_depth, rng);
        let right = self.grow(matrix, right_rows, depth + 1, max_depth, rng);
        self.nodes[id] = Node::Split {
            feature,
            value,
            left,
            right,
        };
        id
    }

    /// Depth at which `row` lands, plus the expected remaining depth of the
    /// leaf it lands in.
    fn path_length(&self, row: &[f64; NUM_FEATURES]) -> f64 {
        let mut node = 0;
        let mut depth = 0.0;
        loop {
            match self.nodes[node] {
                Node::Split {
                    feature,
                    value,
                    left,
                    right,
                } => {
                    node = if row[feature] <= value { left } else { right };
                    depth += 1.0;
                }
                Node::Leaf { size } => return depth + average_path_length(size),
            }
        }
    }
}

/// Per-row labels of one batch, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub labels: Vec<AnomalyLabel>,
    pub threshold: f64,
    pub anomaly_count: usize,
}

impl Detection {
    /// The threshold is the nearest-rank score of the `ceil(contamination * n)`
    /// highest-scoring row. Rows scoring at or above it are anomalous, except
    /// rows tied with the lowest score in the batch, which are never anomalous.
    pub fn from_scores(scores: &[f64], contamination: f64) -> Self {
        if scores.is_empty() {
            return Self {
                labels: Vec::new(),
                threshold: f64::INFINITY,
                anomaly_count: 0,
            };
        }

        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| b.total_cmp(a));
        let rank = ((contamination * sorted.len() as f64) - 1e-9).ceil() as usize;
        let threshold = sorted[rank.clamp(1, sorted.len()) - 1];
        let baseline = sorted[sorted.len() - 1];

        let labels: Vec<AnomalyLabel> = scores
            .iter()
            .map(|&score| AnomalyLabel {
                anomalous: score >= threshold && score > baseline,
                score,
            })
            .collect();
        let anomaly_count = labels.iter().filter(|l| l.anomalous).count();

        Self {
            labels,
            threshold,
            anomaly_count,
        }
    }

    pub fn anomalous_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.anomalous)
            .map(|(i, _)| i)
    }
}
