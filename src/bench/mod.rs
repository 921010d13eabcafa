//! Strategy × model benchmark grid
//!
//! Runs every resampling strategy against every classifier type on one
//! train/evaluation split and collects the outcomes into a single ranked
//! comparison table. A failing strategy or model skips only its own runs.

use crate::data::{ClassBalance, Dataset};
use crate::error::Result;
use crate::eval::{evaluate, Evaluation};
use crate::models::{
    Classifier, GradientBoostingClassifier, GradientBoostingConfig, LinearDiscriminant,
    LogisticRegression, QuadraticDiscriminant,
};
use crate::resample::{
    IdentitySampler, RandomOverSampler, RandomUnderSampler, ResampleResult, Sampler, Smote,
    SmoteConfig,
};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Training-set derivation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResamplingStrategy {
    Identity,
    UpSample,
    DownSample,
    Smote,
}

impl ResamplingStrategy {
    pub const ALL: [ResamplingStrategy; 4] = [
        ResamplingStrategy::Identity,
        ResamplingStrategy::UpSample,
        ResamplingStrategy::DownSample,
        ResamplingStrategy::Smote,
    ];
}

impl fmt::Display for ResamplingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResamplingStrategy::Identity => write!(f, "identity"),
            ResamplingStrategy::UpSample => write!(f, "up-sample"),
            ResamplingStrategy::DownSample => write!(f, "down-sample"),
            ResamplingStrategy::Smote => write!(f, "smote"),
        }
    }
}

/// Classifier type under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    LogisticRegression,
    LinearDiscriminant,
    QuadraticDiscriminant,
    GradientBoosting,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::LogisticRegression,
        ModelKind::LinearDiscriminant,
        ModelKind::QuadraticDiscriminant,
        ModelKind::GradientBoosting,
    ];
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::LogisticRegression => write!(f, "logistic-regression"),
            ModelKind::LinearDiscriminant => write!(f, "linear-discriminant"),
            ModelKind::QuadraticDiscriminant => write!(f, "quadratic-discriminant"),
            ModelKind::GradientBoosting => write!(f, "gradient-boosting"),
        }
    }
}

/// Benchmark configuration: decision threshold, per-step seeds, and the
/// parameters of the seeded strategies and models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Decision threshold for the confusion matrices
    pub threshold: f64,
    pub upsample_seed: u64,
    pub downsample_seed: u64,
    pub smote_seed: u64,
    pub boosting_seed: u64,
    pub smote: SmoteConfig,
    pub boosting: GradientBoostingConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            upsample_seed: 42,
            downsample_seed: 43,
            smote_seed: 44,
            boosting_seed: 45,
            smote: SmoteConfig::default(),
            boosting: GradientBoostingConfig::default(),
        }
    }
}

impl BenchConfig {
    /// Set the decision threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set SMOTE parameters
    pub fn with_smote(mut self, smote: SmoteConfig) -> Self {
        self.smote = smote;
        self
    }

    /// Set gradient boosting parameters
    pub fn with_boosting(mut self, boosting: GradientBoostingConfig) -> Self {
        self.boosting = boosting;
        self
    }
}

/// Outcome of one (strategy, model) run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunOutcome {
    Completed(Evaluation),
    Skipped { reason: String },
}

/// One cell of the comparison grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub strategy: ResamplingStrategy,
    pub model: ModelKind,
    /// Class balance of the derived training set; None when resampling failed
    pub training_balance: Option<ClassBalance>,
    pub outcome: RunOutcome,
}

impl RunRecord {
    /// AUC of a completed run, if defined
    pub fn auc(&self) -> Option<f64> {
        match &self.outcome {
            RunOutcome::Completed(evaluation) => evaluation.auc,
            RunOutcome::Skipped { .. } => None,
        }
    }
}

/// All runs of one benchmark execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub records: Vec<RunRecord>,
}

impl BenchmarkReport {
    /// Best completed run: maximum defined AUC, ties broken by fewer
    /// false negatives. Runs without a defined AUC never win.
    pub fn best(&self) -> Option<&RunRecord> {
        self.records
            .iter()
            .filter_map(|record| match &record.outcome {
                RunOutcome::Completed(evaluation) => evaluation
                    .auc
                    .map(|auc| (record, auc, evaluation.confusion.false_negatives)),
                RunOutcome::Skipped { .. } => None,
            })
            .max_by(|(_, auc_a, fn_a), (_, auc_b, fn_b)| {
                auc_a
                    .partial_cmp(auc_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| fn_b.cmp(fn_a))
            })
            .map(|(record, _, _)| record)
    }
}

/// Runs the full strategy × model grid
#[derive(Debug, Clone)]
pub struct BenchmarkRunner {
    config: BenchConfig,
}

impl BenchmarkRunner {
    pub fn new(config: BenchConfig) -> Self {
        Self { config }
    }

    /// Execute every (strategy, model) combination
    pub fn run(&self, train: &Dataset, evaluation: &Dataset) -> BenchmarkReport {
        let eval_x = evaluation.features();
        let eval_y: Array1<f64> = evaluation.labels().mapv(|v| v as f64);

        let mut records =
            Vec::with_capacity(ResamplingStrategy::ALL.len() * ModelKind::ALL.len());

        for strategy in ResamplingStrategy::ALL {
            match self.resample(strategy, train) {
                Err(err) => {
                    warn!(strategy = %strategy, error = %err, "resampling failed, skipping its runs");
                    for model in ModelKind::ALL {
                        records.push(RunRecord {
                            strategy,
                            model,
                            training_balance: None,
                            outcome: RunOutcome::Skipped {
                                reason: err.to_string(),
                            },
                        });
                    }
                }
                Ok(resampled) => {
                    let balance = ClassBalance::from_labels(&resampled.y);
                    let train_y: Array1<f64> = resampled.y.mapv(|v| v as f64);

                    for model in ModelKind::ALL {
                        let outcome =
                            match self.run_model(model, &resampled.x, &train_y, eval_x, &eval_y) {
                                Ok(evaluation) => RunOutcome::Completed(evaluation),
                                Err(err) => {
                                    warn!(strategy = %strategy, model = %model, error = %err, "run failed");
                                    RunOutcome::Skipped {
                                        reason: err.to_string(),
                                    }
                                }
                            };
                        records.push(RunRecord {
                            strategy,
                            model,
                            training_balance: Some(balance.clone()),
                            outcome,
                        });
                    }
                }
            }
        }

        info!(runs = records.len(), "benchmark grid complete");
        BenchmarkReport { records }
    }

    fn resample(&self, strategy: ResamplingStrategy, train: &Dataset) -> Result<ResampleResult> {
        let x = train.features();
        let y = train.labels();

        match strategy {
            ResamplingStrategy::Identity => IdentitySampler.fit_resample(x, y),
            ResamplingStrategy::UpSample => RandomOverSampler::new()
                .with_seed(self.config.upsample_seed)
                .fit_resample(x, y),
            ResamplingStrategy::DownSample => RandomUnderSampler::new()
                .with_seed(self.config.downsample_seed)
                .fit_resample(x, y),
            ResamplingStrategy::Smote => Smote::new(self.config.smote.clone())
                .with_seed(self.config.smote_seed)
                .fit_resample(x, y),
        }
    }

    fn run_model(
        &self,
        kind: ModelKind,
        train_x: &Array2<f64>,
        train_y: &Array1<f64>,
        eval_x: &Array2<f64>,
        eval_y: &Array1<f64>,
    ) -> Result<Evaluation> {
        let scores = match kind {
            ModelKind::LogisticRegression => {
                let mut model = LogisticRegression::new();
                model.fit(train_x, train_y)?;
                model.predict_proba(eval_x)?
            }
            ModelKind::LinearDiscriminant => {
                let mut model = LinearDiscriminant::new();
                model.fit(train_x, train_y)?;
                model.predict_proba(eval_x)?
            }
            ModelKind::QuadraticDiscriminant => {
                let mut model = QuadraticDiscriminant::new();
                model.fit(train_x, train_y)?;
                model.predict_proba(eval_x)?
            }
            ModelKind::GradientBoosting => {
                let config = GradientBoostingConfig {
                    random_state: Some(self.config.boosting_seed),
                    ..self.config.boosting.clone()
                };
                let mut model = GradientBoostingClassifier::new(config);
                model.fit(train_x, train_y)?;
                model.predict_proba(eval_x)?
            }
        };

        evaluate(eval_y, &scores, self.config.threshold)
    }
}
