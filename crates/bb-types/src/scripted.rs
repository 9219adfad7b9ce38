//! Deterministic arms that replay scripted metric curves.
//!
//! Useful wherever a real trainer would be too slow or too noisy: unit tests,
//! demos, and reproducing a strategy decision by hand.

use serde::{Deserialize, Serialize};

use crate::arm::{Arm, ArmStats, MetricChannel, MetricMode};
use crate::errors::{ArmError, BanditResult};

/// Shape of a metric curve, evaluated at 1-based pull steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricScript {
    Constant(f64),
    /// `start + slope * step`
    Linear { start: f64, slope: f64 },
    /// `start * exp(-rate * step)`
    Decay { start: f64, rate: f64 },
    /// Explicit values, cycled once exhausted.
    Sequence(Vec<f64>),
}

impl MetricScript {
    pub fn value_at(&self, step: usize) -> Option<f64> {
        let s = step as f64;
        match self {
            Self::Constant(v) => Some(*v),
            Self::Linear { start, slope } => Some(start + slope * s),
            Self::Decay { start, rate } => Some(start * (-rate * s).exp()),
            Self::Sequence(values) => {
                if values.is_empty() {
                    None
                } else {
                    Some(values[(step.saturating_sub(1)) % values.len()])
                }
            }
        }
    }
}

/// An [`Arm`] whose training and validation metrics follow fixed scripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedArm {
    training: MetricScript,
    validation: MetricScript,
    stats: ArmStats,
}

impl ScriptedArm {
    pub fn new(training: MetricScript, validation: MetricScript) -> Self {
        Self {
            training,
            validation,
            stats: ArmStats::new(),
        }
    }

    /// Both channels follow the same script.
    pub fn uniform(script: MetricScript) -> Self {
        Self::new(script.clone(), script)
    }
}

impl Arm for ScriptedArm {
    fn pull(&mut self) -> BanditResult<()> {
        let step = self.stats.pulls() + 1;
        let training = self
            .training
            .value_at(step)
            .ok_or_else(|| ArmError::PullFailed {
                message: "training script is empty".to_string(),
            })?;
        let validation = self
            .validation
            .value_at(step)
            .ok_or_else(|| ArmError::PullFailed {
                message: "validation script is empty".to_string(),
            })?;
        self.stats.record(training, validation);
        Ok(())
    }

    fn current_metric(&self, channel: MetricChannel, mode: MetricMode) -> Option<f64> {
        self.stats.current(channel, mode)
    }

    fn metric_history(&self, channel: MetricChannel) -> &[f64] {
        self.stats.history(channel)
    }

    fn num_pulls(&self) -> usize {
        self.stats.pulls()
    }

    fn reset(&mut self) {
        self.stats.clear();
    }
}
