//! The arm contract consumed by every search strategy.
//!
//! An arm is one candidate configuration that is trained incrementally. The
//! search layer only ever talks to arms through the [`Arm`] trait, so a pool
//! can mix arms of different underlying model families.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{BanditResult, SearchError};

/// Identifies an arm within a pool: a model family plus an instance id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArmKey {
    pub family: String,
    pub instance: u32,
}

impl ArmKey {
    pub fn new(family: impl Into<String>, instance: u32) -> Self {
        Self {
            family: family.into(),
            instance,
        }
    }
}

impl fmt::Display for ArmKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.family, self.instance)
    }
}

/// Which metric stream of an arm to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricChannel {
    Training,
    Validation,
}

impl fmt::Display for MetricChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricChannel::Training => write!(f, "training"),
            MetricChannel::Validation => write!(f, "validation"),
        }
    }
}

/// How a channel is summarised into a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricMode {
    /// The value observed on the most recent pull.
    Latest,
    /// The highest value observed since the last reset.
    BestSoFar,
}

/// Capability interface every arm exposes to the search layer.
///
/// Implementations own their configuration and training state. `reset`
/// must return the arm to its just-constructed statistical state without
/// discarding the configuration, so pools can hand the same arm out again.
pub trait Arm: Send {
    /// Perform one unit of incremental work and record the resulting metrics.
    fn pull(&mut self) -> BanditResult<()>;

    /// Current value of a metric channel, `None` before the first pull.
    fn current_metric(&self, channel: MetricChannel, mode: MetricMode) -> Option<f64>;

    /// Every value observed on `channel` since the last reset, in pull order.
    fn metric_history(&self, channel: MetricChannel) -> &[f64];

    fn num_pulls(&self) -> usize;

    fn reset(&mut self);
}

/// A keyed, mutably borrowed arm handed to a strategy for one episode.
pub struct ArmSlot<'a> {
    pub key: ArmKey,
    pub arm: &'a mut dyn Arm,
}

impl<'a> ArmSlot<'a> {
    pub fn new(key: ArmKey, arm: &'a mut dyn Arm) -> Self {
        Self { key, arm }
    }

    pub fn pull(&mut self) -> BanditResult<()> {
        self.arm.pull()
    }

    /// Read a metric, failing if the arm has not produced one yet.
    pub fn metric(&self, channel: MetricChannel, mode: MetricMode) -> BanditResult<f64> {
        self.arm.current_metric(channel, mode).ok_or_else(|| {
            SearchError::MissingMetric {
                key: self.key.to_string(),
                channel,
            }
            .into()
        })
    }

    pub fn num_pulls(&self) -> usize {
        self.arm.num_pulls()
    }
}

impl fmt::Debug for ArmSlot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmSlot")
            .field("key", &self.key)
            .field("num_pulls", &self.arm.num_pulls())
            .finish()
    }
}

/// Running per-channel history for arm implementations.
///
/// Arms typically embed one of these and call [`ArmStats::record`] at the end
/// of every pull; the `Arm` trait methods then delegate to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmStats {
    pulls: usize,
    training: Vec<f64>,
    validation: Vec<f64>,
}

impl ArmStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, training: f64, validation: f64) {
        self.pulls += 1;
        self.training.push(training);
        self.validation.push(validation);
    }

    pub fn current(&self, channel: MetricChannel, mode: MetricMode) -> Option<f64> {
        let history = self.history(channel);
        match mode {
            MetricMode::Latest => history.last().copied(),
            MetricMode::BestSoFar => history.iter().copied().reduce(f64::max),
        }
    }

    pub fn history(&self, channel: MetricChannel) -> &[f64] {
        match channel {
            MetricChannel::Training => &self.training,
            MetricChannel::Validation => &self.validation,
        }
    }

    pub fn pulls(&self) -> usize {
        self.pulls
    }

    pub fn clear(&mut self) {
        self.pulls = 0;
        self.training.clear();
        self.validation.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_key_display_and_ordering() {
        let a = ArmKey::new("logreg", 2);
        let b = ArmKey::new("logreg", 10);
        let c = ArmKey::new("svm", 0);
        assert_eq!(a.to_string(), "logreg/2");
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn stats_latest_and_best() {
        let mut stats = ArmStats::new();
        assert_eq!(stats.current(MetricChannel::Training, MetricMode::Latest), None);

        stats.record(0.4, 0.2);
        stats.record(0.9, 0.5);
        stats.record(0.6, 0.3);

        assert_eq!(stats.pulls(), 3);
        assert_eq!(stats.current(MetricChannel::Training, MetricMode::Latest), Some(0.6));
        assert_eq!(stats.current(MetricChannel::Training, MetricMode::BestSoFar), Some(0.9));
        assert_eq!(stats.current(MetricChannel::Validation, MetricMode::BestSoFar), Some(0.5));
        assert_eq!(stats.history(MetricChannel::Validation), &[0.2, 0.5, 0.3]);
    }

    #[test]
    fn stats_clear_resets_everything() {
        let mut stats = ArmStats::new();
        stats.record(1.0, 1.0);
        stats.clear();
        assert_eq!(stats.pulls(), 0);
        assert!(stats.history(MetricChannel::Training).is_empty());
        assert_eq!(stats.current(MetricChannel::Validation, MetricMode::Latest), None);
    }

    #[test]
    fn channel_serializes_snake_case() {
        let json = serde_json::to_string(&MetricChannel::Validation).unwrap();
        assert_eq!(json, "\"validation\"");
        let mode: MetricMode = serde_json::from_str("\"best_so_far\"").unwrap();
        assert_eq!(mode, MetricMode::BestSoFar);
    }
}
