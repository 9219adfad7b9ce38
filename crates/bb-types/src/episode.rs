//! Episode identity and the append-only record of finished episodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::arm::{ArmKey, ArmSlot, MetricChannel};
use crate::errors::{BanditResult, BookkeepingError};

/// Unique episode identifier.
pub type EpisodeId = Uuid;

/// Identity of one search episode. Used only as a bookkeeping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArmInfo {
    pub dataset: String,
    /// Number of arms allocated for the episode.
    pub num_arms: usize,
    /// Pull allowance per arm; the episode budget is `num_arms * max_iter`.
    pub max_iter: usize,
    pub trial: usize,
}

impl ArmInfo {
    pub fn new(dataset: impl Into<String>, num_arms: usize, max_iter: usize, trial: usize) -> Self {
        Self {
            dataset: dataset.into(),
            num_arms,
            max_iter,
            trial,
        }
    }

    pub fn budget(&self) -> usize {
        self.num_arms.saturating_mul(self.max_iter)
    }
}

impl fmt::Display for ArmInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (arms={}, max_iter={}, trial={})",
            self.dataset, self.num_arms, self.max_iter, self.trial
        )
    }
}

/// Snapshot of one arm at the end of an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmTrace {
    pub key: ArmKey,
    pub num_pulls: usize,
    pub training: Vec<f64>,
    pub validation: Vec<f64>,
}

impl ArmTrace {
    pub fn capture(slot: &ArmSlot<'_>) -> Self {
        Self {
            key: slot.key.clone(),
            num_pulls: slot.arm.num_pulls(),
            training: slot.arm.metric_history(MetricChannel::Training).to_vec(),
            validation: slot.arm.metric_history(MetricChannel::Validation).to_vec(),
        }
    }
}

/// Everything one strategy run produced for one [`ArmInfo`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub id: EpisodeId,
    pub strategy: String,
    pub budget: usize,
    pub selected: ArmKey,
    /// Per-arm traces in episode order.
    pub arms: Vec<ArmTrace>,
    pub recorded_at: DateTime<Utc>,
}

impl EpisodeResult {
    pub fn capture(strategy: &str, budget: usize, selected: ArmKey, slots: &[ArmSlot<'_>]) -> Self {
        Self {
            id: Uuid::new_v4(),
            strategy: strategy.to_string(),
            budget,
            selected,
            arms: slots.iter().map(ArmTrace::capture).collect(),
            recorded_at: Utc::now(),
        }
    }

    pub fn total_pulls(&self) -> usize {
        self.arms.iter().map(|a| a.num_pulls).sum()
    }

    pub fn trace(&self, key: &ArmKey) -> Option<&ArmTrace> {
        self.arms.iter().find(|a| &a.key == key)
    }
}

#[derive(Serialize)]
struct LogEntry<'a> {
    info: &'a ArmInfo,
    result: &'a EpisodeResult,
}

/// Append-only mapping from episode identity to its result.
///
/// Owned by whoever drives the episodes. Callers sharing one log across
/// threads must serialize writes themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeLog {
    episodes: BTreeMap<ArmInfo, EpisodeResult>,
}

impl EpisodeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an episode. An `ArmInfo` can only be recorded once.
    pub fn record(&mut self, info: ArmInfo, result: EpisodeResult) -> BanditResult<()> {
        if self.episodes.contains_key(&info) {
            return Err(BookkeepingError::DuplicateEpisode {
                info: info.to_string(),
            }
            .into());
        }
        self.episodes.insert(info, result);
        Ok(())
    }

    pub fn get(&self, info: &ArmInfo) -> Option<&EpisodeResult> {
        self.episodes.get(info)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArmInfo, &EpisodeResult)> {
        self.episodes.iter()
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// All episodes as a JSON array of `{ info, result }` objects.
    pub fn to_json(&self) -> BanditResult<String> {
        let entries: Vec<LogEntry<'_>> = self
            .episodes
            .iter()
            .map(|(info, result)| LogEntry { info, result })
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }
}
