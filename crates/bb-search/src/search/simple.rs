//! Successive-elimination search with a single elimination step.

use tracing::{debug, info};

use bb_types::{validation_error, ArmKey, ArmSlot, BanditResult, MetricChannel, MetricMode};

use super::{best_of, ensure_searchable, finish, metrics, SearchStrategy};
use crate::config::StrategyKind;
use crate::numeric;

/// Explore uniformly, keep the top `alpha` fraction of arms, then spend the
/// rest of the budget round-robin over the survivors.
#[derive(Debug, Clone)]
pub struct SimpleBanditSearch {
    alpha: f64,
}

impl SimpleBanditSearch {
    /// `alpha` must lie in (0, 1]; a larger value would explore past the budget.
    pub fn new(alpha: f64) -> BanditResult<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(validation_error!("alpha must be in (0, 1], got {alpha}"));
        }
        Ok(Self { alpha })
    }

    /// Exploration rounds per arm: `max(1, floor(alpha * budget / arms))`.
    pub fn initial_rounds(&self, total_budget: usize, num_arms: usize) -> usize {
        ((self.alpha * total_budget as f64 / num_arms as f64).floor() as usize).max(1)
    }

    /// Arms kept after exploration: `max(1, floor(alpha * arms))`.
    pub fn num_good_arms(&self, num_arms: usize) -> usize {
        ((self.alpha * num_arms as f64).floor() as usize).clamp(1, num_arms)
    }
}

impl Default for SimpleBanditSearch {
    fn default() -> Self {
        Self { alpha: 0.3 }
    }
}

impl SearchStrategy for SimpleBanditSearch {
    fn search(&mut self, total_budget: usize, arms: &mut [ArmSlot<'_>]) -> BanditResult<ArmKey> {
        let name = StrategyKind::SimpleBandit.as_str();
        let num_arms = arms.len();
        ensure_searchable(name, total_budget, num_arms, 1, num_arms)?;

        let rounds = self.initial_rounds(total_budget, num_arms);
        let num_good = self.num_good_arms(num_arms);
        info!(
            strategy = name,
            budget = total_budget,
            arms = num_arms,
            rounds,
            num_good,
            "starting search"
        );

        for _ in 0..rounds {
            for arm in arms.iter_mut() {
                arm.pull()?;
            }
        }

        let scores = metrics(arms, MetricChannel::Validation, MetricMode::Latest)?;
        let preselected: Vec<usize> = numeric::rank_descending(&scores)
            .into_iter()
            .take(num_good)
            .collect();
        debug!(?preselected, "pre-selected arms");

        let remaining = total_budget - rounds * num_arms;
        for i in 0..remaining {
            arms[preselected[i % num_good]].pull()?;
        }

        let best = best_of(arms, &preselected, MetricChannel::Validation, MetricMode::Latest)?;
        Ok(finish(name, arms, best))
    }

    fn name(&self) -> &str {
        StrategyKind::SimpleBandit.as_str()
    }
}
