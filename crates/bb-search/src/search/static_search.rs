//! Round-robin baseline search.

use tracing::info;

use bb_types::{ArmKey, ArmSlot, BanditResult, MetricChannel, MetricMode};

use super::{best_of, ensure_searchable, finish, SearchStrategy};
use crate::config::StrategyKind;

/// Non-adaptive baseline: round-robin over every arm for the whole budget.
#[derive(Debug, Clone, Default)]
pub struct StaticSearch;

impl StaticSearch {
    pub fn new() -> Self {
        Self
    }
}

impl SearchStrategy for StaticSearch {
    fn search(&mut self, total_budget: usize, arms: &mut [ArmSlot<'_>]) -> BanditResult<ArmKey> {
        let name = StrategyKind::Static.as_str();
        ensure_searchable(name, total_budget, arms.len(), 1, 1)?;
        info!(strategy = name, budget = total_budget, arms = arms.len(), "starting search");

        let num_arms = arms.len();
        for i in 0..total_budget {
            arms[i % num_arms].pull()?;
        }

        // A budget below the arm count leaves the tail unpulled.
        let pulled: Vec<usize> = (0..num_arms.min(total_budget)).collect();
        let best = best_of(arms, &pulled, MetricChannel::Validation, MetricMode::Latest)?;
        Ok(finish(name, arms, best))
    }

    fn name(&self) -> &str {
        StrategyKind::Static.as_str()
    }
}
