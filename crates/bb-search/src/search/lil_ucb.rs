//! LIL-UCB search over training losses.

use tracing::{debug, info};

use bb_types::{ArmKey, ArmSlot, BanditResult, MetricChannel, MetricMode, SearchError};

use super::{check_delta, check_positive, ensure_searchable, finish, metrics, SearchStrategy};
use crate::config::StrategyKind;
use crate::numeric;

/// Confidence-bound search using the law-of-the-iterated-logarithm radius
///
/// `c_j = scale * sqrt(0.5 * ln(5 * ln(3 n_j) / delta) / n_j)`
///
/// The latest training metric is read as a loss. Each round pulls the arm with
/// the smallest optimistic loss `mean_j - c_j` and refreshes only that arm's
/// statistics. The final answer is the arm with the lowest mean training loss.
#[derive(Debug, Clone)]
pub struct LilUcbSearch {
    delta: f64,
    scale: f64,
}

impl LilUcbSearch {
    /// `delta` must lie in (0, 1) and `scale` must be positive.
    pub fn new(delta: f64, scale: f64) -> BanditResult<Self> {
        check_delta(delta)?;
        check_positive("lil_ucb_scale", scale)?;
        Ok(Self { delta, scale })
    }

    /// Radius for one arm pulled `n` times.
    pub fn radius(&self, n: f64) -> BanditResult<f64> {
        if n < 1.0 {
            return Err(SearchError::NumericDegeneracy {
                message: format!("confidence radius needs at least one pull, got {n}"),
            }
            .into());
        }
        Ok(self.scale * (0.5 * (5.0 * (3.0 * n).ln() / self.delta).ln() / n).sqrt())
    }

    /// Radii for every arm at once.
    fn radii(&self, counts: &[f64]) -> BanditResult<Vec<f64>> {
        if let Some(n) = counts.iter().find(|n| **n < 1.0) {
            return Err(SearchError::NumericDegeneracy {
                message: format!("confidence radius needs at least one pull, got {n}"),
            }
            .into());
        }
        let inner = numeric::ln(&numeric::scale(
            &numeric::ln(&numeric::scale(counts, 3.0)),
            5.0 / self.delta,
        ));
        let ratio = numeric::divide(&numeric::scale(&inner, 0.5), counts);
        Ok(numeric::scale(&numeric::sqrt(&ratio), self.scale))
    }
}

impl Default for LilUcbSearch {
    fn default() -> Self {
        Self {
            delta: 0.1,
            scale: 1.5,
        }
    }
}

impl SearchStrategy for LilUcbSearch {
    fn search(&mut self, total_budget: usize, arms: &mut [ArmSlot<'_>]) -> BanditResult<ArmKey> {
        let name = StrategyKind::LilUcb.as_str();
        let num_arms = arms.len();
        ensure_searchable(name, total_budget, num_arms, 1, num_arms)?;
        info!(strategy = name, budget = total_budget, arms = num_arms, "starting search");

        for arm in arms.iter_mut() {
            arm.pull()?;
        }
        let mut counts = vec![1.0; num_arms];
        let mut sums = metrics(arms, MetricChannel::Training, MetricMode::Latest)?;
        let mut radii = self.radii(&counts)?;
        let mut bounds = numeric::subtract(&numeric::divide(&sums, &counts), &radii);

        for round in num_arms..total_budget {
            let j = numeric::argmin(&bounds).ok_or_else(|| SearchError::NumericDegeneracy {
                message: "no confidence bounds to rank".to_string(),
            })?;

            arms[j].pull()?;
            counts[j] += 1.0;
            sums[j] += arms[j].metric(MetricChannel::Training, MetricMode::Latest)?;
            radii[j] = self.radius(counts[j])?;
            bounds[j] = sums[j] / counts[j] - radii[j];
            debug!(round, arm = j, radius = radii[j], bound = bounds[j], "lil-ucb update");
        }

        let means = numeric::divide(&sums, &counts);
        let best = numeric::argmin(&means).ok_or_else(|| SearchError::NumericDegeneracy {
            message: "no arm means to select from".to_string(),
        })?;
        Ok(finish(name, arms, best))
    }

    fn name(&self) -> &str {
        StrategyKind::LilUcb.as_str()
    }
}
