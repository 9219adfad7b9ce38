//! EXP3 search over cumulative training losses.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use bb_types::{ArmKey, ArmSlot, BanditResult, MetricChannel, MetricMode};

use super::{best_of, ensure_searchable, finish, SearchStrategy};
use crate::config::StrategyKind;
use crate::numeric;

/// Exponential-weights search.
///
/// Each arm's weight is `exp(-eta * L)` where `L` is the arm's cumulative
/// training metric, evaluated relative to the smallest `L` so the weights
/// never all underflow to zero. The first `num_arms` rounds visit every arm
/// once in index order; after that arms are sampled from the normalized
/// weights. The final answer is picked by validation metric, not by weight.
#[derive(Debug, Clone)]
pub struct Exp3Search {
    rng: ChaCha8Rng,
}

impl Exp3Search {
    /// `None` seeds the sampler from the thread RNG.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        Self { rng }
    }

    /// `sqrt(2 ln(arms) / (arms * budget))`
    pub fn learning_rate(num_arms: usize, total_budget: usize) -> f64 {
        let k = num_arms as f64;
        (2.0 * k.ln() / (k * total_budget as f64)).sqrt()
    }

    /// `exp(-eta * (L_i - min L))`. Same probabilities as `exp(-eta * L_i)`,
    /// and the leading arm always has weight 1.
    pub fn weights(eta: f64, losses: &[f64]) -> Vec<f64> {
        let floor = losses.iter().copied().fold(f64::INFINITY, f64::min);
        losses.iter().map(|l| (-eta * (l - floor)).exp()).collect()
    }
}

impl SearchStrategy for Exp3Search {
    fn search(&mut self, total_budget: usize, arms: &mut [ArmSlot<'_>]) -> BanditResult<ArmKey> {
        let name = StrategyKind::Exp3.as_str();
        let num_arms = arms.len();
        // ln(1) = 0 would freeze the weights.
        ensure_searchable(name, total_budget, num_arms, 2, 1)?;

        let eta = Self::learning_rate(num_arms, total_budget);
        info!(strategy = name, budget = total_budget, arms = num_arms, eta, "starting search");

        let mut losses = vec![0.0; num_arms];

        for t in 0..total_budget {
            let probs = numeric::normalize(&Self::weights(eta, &losses))?;
            let i = if t < num_arms {
                t
            } else {
                numeric::weighted_choice(&mut self.rng, &probs)
            };

            arms[i].pull()?;
            losses[i] += arms[i].metric(MetricChannel::Training, MetricMode::Latest)?;
            debug!(round = t, arm = i, loss = losses[i], p = probs[i], "exp3 update");
        }

        let all: Vec<usize> = (0..num_arms.min(total_budget)).collect();
        let best = best_of(arms, &all, MetricChannel::Validation, MetricMode::Latest)?;
        Ok(finish(name, arms, best))
    }

    fn name(&self) -> &str {
        StrategyKind::Exp3.as_str()
    }
}
