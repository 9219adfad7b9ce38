//! Search strategies that pick the best arm under a fixed pull budget.
//!
//! Every strategy follows the same shape: a deterministic initialization
//! phase, an adaptive loop (select, pull, update), and a terminal selection.
//! They differ in the selection rule and in which metric channel and mode
//! they read at each point:
//!
//! | Strategy | Per-round signal | Terminal selection |
//! |---|---|---|
//! | static | none | validation, latest |
//! | simple bandit | validation, latest | validation, latest |
//! | exp3 | training, latest | validation, latest |
//! | lil-ucb | training loss, latest | lowest mean training loss |
//! | lucb | validation, latest | mean validation reward |

mod exp3;
mod lil_ucb;
mod lucb;
mod simple;
mod static_search;

pub use exp3::Exp3Search;
pub use lil_ucb::LilUcbSearch;
pub use lucb::LucbSearch;
pub use simple::SimpleBanditSearch;
pub use static_search::StaticSearch;

use tracing::info;

use bb_types::{
    validation_error, ArmKey, ArmSlot, BanditResult, MetricChannel, MetricMode, SearchError,
};

use crate::config::{SearchConfig, StrategyKind};
use crate::numeric;

/// Common trait for all search strategies.
pub trait SearchStrategy: Send + Sync {
    /// Spend the pull budget on `arms` and return the key of the arm judged
    /// best. Arm order is the episode's index order and is never changed.
    fn search(&mut self, total_budget: usize, arms: &mut [ArmSlot<'_>]) -> BanditResult<ArmKey>;

    /// Human-readable strategy name.
    fn name(&self) -> &str;
}

impl StrategyKind {
    /// Build the strategy this kind names, configured from `config`.
    pub fn build(self, config: &SearchConfig) -> BanditResult<Box<dyn SearchStrategy>> {
        config.validate()?;
        let strategy: Box<dyn SearchStrategy> = match self {
            StrategyKind::Static => Box::new(StaticSearch::new()),
            StrategyKind::SimpleBandit => Box::new(SimpleBanditSearch::new(config.alpha)?),
            StrategyKind::Exp3 => Box::new(Exp3Search::new(config.seed)),
            StrategyKind::LilUcb => {
                Box::new(LilUcbSearch::new(config.delta, config.lil_ucb_scale)?)
            }
            StrategyKind::Lucb => Box::new(LucbSearch::new(config.delta, config.lucb_k1)?),
        };
        Ok(strategy)
    }
}

/// Confidence parameters must lie strictly inside (0, 1).
fn check_delta(delta: f64) -> BanditResult<()> {
    if delta > 0.0 && delta < 1.0 {
        Ok(())
    } else {
        Err(validation_error!("delta must be in (0, 1), got {delta}"))
    }
}

fn check_positive(name: &str, value: f64) -> BanditResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(validation_error!("{name} must be positive and finite, got {value}"))
    }
}

/// Fail before any pull if the episode cannot be run.
fn ensure_searchable(
    strategy: &str,
    total_budget: usize,
    num_arms: usize,
    min_arms: usize,
    min_budget: usize,
) -> BanditResult<()> {
    if num_arms == 0 {
        return Err(SearchError::EmptyArmSet {
            strategy: strategy.to_string(),
        }
        .into());
    }
    if total_budget == 0 {
        return Err(SearchError::ZeroBudget {
            strategy: strategy.to_string(),
        }
        .into());
    }
    if num_arms < min_arms {
        return Err(SearchError::TooFewArms {
            strategy: strategy.to_string(),
            num_arms,
            required: min_arms,
        }
        .into());
    }
    if total_budget < min_budget {
        return Err(SearchError::BudgetTooSmall {
            strategy: strategy.to_string(),
            budget: total_budget,
            required: min_budget,
        }
        .into());
    }
    Ok(())
}

/// Current metric of every arm, in episode order.
fn metrics(arms: &[ArmSlot<'_>], channel: MetricChannel, mode: MetricMode) -> BanditResult<Vec<f64>> {
    arms.iter().map(|arm| arm.metric(channel, mode)).collect()
}

/// The candidate with the highest metric; ties go to the earliest candidate.
fn best_of(
    arms: &[ArmSlot<'_>],
    candidates: &[usize],
    channel: MetricChannel,
    mode: MetricMode,
) -> BanditResult<usize> {
    let values = candidates
        .iter()
        .map(|&i| arms[i].metric(channel, mode))
        .collect::<BanditResult<Vec<f64>>>()?;
    numeric::argmax(&values)
        .map(|pos| candidates[pos])
        .ok_or_else(|| SearchError::NumericDegeneracy {
            message: "no candidate arms to select from".to_string(),
        }
        .into())
}

fn finish(strategy: &str, arms: &[ArmSlot<'_>], best: usize) -> ArmKey {
    let key = arms[best].key.clone();
    let pulls: usize = arms.iter().map(|arm| arm.num_pulls()).sum();
    info!(strategy, selected = %key, pulls, "search finished");
    key
}
