//! Running one search episode end to end.

use tracing::info;

use bb_types::{ArmInfo, ArmKey, BanditResult, BookkeepingError, EpisodeLog, EpisodeResult};

use crate::allocator::ArmPool;
use crate::search::SearchStrategy;

/// Allocate `info.num_arms` arms from `pool`, spend `info.budget()` pulls with
/// `strategy`, and record the resulting traces in `log`.
///
/// An `info` already present in `log` is rejected before any arm is touched.
pub fn run_episode(
    pool: &mut ArmPool,
    strategy: &mut dyn SearchStrategy,
    info: ArmInfo,
    log: &mut EpisodeLog,
) -> BanditResult<ArmKey> {
    if log.get(&info).is_some() {
        return Err(BookkeepingError::DuplicateEpisode {
            info: info.to_string(),
        }
        .into());
    }

    let budget = info.budget();
    info!(episode = %info, strategy = strategy.name(), budget, "running episode");

    let mut slots = pool.allocate(info.num_arms)?;
    let selected = strategy.search(budget, &mut slots)?;
    let result = EpisodeResult::capture(strategy.name(), budget, selected.clone(), &slots);
    log.record(info, result)?;
    Ok(selected)
}
