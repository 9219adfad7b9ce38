//! LUCB search: one exploit and one explore pull per round.

use tracing::{debug, info, warn};

use bb_types::{ArmKey, ArmSlot, BanditResult, MetricChannel, MetricMode, SearchError};

use super::{check_delta, check_positive, ensure_searchable, finish, metrics, SearchStrategy};
use crate::config::StrategyKind;
use crate::numeric;

/// Paired-pull confidence-bound search.
///
/// Every round after initialization pulls two distinct arms: the arm with the
/// best empirical validation mean, and the arm ranked first by smallest
/// `mean - c` (second, if the first is the same arm). Radii use
///
/// `c = sqrt(0.5 * ln(k1 * arms * t^4 / delta) / n)`
///
/// with `t` the number of pulls spent so far, and are refreshed only for the
/// two arms just pulled.
#[derive(Debug, Clone)]
pub struct LucbSearch {
    delta: f64,
    k1: f64,
}

impl LucbSearch {
    /// `delta` must lie in (0, 1) and `k1` must be positive.
    pub fn new(delta: f64, k1: f64) -> BanditResult<Self> {
        check_delta(delta)?;
        check_positive("lucb_k1", k1)?;
        Ok(Self { delta, k1 })
    }

    pub fn radius(&self, num_arms: usize, t: usize, n: f64) -> BanditResult<f64> {
        if n < 1.0 || t == 0 {
            return Err(SearchError::NumericDegeneracy {
                message: format!("LUCB radius needs t >= 1 and n >= 1, got t={t}, n={n}"),
            }
            .into());
        }
        let horizon = self.k1 * num_arms as f64 * (t as f64).powi(4) / self.delta;
        Ok((0.5 * horizon.ln() / n).sqrt())
    }

    /// Exploit pick and explore pick for one round. The two never coincide.
    pub fn pick_pair(means: &[f64], bounds: &[f64]) -> BanditResult<(usize, usize)> {
        let exploit = numeric::rank_descending(means).first().copied();
        let by_bound = numeric::rank_ascending(bounds);
        match (exploit, by_bound.as_slice()) {
            (Some(exploit), [first, second, ..]) => {
                let explore = if *first == exploit { *second } else { *first };
                Ok((exploit, explore))
            }
            _ => Err(SearchError::NumericDegeneracy {
                message: "LUCB needs at least two ranked arms per round".to_string(),
            }
            .into()),
        }
    }
}

impl Default for LucbSearch {
    fn default() -> Self {
        Self {
            delta: 0.1,
            k1: 1.25,
        }
    }
}

impl SearchStrategy for LucbSearch {
    fn search(&mut self, total_budget: usize, arms: &mut [ArmSlot<'_>]) -> BanditResult<ArmKey> {
        let name = StrategyKind::Lucb.as_str();
        let num_arms = arms.len();
        ensure_searchable(name, total_budget, num_arms, 2, num_arms)?;
        info!(strategy = name, budget = total_budget, arms = num_arms, "starting search");

        for arm in arms.iter_mut() {
            arm.pull()?;
        }
        let mut t = num_arms;
        let mut counts = vec![1.0; num_arms];
        let mut sums = metrics(arms, MetricChannel::Validation, MetricMode::Latest)?;
        let radii = counts
            .iter()
            .map(|&n| self.radius(num_arms, t, n))
            .collect::<BanditResult<Vec<f64>>>()?;
        let mut bounds = numeric::subtract(&numeric::divide(&sums, &counts), &radii);

        while t + 2 <= total_budget {
            let means = numeric::divide(&sums, &counts);
            let (exploit, explore) = Self::pick_pair(&means, &bounds)?;

            for j in [exploit, explore] {
                arms[j].pull()?;
                counts[j] += 1.0;
                sums[j] += arms[j].metric(MetricChannel::Validation, MetricMode::Latest)?;
            }
            t += 2;

            for j in [exploit, explore] {
                let radius = self.radius(num_arms, t, counts[j])?;
                bounds[j] = sums[j] / counts[j] - radius;
            }
            debug!(t, exploit, explore, "lucb round");
        }

        if t < total_budget {
            warn!(
                strategy = name,
                unspent = total_budget - t,
                "budget left over after paired rounds"
            );
        }

        let means = numeric::divide(&sums, &counts);
        let best = numeric::argmax(&means).ok_or_else(|| SearchError::NumericDegeneracy {
            message: "no arm means to select from".to_string(),
        })?;
        Ok(finish(name, arms, best))
    }

    fn name(&self) -> &str {
        StrategyKind::Lucb.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{constant_arms, pull_counts, recording_arms, scenario_arms, slots};
    use bb_types::{BanditError, MetricScript, ScriptedArm};

    #[test]
    fn pick_pair_takes_heads_of_both_rankings() {
        let means = [0.2, 0.9, 0.5];
        let bounds = [-0.1, 0.4, -0.3];
        assert_eq!(LucbSearch::pick_pair(&means, &bounds).unwrap(), (1, 2));
    }

    #[test]
    fn pick_pair_skips_to_second_bound_on_collision() {
        let means = [0.2, 0.9, 0.5];
        let bounds = [0.0, -0.5, -0.2];
        assert_eq!(LucbSearch::pick_pair(&means, &bounds).unwrap(), (1, 2));
    }

    #[test]
    fn pick_pair_needs_two_arms() {
        assert!(LucbSearch::pick_pair(&[0.3], &[0.1]).is_err());
    }

    #[test]
    fn radius_grows_with_t_and_shrinks_with_n() {
        let search = LucbSearch::default();
        let base = search.radius(4, 10, 3.0).unwrap();
        let expected = (0.5 * (1.25 * 4.0 * 10f64.powi(4) / 0.1).ln() / 3.0).sqrt();
        assert!((base - expected).abs() < 1e-12);
        assert!(search.radius(4, 20, 3.0).unwrap() > base);
        assert!(search.radius(4, 10, 6.0).unwrap() < base);
        assert!(search.radius(4, 10, 0.0).is_err());
    }

    #[test]
    fn constructor_rejects_out_of_range_parameters() {
        for (delta, k1) in [(0.0, 1.25), (1.0, 1.25), (0.1, 0.0), (0.1, -2.0), (0.1, f64::NAN)] {
            assert!(matches!(
                LucbSearch::new(delta, k1),
                Err(BanditError::Validation(_))
            ));
        }
        let search = LucbSearch::new(0.05, 2.0).unwrap();
        assert!(search.radius(4, 4, 1.0).unwrap().is_finite());
    }

    #[test]
    fn paired_picks_are_always_distinct() {
        let (mut arms, log) = recording_arms(scenario_arms());
        let mut slots = slots(&mut arms);
        LucbSearch::default().search(60, &mut slots).unwrap();

        let log = log.lock().unwrap();
        assert_eq!(&log[..4], &[0, 1, 2, 3]);
        for pair in log[4..].chunks(2) {
            assert_eq!(pair.len(), 2);
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn spends_largest_even_fit_of_budget() {
        for (budget, expected) in [(4, 4), (5, 4), (6, 6), (41, 40), (40, 40)] {
            let mut arms = scenario_arms();
            let mut slots = slots(&mut arms);
            LucbSearch::default().search(budget, &mut slots).unwrap();
            assert_eq!(pull_counts(&slots).iter().sum::<usize>(), expected);
        }

        let mut arms = constant_arms(&[0.1, 0.2, 0.3]);
        let mut slots = slots(&mut arms);
        LucbSearch::default().search(10, &mut slots).unwrap();
        assert_eq!(pull_counts(&slots).iter().sum::<usize>(), 9);
    }

    #[test]
    fn selects_best_validation_mean() {
        // Training favours arm 0; validation favours arm 2.
        let mut arms = vec![
            ScriptedArm::new(MetricScript::Constant(0.9), MetricScript::Constant(0.2)),
            ScriptedArm::new(MetricScript::Constant(0.5), MetricScript::Constant(0.4)),
            ScriptedArm::new(MetricScript::Constant(0.1), MetricScript::Constant(0.8)),
        ];
        let mut slots = slots(&mut arms);
        let selected = LucbSearch::default().search(30, &mut slots).unwrap();
        assert_eq!(selected, ArmKey::new("arm", 2));
    }

    #[test]
    fn single_arm_is_rejected() {
        let mut arms = constant_arms(&[0.5]);
        let mut slots = slots(&mut arms);
        assert!(matches!(
            LucbSearch::default().search(10, &mut slots),
            Err(BanditError::Search(SearchError::TooFewArms { .. }))
        ));
    }
}
