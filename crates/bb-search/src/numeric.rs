//! Small vector helpers shared by the statistical strategies.
//!
//! Vectors are plain slices indexed in episode order. Elementwise binary
//! helpers expect equal lengths.

use rand::Rng;

use bb_types::{BanditResult, SearchError};

pub fn ln(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v.ln()).collect()
}

pub fn sqrt(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v.sqrt()).collect()
}

pub fn scale(values: &[f64], factor: f64) -> Vec<f64> {
    values.iter().map(|v| v * factor).collect()
}

pub fn divide(numerators: &[f64], denominators: &[f64]) -> Vec<f64> {
    debug_assert_eq!(numerators.len(), denominators.len());
    numerators
        .iter()
        .zip(denominators)
        .map(|(n, d)| n / d)
        .collect()
}

pub fn subtract(lhs: &[f64], rhs: &[f64]) -> Vec<f64> {
    debug_assert_eq!(lhs.len(), rhs.len());
    lhs.iter().zip(rhs).map(|(a, b)| a - b).collect()
}

/// Index of the smallest value; ties go to the lowest index.
pub fn argmin(values: &[f64]) -> Option<usize> {
    rank_ascending(values).first().copied()
}

/// Index of the largest value; ties go to the lowest index.
pub fn argmax(values: &[f64]) -> Option<usize> {
    rank_descending(values).first().copied()
}

/// Indices ordered by ascending value. Stable, so equal values keep index order.
pub fn rank_ascending(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order
}

/// Indices ordered by descending value. Stable, so equal values keep index order.
pub fn rank_descending(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}

/// Scale non-negative weights into a probability vector.
pub fn normalize(weights: &[f64]) -> BanditResult<Vec<f64>> {
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(SearchError::NumericDegeneracy {
            message: format!("cannot normalize weights summing to {total}"),
        }
        .into());
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

/// Draw an index with probability proportional to `probs[i]`.
pub fn weighted_choice<R: Rng>(rng: &mut R, probs: &[f64]) -> usize {
    let r: f64 = rng.random();
    let mut cdf = 0.0;
    for (i, p) in probs.iter().enumerate() {
        cdf += p;
        if r < cdf {
            return i;
        }
    }
    // Rounding can leave the cdf just under 1.0.
    probs.iter().rposition(|p| *p > 0.0).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn elementwise_helpers() {
        assert_eq!(divide(&[1.0, 9.0], &[2.0, 3.0]), vec![0.5, 3.0]);
        assert_eq!(subtract(&[1.0, 9.0], &[2.0, 3.0]), vec![-1.0, 6.0]);
        assert_eq!(sqrt(&[4.0, 9.0]), vec![2.0, 3.0]);
        assert_eq!(scale(&[1.5, -2.0], 2.0), vec![3.0, -4.0]);
        let logs = ln(&[1.0, std::f64::consts::E]);
        assert_eq!(logs[0], 0.0);
        assert!((logs[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn arg_extremes_prefer_lowest_index_on_ties() {
        let values = [0.3, 0.1, 0.9, 0.1, 0.9];
        assert_eq!(argmin(&values), Some(1));
        assert_eq!(argmax(&values), Some(2));
        assert_eq!(argmin(&[]), None);
    }

    #[test]
    fn rankings_are_stable() {
        let values = [0.5, 0.2, 0.5, 0.8];
        assert_eq!(rank_descending(&values), vec![3, 0, 2, 1]);
        assert_eq!(rank_ascending(&values), vec![1, 0, 2, 3]);
    }

    #[test]
    fn normalize_rejects_degenerate_weights() {
        let probs = normalize(&[1.0, 3.0]).unwrap();
        assert_eq!(probs, vec![0.25, 0.75]);
        assert!(normalize(&[0.0, 0.0]).is_err());
        assert!(normalize(&[f64::INFINITY, 1.0]).is_err());
    }

    #[test]
    fn weighted_choice_never_picks_zero_probability() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let probs = [0.0, 0.7, 0.0, 0.3];
        let mut counts = [0usize; 4];
        for _ in 0..2_000 {
            counts[weighted_choice(&mut rng, &probs)] += 1;
        }
        assert_eq!(counts[0], 0);
        assert_eq!(counts[2], 0);
        assert!(counts[1] > counts[3]);
    }
}
