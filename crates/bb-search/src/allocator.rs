//! Arm pool that hands out arms for search episodes.
//!
//! Arms are expensive to construct, so the pool keeps every arm alive for its
//! whole lifetime and prefers handing out arms it has handed out before.
//! Every allocated arm is reset first, so only construction is amortized,
//! never results.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;

use tracing::debug;

use bb_types::{internal_error, AllocationError, Arm, ArmKey, ArmSlot, BanditResult};

/// Owns the universe of arms and tracks which have been allocated before.
pub struct ArmPool {
    arms: BTreeMap<ArmKey, Box<dyn Arm>>,
    /// Keys in order of first allocation.
    used: Vec<ArmKey>,
    /// Never-allocated keys, in key order.
    unused: VecDeque<ArmKey>,
}

impl ArmPool {
    pub fn new(arms: BTreeMap<ArmKey, Box<dyn Arm>>) -> Self {
        let unused = arms.keys().cloned().collect();
        Self {
            arms,
            used: Vec::new(),
            unused,
        }
    }

    /// Borrow `num_arms` freshly reset arms for one episode.
    ///
    /// Previously allocated keys are reused first, in order of first use; the
    /// rest are drawn from never-allocated keys. The returned slots keep the
    /// pool mutably borrowed until the episode ends.
    pub fn allocate(&mut self, num_arms: usize) -> BanditResult<Vec<ArmSlot<'_>>> {
        if num_arms == 0 {
            return Err(AllocationError::ZeroRequest.into());
        }
        if num_arms > self.arms.len() {
            return Err(AllocationError::ExceedsUniverse {
                requested: num_arms,
                available: self.arms.len(),
            }
            .into());
        }

        let mut chosen: Vec<ArmKey> = self.used.iter().take(num_arms).cloned().collect();
        let reused = chosen.len();
        while chosen.len() < num_arms {
            let key = self
                .unused
                .pop_front()
                .ok_or_else(|| internal_error!("arm pool ran out of unused keys"))?;
            self.used.push(key.clone());
            chosen.push(key);
        }
        debug!(
            requested = num_arms,
            reused,
            drawn = num_arms - reused,
            "allocated arms"
        );

        let wanted: HashSet<&ArmKey> = chosen.iter().collect();
        let mut by_key: HashMap<&ArmKey, &mut Box<dyn Arm>> = self
            .arms
            .iter_mut()
            .filter(|(key, _)| wanted.contains(key))
            .collect();

        let mut slots = Vec::with_capacity(num_arms);
        for key in &chosen {
            let arm = by_key
                .remove(key)
                .ok_or_else(|| internal_error!("arm {key} missing from pool"))?;
            arm.reset();
            slots.push(ArmSlot::new(key.clone(), &mut **arm));
        }
        Ok(slots)
    }

    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    pub fn contains(&self, key: &ArmKey) -> bool {
        self.arms.contains_key(key)
    }

    pub fn get(&self, key: &ArmKey) -> Option<&dyn Arm> {
        self.arms.get(key).map(|arm| &**arm)
    }

    /// Keys allocated at least once, in order of first allocation.
    pub fn used_keys(&self) -> &[ArmKey] {
        &self.used
    }

    pub fn unused_len(&self) -> usize {
        self.unused.len()
    }
}

impl FromIterator<(ArmKey, Box<dyn Arm>)> for ArmPool {
    fn from_iter<I: IntoIterator<Item = (ArmKey, Box<dyn Arm>)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Debug for ArmPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmPool")
            .field("arms", &self.arms.keys().collect::<Vec<_>>())
            .field("used", &self.used)
            .field("unused", &self.unused)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bb_types::{BanditError, MetricScript, ScriptedArm};

    fn pool(size: u32) -> ArmPool {
        (0..size)
            .map(|i| {
                let arm: Box<dyn Arm> =
                    Box::new(ScriptedArm::uniform(MetricScript::Constant(i as f64)));
                (ArmKey::new("forest", i), arm)
            })
            .collect()
    }

    fn keys(slots: &[ArmSlot<'_>]) -> Vec<u32> {
        slots.iter().map(|s| s.key.instance).collect()
    }

    #[test]
    fn first_allocation_draws_in_pool_order() {
        let mut pool = pool(5);
        let slots = pool.allocate(3).unwrap();
        assert_eq!(keys(&slots), vec![0, 1, 2]);
        drop(slots);
        assert_eq!(pool.unused_len(), 2);
        assert_eq!(pool.used_keys().len(), 3);
    }

    #[test]
    fn reuses_used_keys_before_drawing_new_ones() {
        let mut pool = pool(6);
        assert_eq!(keys(&pool.allocate(2).unwrap()), vec![0, 1]);
        assert_eq!(keys(&pool.allocate(4).unwrap()), vec![0, 1, 2, 3]);
        assert_eq!(pool.unused_len(), 2);

        // Smaller request only touches the earliest used keys.
        assert_eq!(keys(&pool.allocate(1).unwrap()), vec![0]);
        assert_eq!(pool.unused_len(), 2);

        let used: Vec<u32> = pool.used_keys().iter().map(|k| k.instance).collect();
        assert_eq!(used, vec![0, 1, 2, 3]);
    }

    #[test]
    fn allocated_arms_are_reset() {
        let mut pool = pool(3);
        {
            let mut slots = pool.allocate(2).unwrap();
            for slot in slots.iter_mut() {
                slot.pull().unwrap();
                slot.pull().unwrap();
            }
        }
        assert_eq!(pool.get(&ArmKey::new("forest", 0)).unwrap().num_pulls(), 2);

        let slots = pool.allocate(3).unwrap();
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(|s| s.num_pulls() == 0));
        let distinct: HashSet<&ArmKey> = slots.iter().map(|s| &s.key).collect();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn rejects_oversized_and_empty_requests() {
        let mut pool = pool(2);
        match pool.allocate(3) {
            Err(BanditError::Allocation(AllocationError::ExceedsUniverse {
                requested,
                available,
            })) => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected ExceedsUniverse, got {other:?}"),
        }
        assert!(matches!(
            pool.allocate(0),
            Err(BanditError::Allocation(AllocationError::ZeroRequest))
        ));
        // Failed requests leave the pool untouched.
        assert_eq!(pool.unused_len(), 2);
        assert!(pool.used_keys().is_empty());
    }

    #[test]
    fn pool_accessors() {
        let pool = pool(4);
        assert_eq!(pool.len(), 4);
        assert!(!pool.is_empty());
        assert!(pool.contains(&ArmKey::new("forest", 3)));
        assert!(!pool.contains(&ArmKey::new("forest", 4)));
        assert!(pool.get(&ArmKey::new("svm", 0)).is_none());
    }
}
