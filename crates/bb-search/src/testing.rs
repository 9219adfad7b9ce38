//! Arm doubles shared by the unit tests.

use std::sync::{Arc, Mutex};

use bb_types::{
    Arm, ArmKey, ArmSlot, BanditResult, MetricChannel, MetricMode, MetricScript, ScriptedArm,
};

/// Pull order shared by a set of [`RecordingArm`]s.
pub(crate) type PullLog = Arc<Mutex<Vec<usize>>>;

/// Scripted arm that appends its index to a shared log on every pull.
pub(crate) struct RecordingArm {
    index: usize,
    inner: ScriptedArm,
    log: PullLog,
}

impl Arm for RecordingArm {
    fn pull(&mut self) -> BanditResult<()> {
        self.inner.pull()?;
        self.log.lock().unwrap().push(self.index);
        Ok(())
    }

    fn current_metric(&self, channel: MetricChannel, mode: MetricMode) -> Option<f64> {
        self.inner.current_metric(channel, mode)
    }

    fn metric_history(&self, channel: MetricChannel) -> &[f64] {
        self.inner.metric_history(channel)
    }

    fn num_pulls(&self) -> usize {
        self.inner.num_pulls()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

pub(crate) fn recording_arms(arms: Vec<ScriptedArm>) -> (Vec<RecordingArm>, PullLog) {
    let log = PullLog::default();
    let arms = arms
        .into_iter()
        .enumerate()
        .map(|(index, inner)| RecordingArm {
            index,
            inner,
            log: Arc::clone(&log),
        })
        .collect();
    (arms, log)
}

/// Key arms `arm/0`, `arm/1`, ... in slice order.
pub(crate) fn slots<A: Arm>(arms: &mut [A]) -> Vec<ArmSlot<'_>> {
    arms.iter_mut()
        .enumerate()
        .map(|(i, arm)| ArmSlot::new(ArmKey::new("arm", i as u32), arm))
        .collect()
}

pub(crate) fn pull_counts(slots: &[ArmSlot<'_>]) -> Vec<usize> {
    slots.iter().map(|s| s.num_pulls()).collect()
}

/// Four arms with the same curve on both channels:
/// 0 improves linearly, 1 is constant, 2 decays, 3 is noise around zero.
pub(crate) fn scenario_arms() -> Vec<ScriptedArm> {
    vec![
        ScriptedArm::uniform(MetricScript::Linear {
            start: 0.5,
            slope: 0.03,
        }),
        ScriptedArm::uniform(MetricScript::Constant(0.7)),
        ScriptedArm::uniform(MetricScript::Decay {
            start: 0.95,
            rate: 0.05,
        }),
        ScriptedArm::uniform(MetricScript::Sequence(vec![
            0.05, -0.04, 0.02, -0.03, 0.01, -0.02,
        ])),
    ]
}

pub(crate) fn constant_arms(values: &[f64]) -> Vec<ScriptedArm> {
    values
        .iter()
        .map(|&v| ScriptedArm::uniform(MetricScript::Constant(v)))
        .collect()
}
