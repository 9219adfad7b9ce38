use anyhow::Result;
use tracing_subscriber::EnvFilter;

use bb_search::{run_episode, ArmPool, SearchConfig, StrategyKind};
use bb_types::{Arm, ArmInfo, ArmKey, EpisodeLog, MetricScript, ScriptedArm};

fn scripted_pool() -> ArmPool {
    let arms = [
        (
            "boosting",
            MetricScript::Linear {
                start: 0.55,
                slope: 0.02,
            },
        ),
        ("forest", MetricScript::Constant(0.72)),
        (
            "net",
            MetricScript::Decay {
                start: 0.9,
                rate: 0.04,
            },
        ),
        ("stump", MetricScript::Sequence(vec![0.1, 0.3, 0.2])),
    ];
    arms.into_iter()
        .map(|(family, script)| {
            let arm: Box<dyn Arm> = Box::new(ScriptedArm::uniform(script));
            (ArmKey::new(family, 0), arm)
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SearchConfig::default().with_seed(42);
    let mut pool = scripted_pool();
    let mut log = EpisodeLog::new();

    for (trial, kind) in StrategyKind::ALL.into_iter().enumerate() {
        let mut strategy = kind.build(&config)?;
        let info = ArmInfo::new("scripted", pool.len(), 10, trial);
        let selected = run_episode(&mut pool, strategy.as_mut(), info, &mut log)?;
        println!("{kind:>14}: {selected}");
    }

    println!("{}", log.to_json()?);
    Ok(())
}
