//! Search configuration and strategy selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use bb_types::{config_error, BanditError, BanditResult};

/// Tunables shared by the search strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Simple bandit: fraction of the budget spent exploring, and fraction of
    /// arms kept for exploitation.
    pub alpha: f64,

    /// Confidence parameter for LIL-UCB and LUCB.
    pub delta: f64,

    /// Leading constant of the LIL-UCB confidence radius.
    pub lil_ucb_scale: f64,

    /// Extra constant inside the LUCB confidence radius.
    pub lucb_k1: f64,

    /// Seed for EXP3's sampler. `None` seeds from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            delta: 0.1,
            lil_ucb_scale: 1.5,
            lucb_k1: 1.25,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_lil_ucb_scale(mut self, scale: f64) -> Self {
        self.lil_ucb_scale = scale;
        self
    }

    pub fn with_lucb_k1(mut self, k1: f64) -> Self {
        self.lucb_k1 = k1;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> BanditResult<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(config_error!("alpha must be in (0, 1], got {}", self.alpha));
        }
        if !(self.delta > 0.0 && self.delta < 1.0) {
            return Err(config_error!("delta must be in (0, 1), got {}", self.delta));
        }
        if !(self.lil_ucb_scale > 0.0 && self.lil_ucb_scale.is_finite()) {
            return Err(config_error!(
                "lil_ucb_scale must be positive, got {}",
                self.lil_ucb_scale
            ));
        }
        if !(self.lucb_k1 > 0.0 && self.lucb_k1.is_finite()) {
            return Err(config_error!("lucb_k1 must be positive, got {}", self.lucb_k1));
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> BanditResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// The available search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Static,
    SimpleBandit,
    Exp3,
    LilUcb,
    Lucb,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Static,
        StrategyKind::SimpleBandit,
        StrategyKind::Exp3,
        StrategyKind::LilUcb,
        StrategyKind::Lucb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Static => "static",
            StrategyKind::SimpleBandit => "simple_bandit",
            StrategyKind::Exp3 => "exp3",
            StrategyKind::LilUcb => "lil_ucb",
            StrategyKind::Lucb => "lucb",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = BanditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| config_error!("unknown search strategy: {s}"))
    }
}
