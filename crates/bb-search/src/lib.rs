//! # bb-search
//!
//! Budgeted arm selection for BanditBench.
//!
//! Provides the arm pool that hands out arms per episode, five search
//! strategies (static round-robin, simple bandit, EXP3, LIL-UCB, LUCB), the
//! vector helpers they share, and [`run_episode`] to tie an episode's
//! allocation, search, and bookkeeping together.

mod allocator;
mod config;
mod episode;
pub mod numeric;
mod search;
#[cfg(test)]
mod testing;

pub use allocator::ArmPool;
pub use config::{SearchConfig, StrategyKind};
pub use episode::run_episode;
pub use search::{
    Exp3Search, LilUcbSearch, LucbSearch, SearchStrategy, SimpleBanditSearch, StaticSearch,
};
