//! Analysis harness for the cooperation-and-fight game
//!
//! The simulation engine runs the game on generated networks and writes
//! its results as JSON/CSV files named after the configuration that
//! produced them. This crate finds those files, reshapes the per-event
//! records into tables, computes aggregate statistics and renders the
//! standard figures.
//!
//! Modules:
//! - `config`: JSON/TOML loading, network configuration, plot settings
//! - `locator`: file discovery by fragment prefix
//! - `events`: flattening of per-run fight events
//! - `stats`: win fractions, time-series ratios, density grids
//! - `table`: long-form parameter tables and 2D grids
//! - `plots`: figure rendering

pub mod config;
pub mod error;
pub mod events;
pub mod locator;
pub mod plots;
pub mod stats;
pub mod table;

pub use error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Behavioral type of an agent in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strategy {
    Cooperator,
    Defector,
    Fighter,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Cooperator, Strategy::Defector, Strategy::Fighter];

    /// One-letter label used in legends
    pub fn short(&self) -> &'static str {
        match self {
            Strategy::Cooperator => "C",
            Strategy::Defector => "D",
            Strategy::Fighter => "F",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Cooperator => write!(f, "Cooperator"),
            Strategy::Defector => write!(f, "Defector"),
            Strategy::Fighter => write!(f, "Fighter"),
        }
    }
}

/// One pairwise contest between a focal agent and one of its neighbors
///
/// Matches the records the engine writes to `coopfight_events_*.json`;
/// other fields in those records (e.g. `id_event`) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FightEvent {
    pub investment_focal: f64,
    pub investment_enemy: f64,
    pub resources_focal: f64,
    pub resources_enemy: f64,
    pub strategy_focal: Strategy,
    pub strategy_enemy: Strategy,
    pub time: usize,
    /// 0 when the focal agent won, 1 when the enemy won
    pub winner: usize,
}

impl FightEvent {
    pub fn winner_strategy(&self) -> Strategy {
        if self.winner == 0 {
            self.strategy_focal
        } else {
            self.strategy_enemy
        }
    }

    /// Strategies taking part, counting a self-play contest once
    pub fn participants(&self) -> impl Iterator<Item = Strategy> {
        let enemy = (self.strategy_enemy != self.strategy_focal).then_some(self.strategy_enemy);
        std::iter::once(self.strategy_focal).chain(enemy)
    }
}

/// Per-step population counts and summed payoffs, averaged over runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub number_cooperators: Vec<usize>,
    pub number_defectors: Vec<usize>,
    pub number_fighters: Vec<usize>,
    pub payoff_cooperators: Vec<f64>,
    pub payoff_defectors: Vec<f64>,
    pub payoff_fighters: Vec<f64>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.number_cooperators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.number_cooperators.is_empty()
    }

    pub fn counts(&self, strategy: Strategy) -> &[usize] {
        match strategy {
            Strategy::Cooperator => &self.number_cooperators,
            Strategy::Defector => &self.number_defectors,
            Strategy::Fighter => &self.number_fighters,
        }
    }

    pub fn payoffs(&self, strategy: Strategy) -> &[f64] {
        match strategy {
            Strategy::Cooperator => &self.payoff_cooperators,
            Strategy::Defector => &self.payoff_defectors,
            Strategy::Fighter => &self.payoff_fighters,
        }
    }
}
