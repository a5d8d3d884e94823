//! Derived statistics over fight events and population time series

use crate::events::EventTable;
use crate::{Strategy, TimeSeries};
use std::collections::{BTreeMap, BTreeSet};

/// Fraction of contests won by each strategy at every time step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WinFractions {
    /// Distinct time steps, ascending
    pub time: Vec<usize>,
    /// One value per entry of `time` for every strategy seen in the events
    pub fractions: BTreeMap<Strategy, Vec<f64>>,
}

impl WinFractions {
    pub fn strategies(&self) -> impl Iterator<Item = Strategy> + '_ {
        self.fractions.keys().copied()
    }

    pub fn series(&self, strategy: Strategy) -> Option<&[f64]> {
        self.fractions.get(&strategy).map(Vec::as_slice)
    }
}

/// Per time step, wins divided by participations for each strategy.
///
/// A strategy participates once per event as the focal agent, and once
/// more as the enemy unless both sides play the same strategy. A strategy
/// that sat out a time step gets 0 there so every series covers every step.
pub fn compute_win_fractions(table: &EventTable) -> WinFractions {
    let strategies: BTreeSet<Strategy> = table
        .iter()
        .flat_map(|e| [e.strategy_focal, e.strategy_enemy])
        .collect();

    #[derive(Default)]
    struct Tally {
        wins: BTreeMap<Strategy, usize>,
        participations: BTreeMap<Strategy, usize>,
    }

    let mut by_time: BTreeMap<usize, Tally> = BTreeMap::new();
    for event in table {
        let tally = by_time.entry(event.time).or_default();
        *tally.wins.entry(event.winner_strategy()).or_default() += 1;
        for strategy in event.participants() {
            *tally.participations.entry(strategy).or_default() += 1;
        }
    }

    let mut fractions: BTreeMap<Strategy, Vec<f64>> = strategies
        .iter()
        .map(|&s| (s, Vec::with_capacity(by_time.len())))
        .collect();

    for tally in by_time.values() {
        for (strategy, series) in fractions.iter_mut() {
            let wins = tally.wins.get(strategy).copied().unwrap_or(0);
            let participations = tally.participations.get(strategy).copied().unwrap_or(0);
            series.push(if participations > 0 {
                wins as f64 / participations as f64
            } else {
                0.0
            });
        }
    }

    WinFractions {
        time: by_time.keys().copied().collect(),
        fractions,
    }
}

/// Share of the population playing each strategy at every step.
/// Steps with an empty population give NaN.
pub fn strategy_fractions(series: &TimeSeries) -> BTreeMap<Strategy, Vec<f64>> {
    let totals: Vec<usize> = (0..series.len())
        .map(|t| Strategy::ALL.iter().map(|&s| count_at(series, s, t)).sum())
        .collect();

    Strategy::ALL
        .iter()
        .map(|&strategy| {
            let values = totals
                .iter()
                .enumerate()
                .map(|(t, &total)| ratio(count_at(series, strategy, t) as f64, total as f64))
                .collect();
            (strategy, values)
        })
        .collect()
}

/// Average payoff of an agent of each strategy at every step.
/// Steps where a strategy has died out give NaN.
pub fn payoff_per_capita(series: &TimeSeries) -> BTreeMap<Strategy, Vec<f64>> {
    Strategy::ALL
        .iter()
        .map(|&strategy| {
            let counts = series.counts(strategy);
            let values = series
                .payoffs(strategy)
                .iter()
                .zip(counts)
                .map(|(&payoff, &count)| ratio(payoff, count as f64))
                .collect();
            (strategy, values)
        })
        .collect()
}

/// Share of `strategy` in the population at the first step
pub fn initial_fraction(series: &TimeSeries, strategy: Strategy) -> Option<f64> {
    strategy_fractions(series)
        .remove(&strategy)
        .and_then(|values| values.first().copied())
        .filter(|v| v.is_finite())
}

fn count_at(series: &TimeSeries, strategy: Strategy, t: usize) -> usize {
    series.counts(strategy).get(t).copied().unwrap_or(0)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// Event counts on a regular grid over (investment focal, investment enemy)
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    pub xlim: f64,
    pub ylim: f64,
    pub gridsize: usize,
    /// `counts[ix][iy]`
    pub counts: Vec<Vec<u32>>,
}

impl DensityGrid {
    pub fn max_count(&self) -> u32 {
        self.counts
            .iter()
            .flat_map(|col| col.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Lower-left and upper-right corners of bin (ix, iy)
    pub fn bin_bounds(&self, ix: usize, iy: usize) -> ((f64, f64), (f64, f64)) {
        let dx = self.xlim / self.gridsize as f64;
        let dy = self.ylim / self.gridsize as f64;
        (
            (ix as f64 * dx, iy as f64 * dy),
            ((ix + 1) as f64 * dx, (iy + 1) as f64 * dy),
        )
    }
}

/// Bin the events won by `strategy` over `[0, xlim] x [0, ylim]`.
/// Events outside the window are not counted.
pub fn winner_density(
    table: &EventTable,
    strategy: Strategy,
    xlim: f64,
    ylim: f64,
    gridsize: usize,
) -> DensityGrid {
    let gridsize = gridsize.max(1);
    let mut counts = vec![vec![0u32; gridsize]; gridsize];

    for event in table.won_by(strategy) {
        if let (Some(ix), Some(iy)) = (
            bin_index(event.investment_focal, xlim, gridsize),
            bin_index(event.investment_enemy, ylim, gridsize),
        ) {
            counts[ix][iy] += 1;
        }
    }

    DensityGrid {
        xlim,
        ylim,
        gridsize,
        counts,
    }
}

fn bin_index(value: f64, limit: f64, gridsize: usize) -> Option<usize> {
    if !(value >= 0.0 && value <= limit) || limit <= 0.0 {
        return None;
    }
    // The upper edge belongs to the last bin
    let idx = (value / limit * gridsize as f64).floor() as usize;
    Some(idx.min(gridsize - 1))
}
