//! Flattening of per-run fight events
//!
//! The engine writes one list of [`FightEvent`]s per simulation run. The
//! analysis only looks at events after the equilibration period, pooled
//! over runs, either as rows ([`EventTable`]) or as named columns
//! ([`FightColumns`]).

use crate::config::load_json_file;
use crate::error::{Error, Result};
use crate::{FightEvent, Strategy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Load the per-run event lists from a `coopfight_events_*.json` file
pub fn load_fight_results(path: impl AsRef<Path>) -> Result<Vec<Vec<FightEvent>>> {
    let results: Vec<Vec<FightEvent>> = load_json_file(path)?;
    log::debug!(
        "loaded {} runs, {} events",
        results.len(),
        results.iter().map(Vec::len).sum::<usize>()
    );
    Ok(results)
}

/// Events strictly after `t_equilibrium`, in run order then event order
fn retained_events(
    results: &[Vec<FightEvent>],
    t_equilibrium: usize,
) -> impl Iterator<Item = &FightEvent> {
    results
        .iter()
        .flat_map(|run| run.iter())
        .filter(move |event| event.time > t_equilibrium)
}

pub fn assemble_fight_events_to_table(
    results: &[Vec<FightEvent>],
    t_equilibrium: usize,
) -> EventTable {
    EventTable {
        rows: retained_events(results, t_equilibrium).copied().collect(),
    }
}

pub fn assemble_fight_events_to_columns(
    results: &[Vec<FightEvent>],
    t_equilibrium: usize,
) -> FightColumns {
    let mut columns = FightColumns::default();
    for event in retained_events(results, t_equilibrium) {
        columns.push(event);
    }
    columns
}

/// Row-oriented view of the retained events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    rows: Vec<FightEvent>,
}

impl EventTable {
    pub fn from_rows(rows: Vec<FightEvent>) -> Self {
        EventTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FightEvent] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FightEvent> {
        self.rows.iter()
    }

    /// Events won by `strategy`, whichever side it fought on
    pub fn won_by(&self, strategy: Strategy) -> impl Iterator<Item = &FightEvent> {
        self.rows
            .iter()
            .filter(move |event| event.winner_strategy() == strategy)
    }

    /// Write one CSV row per event, with the field names as header
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()
            .map_err(|e| Error::Csv(csv::Error::from(e)))?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a EventTable {
    type Item = &'a FightEvent;
    type IntoIter = std::slice::Iter<'a, FightEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Column-oriented view of the retained events, one sequence per field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FightColumns {
    pub investment_focal: Vec<f64>,
    pub investment_enemy: Vec<f64>,
    pub resources_focal: Vec<f64>,
    pub resources_enemy: Vec<f64>,
    pub strategy_focal: Vec<Strategy>,
    pub strategy_enemy: Vec<Strategy>,
    pub time: Vec<usize>,
    pub winner: Vec<usize>,
}

impl FightColumns {
    fn push(&mut self, event: &FightEvent) {
        self.investment_focal.push(event.investment_focal);
        self.investment_enemy.push(event.investment_enemy);
        self.resources_focal.push(event.resources_focal);
        self.resources_enemy.push(event.resources_enemy);
        self.strategy_focal.push(event.strategy_focal);
        self.strategy_enemy.push(event.strategy_enemy);
        self.time.push(event.time);
        self.winner.push(event.winner);
    }

    pub fn len(&self) -> usize {
        self.winner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winner.is_empty()
    }

    /// Check that every column has as many entries as `winner`
    pub fn validate(&self) -> Result<()> {
        let expected = self.len();
        let lengths = [
            ("investment_focal", self.investment_focal.len()),
            ("investment_enemy", self.investment_enemy.len()),
            ("resources_focal", self.resources_focal.len()),
            ("resources_enemy", self.resources_enemy.len()),
            ("strategy_focal", self.strategy_focal.len()),
            ("strategy_enemy", self.strategy_enemy.len()),
            ("time", self.time.len()),
        ];
        for (column, found) in lengths {
            if found != expected {
                return Err(Error::ColumnLengthMismatch {
                    column: column.to_string(),
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Strategy that won event `idx`, `None` past the end of any column
    pub fn winner_strategy(&self, idx: usize) -> Option<Strategy> {
        let side = if *self.winner.get(idx)? == 0 {
            &self.strategy_focal
        } else {
            &self.strategy_enemy
        };
        side.get(idx).copied()
    }
}

impl From<&EventTable> for FightColumns {
    fn from(table: &EventTable) -> Self {
        let mut columns = FightColumns::default();
        for event in table {
            columns.push(event);
        }
        columns
    }
}

impl TryFrom<&FightColumns> for EventTable {
    type Error = Error;

    fn try_from(columns: &FightColumns) -> Result<Self> {
        columns.validate()?;
        let rows = (0..columns.len())
            .map(|i| FightEvent {
                investment_focal: columns.investment_focal[i],
                investment_enemy: columns.investment_enemy[i],
                resources_focal: columns.resources_focal[i],
                resources_enemy: columns.resources_enemy[i],
                strategy_focal: columns.strategy_focal[i],
                strategy_enemy: columns.strategy_enemy[i],
                time: columns.time[i],
                winner: columns.winner[i],
            })
            .collect();
        Ok(EventTable { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_at(time: usize, winner: usize) -> FightEvent {
        FightEvent {
            investment_focal: time as f64 * 0.1,
            investment_enemy: 0.5,
            resources_focal: 1.0,
            resources_enemy: 1.5,
            strategy_focal: Strategy::Cooperator,
            strategy_enemy: Strategy::Fighter,
            time,
            winner,
        }
    }

    #[test]
    fn events_at_or_before_equilibrium_are_dropped() {
        let results = vec![vec![event_at(1, 0), event_at(5, 1)]];
        let table = assemble_fight_events_to_table(&results, 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].time, 5);

        // Strictly greater: an event exactly at the threshold goes too
        let table = assemble_fight_events_to_table(&results, 5);
        assert!(table.is_empty());
    }

    #[test]
    fn run_order_then_event_order() {
        let results = vec![
            vec![event_at(9, 0), event_at(3, 0)],
            vec![],
            vec![event_at(7, 1), event_at(8, 0)],
        ];
        let table = assemble_fight_events_to_table(&results, 0);
        let times: Vec<usize> = table.iter().map(|e| e.time).collect();
        assert_eq!(times, vec![9, 3, 7, 8]);
    }

    #[test]
    fn table_and_columns_hold_the_same_events() {
        let results = vec![
            vec![event_at(1, 0), event_at(4, 1), event_at(6, 0)],
            vec![event_at(2, 1), event_at(10, 1)],
        ];
        let table = assemble_fight_events_to_table(&results, 3);
        let columns = assemble_fight_events_to_columns(&results, 3);

        assert_eq!(columns.len(), 3);
        assert_eq!(columns.time, vec![4, 6, 10]);
        assert_eq!(columns.winner, vec![1, 0, 1]);
        assert_eq!(FightColumns::from(&table), columns);
        assert_eq!(EventTable::try_from(&columns).unwrap(), table);
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let mut columns = assemble_fight_events_to_columns(&[vec![event_at(4, 0)]], 0);
        columns.resources_enemy.push(3.0);
        match columns.validate() {
            Err(Error::ColumnLengthMismatch {
                column,
                expected,
                found,
            }) => {
                assert_eq!(column, "resources_enemy");
                assert_eq!(expected, 1);
                assert_eq!(found, 2);
            }
            other => panic!("expected length mismatch, got {:?}", other),
        }
    }

    #[test]
    fn won_by_checks_both_sides() {
        let table = EventTable::from_rows(vec![event_at(1, 0), event_at(2, 1), event_at(3, 1)]);
        assert_eq!(table.won_by(Strategy::Cooperator).count(), 1);
        assert_eq!(table.won_by(Strategy::Fighter).count(), 2);
        assert_eq!(table.won_by(Strategy::Defector).count(), 0);
    }

    #[test]
    fn columns_serialize_as_named_sequences() {
        let columns = assemble_fight_events_to_columns(&[vec![event_at(4, 1)]], 0);
        let json = serde_json::to_value(&columns).unwrap();
        assert_eq!(json["strategy_focal"][0], "Cooperator");
        assert_eq!(json["time"][0], 4);
        assert_eq!(columns.winner_strategy(0), Some(Strategy::Fighter));
    }

    #[test]
    fn winner_lookup_past_the_end_is_none() {
        let mut columns = assemble_fight_events_to_columns(&[vec![event_at(4, 0)]], 0);
        assert_eq!(columns.winner_strategy(0), Some(Strategy::Cooperator));
        assert_eq!(columns.winner_strategy(1), None);

        // A winner flag without a matching strategy entry
        columns.winner.push(1);
        assert_eq!(columns.winner_strategy(1), None);
    }
}
