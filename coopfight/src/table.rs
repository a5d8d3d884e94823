//! Long-form parameter tables and their reshaping into 2D grids
//!
//! A sweep over the game parameters produces one row per configuration
//! with the parameters and the observables as numeric columns. The global
//! panel pivots such a table on two control parameters.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Numeric columns of equal length, addressed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterTable {
    columns: BTreeMap<String, Vec<f64>>,
    len: usize,
}

impl ParameterTable {
    /// Build a table from named columns, which must all have the same length
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let columns: BTreeMap<String, Vec<f64>> =
            columns.into_iter().map(|(k, v)| (k.into(), v)).collect();

        let len = columns.values().next().map_or(0, Vec::len);
        for (name, values) in &columns {
            if values.len() != len {
                return Err(Error::ColumnLengthMismatch {
                    column: name.clone(),
                    expected: len,
                    found: values.len(),
                });
            }
        }
        Ok(ParameterTable { columns, len })
    }

    /// Read a CSV file with a header row. Columns with any cell that does
    /// not parse as a number are dropped.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut rdr = csv::Reader::from_path(path)?;
        let headers = rdr.headers()?.clone();

        let mut raw: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record?;
            for (idx, cell) in record.iter().enumerate() {
                raw[idx].push(cell.trim().parse::<f64>().ok());
            }
        }

        let mut columns = BTreeMap::new();
        for (name, cells) in headers.iter().zip(raw) {
            match cells.into_iter().collect::<Option<Vec<f64>>>() {
                Some(values) => {
                    columns.insert(name.to_string(), values);
                }
                None => log::warn!(
                    "dropping non-numeric column `{}` from {}",
                    name,
                    path.display()
                ),
            }
        }

        let table = Self::from_columns(columns)?;
        log::debug!(
            "loaded {} rows x {} columns from {}",
            table.len(),
            table.columns.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }
}

/// Observable values over a grid of two control parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2d {
    /// `values[i][j]` at `control_1_values[i]`, `control_2_values[j]`
    pub values: Vec<Vec<f64>>,
    pub control_1_values: Vec<f64>,
    pub control_2_values: Vec<f64>,
}

impl Grid2d {
    pub fn shape(&self) -> (usize, usize) {
        (self.control_1_values.len(), self.control_2_values.len())
    }

    /// Smallest and largest finite cell, if any
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Pivot `observable` on the two control columns, keeping only the rows
/// where every filter column equals its value exactly.
///
/// A cell with no matching row is NaN. So is a cell matched by several
/// rows; those are reported, never averaged.
pub fn build_2d_array(
    table: &ParameterTable,
    observable: &str,
    id_control_1: &str,
    id_control_2: &str,
    filter_params: &BTreeMap<String, f64>,
) -> Result<Grid2d> {
    let observed = table.column(observable)?;
    let control_1 = table.column(id_control_1)?;
    let control_2 = table.column(id_control_2)?;
    let filters = filter_params
        .iter()
        .map(|(name, &value)| table.column(name).map(|column| (column, value)))
        .collect::<Result<Vec<_>>>()?;

    let kept: Vec<usize> = (0..table.len())
        .filter(|&row| filters.iter().all(|(column, value)| column[row] == *value))
        .collect();

    let control_1_values = sorted_unique(kept.iter().map(|&row| control_1[row]));
    let control_2_values = sorted_unique(kept.iter().map(|&row| control_2[row]));

    let mut matches = vec![vec![0usize; control_2_values.len()]; control_1_values.len()];
    let mut values = vec![vec![f64::NAN; control_2_values.len()]; control_1_values.len()];
    for &row in &kept {
        let (Some(i), Some(j)) = (
            axis_index(&control_1_values, control_1[row]),
            axis_index(&control_2_values, control_2[row]),
        ) else {
            continue;
        };
        matches[i][j] += 1;
        values[i][j] = observed[row];
    }

    for (i, row) in matches.iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            if count > 1 {
                log::warn!(
                    "{} rows for {}={} {}={}, leaving `{}` undefined",
                    count,
                    id_control_1,
                    control_1_values[i],
                    id_control_2,
                    control_2_values[j],
                    observable
                );
                values[i][j] = f64::NAN;
            }
        }
    }

    log::debug!(
        "{} of {} rows kept for `{}` on a {}x{} grid",
        kept.len(),
        table.len(),
        observable,
        control_1_values.len(),
        control_2_values.len()
    );

    Ok(Grid2d {
        values,
        control_1_values,
        control_2_values,
    })
}

/// `total_cmp` orders `-0.0` before `0.0`; both are one axis value here
fn axis_key(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

fn sorted_unique(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = values.filter(|v| !v.is_nan()).map(axis_key).collect();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

fn axis_index(axis: &[f64], value: f64) -> Option<usize> {
    let key = axis_key(value);
    axis.binary_search_by(|candidate| candidate.total_cmp(&key)).ok()
}
