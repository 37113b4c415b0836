use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Name the leaderboard table is published under.
pub const LEADERBOARD_TABLE_NAME: &str = "open-llm-leaderboard";

pub const MODEL_NAME_COLUMN: &str = "model_name";
pub const AVERAGE_COLUMN: &str = "Average";
pub const ELAPSED_TIME_COLUMN: &str = "Elapsed Time";

/// Columns that never hold a task score.
pub const RESERVED_COLUMNS: [&str; 3] = [MODEL_NAME_COLUMN, AVERAGE_COLUMN, ELAPSED_TIME_COLUMN];

pub fn is_reserved_column(column: &str) -> bool {
    RESERVED_COLUMNS.contains(&column)
}

// ===== Cell =====

/// One table cell as the tracking service stores it.
///
/// The service has no NaN: a NaN score goes out as JSON `null` and comes
/// back as [`Cell::Missing`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn from_score(score: f64) -> Self {
        if score.is_nan() {
            Cell::Missing
        } else {
            Cell::Number(score)
        }
    }

    /// The numeric value, `None` for NaN, absent or text cells.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Number(v) => v.is_nan(),
            _ => false,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Integer(a), Cell::Integer(b)) => a == b,
            (Cell::Number(a), Cell::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            _ => self.is_missing() && other.is_missing(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Number(v) if v.is_nan() => write!(f, "NaN"),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(v) => write!(f, "{}", v),
            Cell::Missing => write!(f, "-"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

// ===== ResultTable =====

/// The leaderboard table of one run: `model_name`, `Average`, one column per
/// task, `Elapsed Time`. Amendments insert task columns ahead of
/// `Elapsed Time` so it stays last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    columns: Vec<String>,
    data: Vec<Vec<Cell>>,
}

impl ResultTable {
    /// Build the single-row table of a fresh run. `Average` is left absent
    /// until the caller computes it.
    pub fn fresh(target_model: &str, scores: &IndexMap<String, f64>, elapsed_time: i64) -> Self {
        let mut columns = Vec::with_capacity(scores.len() + 3);
        let mut row = Vec::with_capacity(scores.len() + 3);

        columns.push(MODEL_NAME_COLUMN.to_string());
        row.push(Cell::from(target_model));
        columns.push(AVERAGE_COLUMN.to_string());
        row.push(Cell::Missing);

        for (task, score) in scores {
            columns.push(task.clone());
            row.push(Cell::from_score(*score));
        }

        columns.push(ELAPSED_TIME_COLUMN.to_string());
        row.push(Cell::Integer(elapsed_time));

        Self {
            columns,
            data: vec![row],
        }
    }

    /// Rebuild a table from its stored columns and rows.
    pub fn from_parts(columns: Vec<String>, data: Vec<Vec<Cell>>) -> Result<Self> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(CoreError::MalformedTable(format!(
                    "column {} appears more than once",
                    column
                )));
            }
        }

        for (index, row) in data.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(CoreError::MalformedTable(format!(
                    "row {} has {} cells but the table has {} columns",
                    index,
                    row.len(),
                    columns.len()
                )));
            }
        }

        Ok(Self { columns, data })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> &[Vec<Cell>] {
        &self.data
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Cell>>) {
        (self.columns, self.data)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// The one data row. A leaderboard table holds exactly one row per run.
    pub fn row(&self) -> Result<&[Cell]> {
        match self.data.as_slice() {
            [row] => Ok(row),
            rows => Err(CoreError::MalformedTable(format!(
                "expected exactly one data row, found {}",
                rows.len()
            ))),
        }
    }

    fn row_mut(&mut self) -> Result<&mut Vec<Cell>> {
        match self.data.as_mut_slice() {
            [row] => Ok(row),
            rows => Err(CoreError::MalformedTable(format!(
                "expected exactly one data row, found {}",
                rows.len()
            ))),
        }
    }

    pub fn cell(&self, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.data.first().and_then(|row| row.get(index))
    }

    fn cell_mut(&mut self, column: &str) -> Result<&mut Cell> {
        let index = self
            .column_index(column)
            .ok_or_else(|| CoreError::MissingColumn(column.to_string()))?;
        Ok(&mut self.row_mut()?[index])
    }

    /// Task columns paired with their cell, in column order.
    pub fn score_cells(&self) -> Result<Vec<(&str, &Cell)>> {
        let row = self.row()?;
        Ok(self
            .columns
            .iter()
            .zip(row.iter())
            .filter(|(column, _)| !is_reserved_column(column))
            .map(|(column, cell)| (column.as_str(), cell))
            .collect())
    }

    /// Add a task column holding one score, just before `Elapsed Time`
    /// (or at the end when the table has none). Re-adding an existing column
    /// is rejected rather than overwriting it.
    pub fn add_score_column(&mut self, column: &str, score: f64) -> Result<()> {
        if self.has_column(column) {
            return Err(CoreError::DuplicateColumn(column.to_string()));
        }
        let at = self
            .column_index(ELAPSED_TIME_COLUMN)
            .unwrap_or(self.columns.len());
        self.row_mut()?.insert(at, Cell::from_score(score));
        self.columns.insert(at, column.to_string());
        Ok(())
    }

    pub fn set_average(&mut self, average: f64) -> Result<()> {
        *self.cell_mut(AVERAGE_COLUMN)? = Cell::from_score(average);
        Ok(())
    }

    /// Add `delta` seconds to `Elapsed Time`.
    pub fn add_elapsed_time(&mut self, delta: i64) -> Result<()> {
        let cell = self.cell_mut(ELAPSED_TIME_COLUMN)?;
        let updated = match &*cell {
            Cell::Integer(current) => match current.checked_add(delta) {
                Some(total) => Cell::Integer(total),
                None => {
                    return Err(CoreError::MalformedTable(format!(
                        "{} overflows adding {} to {}",
                        ELAPSED_TIME_COLUMN, delta, current
                    )))
                }
            },
            Cell::Number(current) if !current.is_nan() => Cell::Number(current + delta as f64),
            other => {
                return Err(CoreError::MalformedTable(format!(
                    "{} holds {:?}, expected a number",
                    ELAPSED_TIME_COLUMN, other
                )))
            }
        };
        *cell = updated;
        Ok(())
    }

    /// Check the fixed leading columns are present.
    pub fn ensure_leaderboard_shape(&self) -> Result<()> {
        for column in RESERVED_COLUMNS {
            if !self.has_column(column) {
                return Err(CoreError::MissingColumn(column.to_string()));
            }
        }
        self.row().map(|_| ())
    }
}
