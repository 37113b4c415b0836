use eval_tracker_core::{Cell, CoreError, ResultTable, Result};
use tracing::{debug, warn};

/// Recomputes the `Average` cell of a leaderboard row.
pub struct AverageCalculator;

impl AverageCalculator {
    /// Mean of the row's task scores, skipping the reserved columns, every
    /// NaN or absent cell, and the `excluded` columns.
    ///
    /// Every excluded name must be a column of the table. When nothing is
    /// left to average the result is NaN.
    pub fn row_average(table: &ResultTable, excluded: &[String]) -> Result<f64> {
        if let Some(unknown) = excluded.iter().find(|name| !table.has_column(name)) {
            return Err(CoreError::UnknownColumn {
                column: unknown.clone(),
                available: table.columns().to_vec(),
            });
        }

        let mut scores = Vec::new();
        for (column, cell) in table.score_cells()? {
            if excluded.iter().any(|name| name == column) {
                continue;
            }
            match cell {
                Cell::Text(text) => {
                    return Err(CoreError::MalformedTable(format!(
                        "score column {} holds text {:?}",
                        column, text
                    )))
                }
                other => {
                    if let Some(score) = other.as_number() {
                        scores.push(score);
                    }
                }
            }
        }

        match Self::mean(&scores) {
            Some(average) => {
                debug!(columns = scores.len(), average, "Recomputed average");
                Ok(average)
            }
            None => {
                warn!("No score columns left to average; Average will be empty");
                Ok(f64::NAN)
            }
        }
    }

    /// Arithmetic mean, `None` for an empty slice.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
