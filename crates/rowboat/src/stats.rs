//! Numeric column summaries over `column_as::<f64>`.

use crate::error::{Result, TableError};
use crate::table::Table;

impl Table {
    /// Arithmetic mean of a column.
    pub fn mean(&self, col_name: &str) -> Result<f64> {
        let column = self.numeric_column(col_name)?;
        Ok(column.iter().sum::<f64>() / column.len() as f64)
    }

    /// Median of a column (midpoint average for even counts).
    pub fn median(&self, col_name: &str) -> Result<f64> {
        let mut column = self.numeric_column(col_name)?;
        column.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = column.len();
        if n % 2 == 0 {
            Ok((column[n / 2 - 1] + column[n / 2]) / 2.0)
        } else {
            Ok(column[n / 2])
        }
    }

    /// Sample standard deviation; needs at least two values.
    pub fn std_dev(&self, col_name: &str) -> Result<f64> {
        let column = self.numeric_column(col_name)?;
        if column.len() < 2 {
            return Err(TableError::Stats(format!(
                "standard deviation needs at least 2 values in column '{col_name}'"
            )));
        }
        let mean = column.iter().sum::<f64>() / column.len() as f64;
        let sum_sq: f64 = column.iter().map(|v| (v - mean) * (v - mean)).sum();
        Ok((sum_sq / (column.len() - 1) as f64).sqrt())
    }

    /// Value at percentile `p` in `[0, 1]`, with linear interpolation
    /// between neighbors.
    pub fn percentile(&self, col_name: &str, p: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&p) {
            return Err(TableError::Stats(format!(
                "percentile must be in [0, 1], got {p}"
            )));
        }
        let mut column = self.numeric_column(col_name)?;
        column.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let index = p * (column.len() - 1) as f64;
        let lower = index.floor() as usize;
        if lower == column.len() - 1 {
            return Ok(column[lower]);
        }
        let fraction = index - lower as f64;
        Ok(column[lower] + fraction * (column[lower + 1] - column[lower]))
    }

    /// Sum of squared values, with no mean subtraction.
    pub fn squared_error(&self, col_name: &str) -> Result<f64> {
        let column = self.numeric_column(col_name)?;
        Ok(column.iter().map(|v| v * v).sum())
    }

    /// Pearson correlation coefficient between two columns. Fails when
    /// either column has zero standard deviation.
    pub fn correlation(&self, col_name1: &str, col_name2: &str) -> Result<f64> {
        let col1 = self.numeric_column(col_name1)?;
        let col2 = self.numeric_column(col_name2)?;
        let mean1 = self.mean(col_name1)?;
        let mean2 = self.mean(col_name2)?;
        let std1 = self.std_dev(col_name1)?;
        let std2 = self.std_dev(col_name2)?;
        if std1 == 0.0 || std2 == 0.0 {
            return Err(TableError::Stats(
                "correlation undefined for zero standard deviation".to_string(),
            ));
        }
        let cov: f64 = col1
            .iter()
            .zip(&col2)
            .map(|(a, b)| (a - mean1) * (b - mean2))
            .sum::<f64>()
            / (col1.len() - 1) as f64;
        Ok(cov / (std1 * std2))
    }

    /// Coefficient of determination of `predicted` against `actual`.
    pub fn r_squared(&self, predicted: &str, actual: &str) -> Result<f64> {
        let pred = self.numeric_column(predicted)?;
        let act = self.numeric_column(actual)?;
        let mean_y = self.mean(actual)?;
        let mut ss_tot = 0.0;
        let mut ss_res = 0.0;
        for (y_pred, y) in pred.iter().zip(&act) {
            ss_tot += (y - mean_y) * (y - mean_y);
            ss_res += (y - y_pred) * (y - y_pred);
        }
        if ss_tot == 0.0 {
            return Err(TableError::Stats(format!(
                "r-squared undefined: zero total variance in column '{actual}'"
            )));
        }
        Ok(1.0 - ss_res / ss_tot)
    }

    /// Root mean squared error between `predicted` and `actual`.
    pub fn rmse(&self, predicted: &str, actual: &str) -> Result<f64> {
        let pred = self.numeric_column(predicted)?;
        let act = self.numeric_column(actual)?;
        let sum_sq: f64 = pred
            .iter()
            .zip(&act)
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Ok((sum_sq / pred.len() as f64).sqrt())
    }

    fn numeric_column(&self, col_name: &str) -> Result<Vec<f64>> {
        let column = self.column_as::<f64>(col_name)?;
        if column.is_empty() {
            return Err(TableError::EmptyData(format!(
                "column '{col_name}' has no rows"
            )));
        }
        Ok(column)
    }
}
