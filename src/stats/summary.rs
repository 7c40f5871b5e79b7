use crate::data::model::DataTable;
use crate::error::ExplorerError;

/// Descriptive statistics of one column over a row subset, rounded to 2
/// decimals for display. `std` is the sample standard deviation and is
/// `None` for fewer than 2 observations.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: Option<f64>,
}

/// Summarize the numeric values of `column` over the given row indices.
/// Missing and non-numeric cells are skipped; `Ok(None)` when nothing
/// numeric remains.
pub fn summarize_column(
    table: &DataTable,
    column: &str,
    indices: &[usize],
) -> Result<Option<ColumnSummary>, ExplorerError> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| ExplorerError::MissingColumn(column.to_string()))?;

    let values: Vec<f64> = indices
        .iter()
        .filter_map(|&row| table.rows[row][idx].as_f64())
        .filter(|v| v.is_finite())
        .collect();

    Ok(summarize(&values))
}

fn summarize(values: &[f64]) -> Option<ColumnSummary> {
    if values.is_empty() {
        return None;
    }
    let n = values.len();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / n as f64;
    let std = if n >= 2 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        Some(round2(var.sqrt()))
    } else {
        None
    };

    Some(ColumnSummary {
        n,
        min: round2(min),
        max: round2(max),
        mean: round2(mean),
        std,
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    #[test]
    fn summary_over_subset_skips_missing() {
        let t = DataTable::new(
            vec!["v".into()],
            vec![
                vec![Value::Float(2.0)],
                vec![Value::Missing],
                vec![Value::Float(4.0)],
                vec![Value::Float(6.0)],
            ],
        );
        let s = summarize_column(&t, "v", &[0, 1, 2, 3]).unwrap().unwrap();
        assert_eq!(s.n, 3);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 6.0);
        assert_eq!(s.mean, 4.0);
        assert_eq!(s.std, Some(2.0));

        // Restricting indices restricts the summary.
        let s = summarize_column(&t, "v", &[0]).unwrap().unwrap();
        assert_eq!(s.n, 1);
        assert_eq!(s.std, None);
    }

    #[test]
    fn empty_subset_yields_none() {
        let t = DataTable::new(vec!["v".into()], vec![vec![Value::Missing]]);
        assert_eq!(summarize_column(&t, "v", &[0]).unwrap(), None);
        assert!(summarize_column(&t, "w", &[]).is_err());
    }
}
