use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::data::model::DataTable;
use crate::error::ExplorerError;

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// Why a correlation could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndefinedReason {
    /// Fewer than 2 rows where both columns are numeric.
    TooFewPairs(usize),
    /// One of the columns has no variance over the valid pairs.
    ZeroVariance,
}

/// Outcome of a correlation computation. The undefined case is a reported,
/// recoverable condition, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correlation {
    /// Coefficient and two-sided p-value, both rounded to 2 decimals.
    Defined { r: f64, p: f64 },
    Undefined(UndefinedReason),
}

impl Correlation {
    pub fn is_defined(&self) -> bool {
        matches!(self, Correlation::Defined { .. })
    }
}

impl std::fmt::Display for Correlation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Correlation::Defined { r, p } => write!(f, "r = {r:.2}, p = {p:.2}"),
            Correlation::Undefined(_) => write!(f, "undefined"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Pearson linear correlation between two columns, pairwise-complete.
pub fn pearson(table: &DataTable, x: &str, y: &str) -> Result<Correlation, ExplorerError> {
    let (xs, ys) = paired_values(table, x, y)?;
    Ok(correlate(&xs, &ys))
}

/// Spearman rank correlation between two columns, pairwise-complete.
/// Ties receive their average rank.
pub fn spearman(table: &DataTable, x: &str, y: &str) -> Result<Correlation, ExplorerError> {
    let (xs, ys) = paired_values(table, x, y)?;
    if xs.len() < 2 {
        return Ok(Correlation::Undefined(UndefinedReason::TooFewPairs(xs.len())));
    }
    Ok(correlate(&ranks(&xs), &ranks(&ys)))
}

/// Rows where both columns hold numeric values, as parallel vectors.
pub fn paired_values(
    table: &DataTable,
    x: &str,
    y: &str,
) -> Result<(Vec<f64>, Vec<f64>), ExplorerError> {
    let x_idx = table
        .column_index(x)
        .ok_or_else(|| ExplorerError::MissingColumn(x.to_string()))?;
    let y_idx = table
        .column_index(y)
        .ok_or_else(|| ExplorerError::MissingColumn(y.to_string()))?;

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for row in &table.rows {
        if let (Some(xv), Some(yv)) = (row[x_idx].as_f64(), row[y_idx].as_f64()) {
            if xv.is_finite() && yv.is_finite() {
                xs.push(xv);
                ys.push(yv);
            }
        }
    }
    Ok((xs, ys))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn correlate(xs: &[f64], ys: &[f64]) -> Correlation {
    let n = xs.len();
    if n < 2 {
        return Correlation::Undefined(UndefinedReason::TooFewPairs(n));
    }
    match pearson_r(xs, ys) {
        Some(r) => {
            let p = two_sided_p(r, n);
            Correlation::Defined {
                r: round2(r),
                p: round2(p),
            }
        }
        None => Correlation::Undefined(UndefinedReason::ZeroVariance),
    }
}

/// Raw Pearson coefficient; `None` when either column has zero variance.
fn pearson_r(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den_x = 0.0;
    let mut den_y = 0.0;
    for (&xv, &yv) in xs.iter().zip(ys.iter()) {
        let dx = xv - mean_x;
        let dy = yv - mean_y;
        num += dx * dy;
        den_x += dx * dx;
        den_y += dy * dy;
    }
    let den = (den_x * den_y).sqrt();
    if den > 0.0 {
        // Guard against |r| creeping past 1 through rounding error.
        Some((num / den).clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Average ranks, ties sharing the mean of their positions (1-based).
fn ranks(values: &[f64]) -> Vec<f64> {
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < indexed.len() {
        let mut end = i + 1;
        while end < indexed.len() && indexed[end].1 == indexed[i].1 {
            end += 1;
        }
        let rank = (i + end - 1) as f64 * 0.5 + 1.0;
        for &(orig, _) in &indexed[i..end] {
            ranks[orig] = rank;
        }
        i = end;
    }
    ranks
}

/// Two-sided p-value for the null hypothesis r = 0, via the Student-t
/// transform with n − 2 degrees of freedom.
fn two_sided_p(r: f64, n: usize) -> f64 {
    let df = (n - 2) as f64;
    if df <= 0.0 {
        return 1.0;
    }
    let denom = 1.0 - r * r;
    if denom <= 0.0 {
        // Perfect correlation.
        return 0.0;
    }
    let t = r * (df / denom).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
