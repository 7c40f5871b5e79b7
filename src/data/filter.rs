use super::model::{DataTable, Value};

/// Age column of the demographic table.
pub const AGE_COLUMN: &str = "basis_age";
/// Sex column of the demographic table (1 = Male, 2 = Female).
pub const SEX_COLUMN: &str = "basis_sex";

// ---------------------------------------------------------------------------
// Filter predicate: age range and sex selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SexFilter {
    #[default]
    All,
    Male,
    Female,
}

impl SexFilter {
    // Codes are matched numerically: parquet exports carry survey columns
    // as Float64 once they contain a null.
    fn matches(self, cell: &Value) -> bool {
        match self {
            SexFilter::All => true,
            SexFilter::Male => cell.as_f64() == Some(1.0),
            SexFilter::Female => cell.as_f64() == Some(2.0),
        }
    }
}

/// Display label for a raw sex code, integer or float.
pub fn sex_label(cell: &Value) -> Option<&'static str> {
    match cell.as_f64() {
        Some(v) if v == 1.0 => Some("Male"),
        Some(v) if v == 2.0 => Some("Female"),
        _ => None,
    }
}

/// The active row selection: inclusive age range plus sex.
/// `age_range: None` means no age constraint.
#[derive(Debug, Clone, Copy, Default)]
pub struct CohortFilter {
    pub age_range: Option<(i64, i64)>,
    pub sex: SexFilter,
}

/// Return indices of rows that pass the filter.
///
/// A row passes when:
/// * no age range is set, or its age is numeric and inside the range
///   (rows with missing age fail an active range), and
/// * the sex selection matches (All always matches).
pub fn filtered_indices(table: &DataTable, filter: &CohortFilter) -> Vec<usize> {
    let age_idx = table.column_index(AGE_COLUMN);
    let sex_idx = table.column_index(SEX_COLUMN);

    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            if let Some((lo, hi)) = filter.age_range {
                let in_range = age_idx
                    .and_then(|i| row[i].as_f64())
                    .is_some_and(|age| age >= lo as f64 && age <= hi as f64);
                if !in_range {
                    return false;
                }
            }
            match (filter.sex, sex_idx) {
                (SexFilter::All, _) => true,
                (_, None) => false,
                (sex, Some(i)) => sex.matches(&row[i]),
            }
        })
        .map(|(i, _)| i)
        .collect()
}

/// Min/max observed age, for initialising a range selector.
pub fn age_bounds(table: &DataTable) -> Option<(i64, i64)> {
    let idx = table.column_index(AGE_COLUMN)?;
    let mut bounds: Option<(i64, i64)> = None;
    for cell in table.column(idx) {
        if let Some(age) = cell.as_f64() {
            let age = age as i64;
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(age), hi.max(age)),
                None => (age, age),
            });
        }
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DataTable {
        DataTable::new(
            vec![AGE_COLUMN.into(), SEX_COLUMN.into()],
            vec![
                vec![Value::Integer(35), Value::Integer(1)],
                vec![Value::Integer(50), Value::Integer(2)],
                vec![Value::Integer(67), Value::Integer(1)],
                vec![Value::Missing, Value::Integer(2)],
            ],
        )
    }

    #[test]
    fn default_filter_passes_everything() {
        let t = table();
        assert_eq!(filtered_indices(&t, &CohortFilter::default()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn age_range_is_inclusive_and_excludes_missing() {
        let t = table();
        let f = CohortFilter {
            age_range: Some((35, 50)),
            sex: SexFilter::All,
        };
        assert_eq!(filtered_indices(&t, &f), vec![0, 1]);
    }

    #[test]
    fn sex_filter_matches_codes() {
        let t = table();
        let f = CohortFilter {
            age_range: None,
            sex: SexFilter::Female,
        };
        assert_eq!(filtered_indices(&t, &f), vec![1, 3]);
        assert_eq!(sex_label(&Value::Integer(1)), Some("Male"));
        assert_eq!(sex_label(&Value::Missing), None);
    }

    #[test]
    fn float_sex_codes_match_like_integers() {
        let t = DataTable::new(
            vec![AGE_COLUMN.into(), SEX_COLUMN.into()],
            vec![
                vec![Value::Float(40.0), Value::Float(1.0)],
                vec![Value::Float(52.0), Value::Float(2.0)],
                vec![Value::Float(61.0), Value::Missing],
            ],
        );
        let f = CohortFilter {
            age_range: None,
            sex: SexFilter::Female,
        };
        assert_eq!(filtered_indices(&t, &f), vec![1]);
        let f = CohortFilter {
            age_range: None,
            sex: SexFilter::Male,
        };
        assert_eq!(filtered_indices(&t, &f), vec![0]);
        assert_eq!(sex_label(&Value::Float(2.0)), Some("Female"));
        assert_eq!(sex_label(&Value::Float(1.5)), None);
    }

    #[test]
    fn age_bounds_span_observed_values() {
        assert_eq!(age_bounds(&table()), Some((35, 67)));
    }
}
