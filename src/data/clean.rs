use super::model::{DataTable, Value};

/// Survey placeholder codes meaning "not answered / not applicable".
pub const SENTINEL_CODES: [i64; 4] = [88, 99, 999, 9999];

/// Whether a column holds an organ shape measurement, by naming convention.
pub fn is_shape_column(name: &str) -> bool {
    ["Volume", "Diameter", "Surface"]
        .iter()
        .any(|kw| name.contains(kw))
}

fn is_sentinel(value: &Value) -> bool {
    match value {
        Value::Integer(i) => SENTINEL_CODES.contains(i),
        Value::Float(f) => SENTINEL_CODES.iter().any(|&s| *f == s as f64),
        _ => false,
    }
}

/// Null out invalid values: sentinel codes everywhere, negatives in shape
/// columns. Column identity and row count are untouched; the transform is
/// idempotent.
pub fn clean_table(table: &DataTable) -> DataTable {
    let shape_cols: Vec<bool> = table.columns.iter().map(|c| is_shape_column(c)).collect();

    let rows = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&shape_cols)
                .map(|(cell, &is_shape)| {
                    if is_sentinel(cell) {
                        return Value::Missing;
                    }
                    if is_shape && cell.as_f64().is_some_and(|v| v < 0.0) {
                        return Value::Missing;
                    }
                    cell.clone()
                })
                .collect()
        })
        .collect();

    DataTable::new(table.columns.clone(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataTable {
        DataTable::new(
            vec!["basis_age".into(), "Volume: liver".into()],
            vec![
                vec![Value::Integer(40), Value::Float(1500.0)],
                vec![Value::Integer(99), Value::Float(-3.5)],
                vec![Value::Float(9999.0), Value::Integer(88)],
                vec![Value::Integer(-5), Value::Missing],
            ],
        )
    }

    #[test]
    fn sentinels_are_nulled_in_every_column() {
        let cleaned = clean_table(&sample());
        for row in &cleaned.rows {
            for cell in row {
                if let Some(v) = cell.as_f64() {
                    assert!(!SENTINEL_CODES.contains(&(v as i64)));
                }
            }
        }
        assert_eq!(cleaned.rows[1][0], Value::Missing);
        assert_eq!(cleaned.rows[2][0], Value::Missing);
        assert_eq!(cleaned.rows[2][1], Value::Missing);
    }

    #[test]
    fn negatives_are_nulled_only_in_shape_columns() {
        let cleaned = clean_table(&sample());
        assert_eq!(cleaned.rows[1][1], Value::Missing);
        // basis_age is not a shape column: a negative survives.
        assert_eq!(cleaned.rows[3][0], Value::Integer(-5));
    }

    #[test]
    fn shape_preserved_and_idempotent() {
        let table = sample();
        let once = clean_table(&table);
        assert_eq!(once.columns, table.columns);
        assert_eq!(once.len(), table.len());
        assert_eq!(clean_table(&once), once);
    }
}
