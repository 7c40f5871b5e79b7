use std::collections::HashMap;

use super::dictionary::OrganDictionary;
use super::model::{DataTable, Value};
use crate::error::ExplorerError;

/// Name of the subject key column used for joining.
pub const SUBJECT_KEY: &str = "SubjectID";

// ---------------------------------------------------------------------------
// Measure – the three organ shape measurements
// ---------------------------------------------------------------------------

/// One of the three organ shape measurements extracted from the MRI
/// segmentations, with its raw column prefix and display-unit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Volume,
    Diameter,
    Surface,
}

impl Measure {
    pub const ALL: [Measure; 3] = [Measure::Volume, Measure::Diameter, Measure::Surface];

    /// Display label, also the prefix of assembled column names.
    pub fn label(self) -> &'static str {
        match self {
            Measure::Volume => "Volume",
            Measure::Diameter => "Diameter",
            Measure::Surface => "Surface",
        }
    }

    /// Column-name prefix in the raw measurement tables (`volume_12` etc.).
    pub fn column_prefix(self) -> &'static str {
        match self {
            Measure::Volume => "volume_",
            Measure::Diameter => "diameter_",
            Measure::Surface => "surface_",
        }
    }

    /// Divisor converting raw units (mm³/mm/mm²) to display units.
    pub fn divisor(self) -> f64 {
        match self {
            Measure::Volume => 1000.0,
            Measure::Diameter => 10.0,
            Measure::Surface => 100.0,
        }
    }

    /// Unit of the assembled column values.
    pub fn display_unit(self) -> &'static str {
        match self {
            Measure::Volume => "cm³",
            Measure::Diameter => "cm",
            Measure::Surface => "cm²",
        }
    }
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Assembled column name for a measure/organ pair: `"Volume: liver"`.
pub fn shape_column_name(measure: Measure, organ: &str) -> String {
    format!("{}: {}", measure.label(), organ)
}

// ---------------------------------------------------------------------------
// Assembly: rename, rescale, left-join
// ---------------------------------------------------------------------------

/// Build the single wide analysis table:
/// * rename each measurement table's columns via the organ dictionary,
/// * rescale raw units to display units,
/// * left-join all three onto the demographic table by subject,
/// * drop the subject key.
///
/// Every demographic row survives; subjects without measurements get
/// `Missing` cells. An organ ID missing from the dictionary fails assembly.
pub fn assemble(
    cohort: DataTable,
    volume: DataTable,
    diameter: DataTable,
    surface: DataTable,
    organs: &OrganDictionary,
) -> Result<DataTable, ExplorerError> {
    let mut wide = cohort;
    // Raw exports key subjects as plain `ID`.
    wide.rename_column("ID", SUBJECT_KEY);
    if wide.column_index(SUBJECT_KEY).is_none() {
        return Err(ExplorerError::MissingKeyColumn(SUBJECT_KEY.to_string()));
    }

    for (measure, table) in [
        (Measure::Volume, volume),
        (Measure::Diameter, diameter),
        (Measure::Surface, surface),
    ] {
        let mut table = table;
        rename_measurement_columns(&mut table, measure, organs)?;
        rescale(&mut table, measure.divisor());
        left_join(&mut wide, &table)?;
        log::debug!("Merged {} {} columns", table.width() - 1, measure.label());
    }

    wide.drop_column(SUBJECT_KEY);
    log::info!(
        "Assembled wide table: {} subjects, {} columns",
        wide.len(),
        wide.width()
    );
    Ok(wide)
}

/// Rewrite `<prefix><organ_id>` columns to `"{Measure}: {organ}"`.
/// The subject key column is left untouched; any other column must parse.
fn rename_measurement_columns(
    table: &mut DataTable,
    measure: Measure,
    organs: &OrganDictionary,
) -> Result<(), ExplorerError> {
    let prefix = measure.column_prefix();
    for name in &mut table.columns {
        if name == SUBJECT_KEY || name == "ID" {
            *name = SUBJECT_KEY.to_string();
            continue;
        }
        let id: u32 = name
            .strip_prefix(prefix)
            .and_then(|rest| rest.parse().ok())
            .ok_or_else(|| ExplorerError::BadMeasurementColumn(name.clone(), prefix))?;
        let organ = organs
            .name_for(id)
            .ok_or(ExplorerError::UnknownOrganId(id))?;
        *name = shape_column_name(measure, organ);
    }
    Ok(())
}

/// Divide every numeric non-key cell by `divisor`.
fn rescale(table: &mut DataTable, divisor: f64) {
    let key_idx = table.column_index(SUBJECT_KEY);
    for row in &mut table.rows {
        for (idx, cell) in row.iter_mut().enumerate() {
            if Some(idx) == key_idx {
                continue;
            }
            if let Some(v) = cell.as_f64() {
                *cell = Value::Float(v / divisor);
            }
        }
    }
}

/// Left-join `other` onto `base` by the subject key: every base row is kept,
/// unmatched subjects get `Missing` cells for the new columns.
fn left_join(base: &mut DataTable, other: &DataTable) -> Result<(), ExplorerError> {
    let base_key = base
        .column_index(SUBJECT_KEY)
        .ok_or_else(|| ExplorerError::MissingKeyColumn(SUBJECT_KEY.to_string()))?;
    let other_key = other
        .column_index(SUBJECT_KEY)
        .ok_or_else(|| ExplorerError::MissingKeyColumn(SUBJECT_KEY.to_string()))?;

    // Index measurement rows by subject. Later duplicates win, mirroring a
    // last-write lookup; cohort exports have unique subjects.
    let by_subject: HashMap<&Value, &Vec<Value>> = other
        .rows
        .iter()
        .map(|row| (&row[other_key], row))
        .collect();

    let joined_cols: Vec<usize> = (0..other.width()).filter(|&i| i != other_key).collect();
    for &col in &joined_cols {
        base.columns.push(other.columns[col].clone());
    }

    for row in &mut base.rows {
        match by_subject.get(&row[base_key]) {
            Some(other_row) => {
                for &col in &joined_cols {
                    row.push(other_row[col].clone());
                }
            }
            None => {
                for _ in &joined_cols {
                    row.push(Value::Missing);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organ_dict() -> OrganDictionary {
        [("liver".to_string(), 1), ("spleen".to_string(), 2)]
            .into_iter()
            .collect()
    }

    fn cohort() -> DataTable {
        DataTable::new(
            vec!["ID".into(), "basis_age".into()],
            vec![
                vec![Value::Integer(1), Value::Integer(40)],
                vec![Value::Integer(2), Value::Integer(99)],
            ],
        )
    }

    fn measurement(prefix: &str, rows: Vec<Vec<Value>>) -> DataTable {
        DataTable::new(vec!["SubjectID".into(), format!("{prefix}1")], rows)
    }

    #[test]
    fn rename_and_rescale_follow_the_dictionary() {
        let volume = measurement(
            "volume_",
            vec![vec![Value::Integer(1), Value::Integer(1_500_000)]],
        );
        let wide = assemble(
            cohort(),
            volume,
            measurement("diameter_", vec![]),
            measurement("surface_", vec![]),
            &organ_dict(),
        )
        .unwrap();

        let idx = wide.column_index("Volume: liver").unwrap();
        assert_eq!(wide.rows[0][idx], Value::Float(1500.0));
    }

    #[test]
    fn left_join_keeps_every_cohort_row() {
        // Subject 2 has no measurements at all.
        let volume = measurement(
            "volume_",
            vec![vec![Value::Integer(1), Value::Float(2000.0)]],
        );
        let wide = assemble(
            cohort(),
            volume,
            measurement("diameter_", vec![]),
            measurement("surface_", vec![]),
            &organ_dict(),
        )
        .unwrap();

        assert_eq!(wide.len(), 2);
        let idx = wide.column_index("Volume: liver").unwrap();
        assert_eq!(wide.rows[1][idx], Value::Missing);
    }

    #[test]
    fn subject_key_is_dropped_after_assembly() {
        let wide = assemble(
            cohort(),
            measurement("volume_", vec![]),
            measurement("diameter_", vec![]),
            measurement("surface_", vec![]),
            &organ_dict(),
        )
        .unwrap();
        assert_eq!(wide.column_index(SUBJECT_KEY), None);
        assert_eq!(wide.column_index("ID"), None);
    }

    #[test]
    fn unknown_organ_id_is_a_hard_failure() {
        let volume = DataTable::new(
            vec!["SubjectID".into(), "volume_77".into()],
            vec![vec![Value::Integer(1), Value::Integer(100)]],
        );
        let err = assemble(
            cohort(),
            volume,
            measurement("diameter_", vec![]),
            measurement("surface_", vec![]),
            &organ_dict(),
        )
        .unwrap_err();
        assert_eq!(err, ExplorerError::UnknownOrganId(77));
    }

    #[test]
    fn malformed_measurement_column_is_rejected() {
        let volume = DataTable::new(
            vec!["SubjectID".into(), "vol_1".into()],
            vec![vec![Value::Integer(1), Value::Integer(100)]],
        );
        let err = assemble(
            cohort(),
            volume,
            measurement("diameter_", vec![]),
            measurement("surface_", vec![]),
            &organ_dict(),
        )
        .unwrap_err();
        assert!(matches!(err, ExplorerError::BadMeasurementColumn(_, _)));
    }
}
