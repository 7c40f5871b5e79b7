use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::data::assemble::{assemble, shape_column_name, Measure};
use crate::data::clean::clean_table;
use crate::data::dictionary::{FieldDictionary, OrganDictionary};
use crate::data::filter::{age_bounds, filtered_indices, sex_label, CohortFilter, SexFilter};
use crate::data::loader::{load_field_dict, load_organ_dict, load_table};
use crate::data::model::DataTable;
use crate::error::ExplorerError;
use crate::stats::correlation::{pearson, spearman, Correlation};
use crate::stats::summary::{summarize_column, ColumnSummary};

// ---------------------------------------------------------------------------
// Input file configuration
// ---------------------------------------------------------------------------

/// Locations of the six read-only source files, resolved once at session
/// start. Defaults match the `data/` layout written by `generate_sample`.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub cohort: PathBuf,
    pub volume: PathBuf,
    pub diameter: PathBuf,
    pub surface: PathBuf,
    pub organ_dict: PathBuf,
    pub field_dict: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths::in_dir("data")
    }
}

impl DataPaths {
    /// Conventional file names under one directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        DataPaths {
            cohort: dir.join("cohort.csv"),
            volume: dir.join("volume.csv"),
            diameter: dir.join("diameter.csv"),
            surface: dir.join("surface.csv"),
            organ_dict: dir.join("organ_dict.csv"),
            field_dict: dir.join("field_dict.json"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cohort session: the derived interface a presentation layer consumes
// ---------------------------------------------------------------------------

/// One explorer session: the assembled and cleaned wide table, both
/// dictionaries, and the active row filter with its cached indices.
/// Source tables are immutable; every session loads fresh.
pub struct CohortSession {
    table: DataTable,
    organs: OrganDictionary,
    fields: FieldDictionary,
    filter: CohortFilter,
    visible_indices: Vec<usize>,
}

impl CohortSession {
    /// Run the full pipeline: load → assemble → clean. The filter starts
    /// wide open (all rows visible).
    pub fn load(paths: &DataPaths) -> Result<Self> {
        let organs = load_organ_dict(&paths.organ_dict)?;
        let fields = load_field_dict(&paths.field_dict)?;

        let cohort = load_table(&paths.cohort)
            .with_context(|| format!("loading cohort table {}", paths.cohort.display()))?;
        let volume = load_table(&paths.volume)
            .with_context(|| format!("loading volume table {}", paths.volume.display()))?;
        let diameter = load_table(&paths.diameter)
            .with_context(|| format!("loading diameter table {}", paths.diameter.display()))?;
        let surface = load_table(&paths.surface)
            .with_context(|| format!("loading surface table {}", paths.surface.display()))?;

        let wide = assemble(cohort, volume, diameter, surface, &organs)
            .context("assembling the wide table")?;
        let table = clean_table(&wide);
        log::info!(
            "Session ready: {} subjects, {} columns",
            table.len(),
            table.width()
        );

        let visible_indices = (0..table.len()).collect();
        Ok(CohortSession {
            table,
            organs,
            fields,
            filter: CohortFilter::default(),
            visible_indices,
        })
    }

    // -- Read access --

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn organs(&self) -> &OrganDictionary {
        &self.organs
    }

    pub fn fields(&self) -> &FieldDictionary {
        &self.fields
    }

    pub fn filter(&self) -> &CohortFilter {
        &self.filter
    }

    /// Indices of rows passing the current filter.
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible_indices
    }

    /// Observed age span, for initialising a range selector.
    pub fn age_bounds(&self) -> Option<(i64, i64)> {
        age_bounds(&self.table)
    }

    // -- Filter mutation --

    pub fn set_age_range(&mut self, range: Option<(i64, i64)>) {
        self.filter.age_range = range;
        self.refilter();
    }

    pub fn set_sex(&mut self, sex: SexFilter) {
        self.filter.sex = sex;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.table, &self.filter);
    }

    // -- Column resolution --

    /// Assembled column name for a measure/organ pair, erroring on organs
    /// the dictionary does not know.
    pub fn shape_column(&self, measure: Measure, organ: &str) -> Result<String, ExplorerError> {
        if self.organs.id_for(organ).is_none() {
            return Err(ExplorerError::UnknownOrgan(organ.to_string()));
        }
        let column = shape_column_name(measure, organ);
        if self.table.column_index(&column).is_none() {
            return Err(ExplorerError::MissingColumn(column));
        }
        Ok(column)
    }

    /// Resolve an English field name to the column it identifies, falling
    /// back to treating the name as a column directly (shape columns carry
    /// no field ID).
    pub fn resolve_column(&self, name: &str) -> Result<String, ExplorerError> {
        let column = self.fields.field_id(name).unwrap_or(name);
        if self.table.column_index(column).is_none() {
            return Err(ExplorerError::MissingColumn(column.to_string()));
        }
        Ok(column.to_string())
    }

    // -- Analysis over the session --

    /// Numeric values of a column over the visible rows (distribution view).
    pub fn column_values(&self, column: &str) -> Result<Vec<f64>, ExplorerError> {
        let idx = self
            .table
            .column_index(column)
            .ok_or_else(|| ExplorerError::MissingColumn(column.to_string()))?;
        Ok(self
            .visible_indices
            .iter()
            .filter_map(|&row| self.table.rows[row][idx].as_f64())
            .filter(|v| v.is_finite())
            .collect())
    }

    /// Valid (x, y) pairs over the whole table, for a scatter view.
    pub fn paired_points(&self, x: &str, y: &str) -> Result<Vec<(f64, f64)>, ExplorerError> {
        let (xs, ys) = crate::stats::correlation::paired_values(&self.table, x, y)?;
        Ok(xs.into_iter().zip(ys).collect())
    }

    /// Pearson correlation over the whole cleaned table.
    pub fn pearson(&self, x: &str, y: &str) -> Result<Correlation, ExplorerError> {
        pearson(&self.table, x, y)
    }

    /// Spearman correlation over the whole cleaned table.
    pub fn spearman(&self, x: &str, y: &str) -> Result<Correlation, ExplorerError> {
        spearman(&self.table, x, y)
    }

    /// Per-sex descriptive statistics of a column over the visible rows,
    /// as (label, summary) pairs.
    pub fn summary_by_sex(
        &self,
        column: &str,
    ) -> Result<Vec<(&'static str, ColumnSummary)>, ExplorerError> {
        let sex_idx = self
            .table
            .column_index(crate::data::filter::SEX_COLUMN)
            .ok_or_else(|| {
                ExplorerError::MissingColumn(crate::data::filter::SEX_COLUMN.to_string())
            })?;

        let mut out = Vec::new();
        for label in ["Male", "Female"] {
            let indices: Vec<usize> = self
                .visible_indices
                .iter()
                .copied()
                .filter(|&row| sex_label(&self.table.rows[row][sex_idx]) == Some(label))
                .collect();
            if let Some(summary) = summarize_column(&self.table, column, &indices)? {
                out.push((label, summary));
            }
        }
        Ok(out)
    }
}
