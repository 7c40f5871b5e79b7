//! End-to-end pipeline test: write a tiny cohort to disk, load a session,
//! and check assembly, cleaning, filtering, and correlation behave together.

use std::fs;
use std::path::Path;

use cohort_explorer::{
    CohortSession, Correlation, DataPaths, ExplorerError, Measure, SexFilter, UndefinedReason,
};

fn write_fixtures(dir: &Path) {
    fs::write(
        dir.join("cohort.csv"),
        "ID,basis_age,basis_sex,f_2301\n\
         1,40,1,178.0\n\
         2,99,2,164.5\n\
         3,55,2,170.2\n\
         4,62,1,9999\n",
    )
    .unwrap();

    // Subject 4 has no measurements; subject 3's liver volume failed
    // segmentation (negative).
    fs::write(
        dir.join("volume.csv"),
        "SubjectID,volume_1,volume_2\n\
         1,1500000,300000\n\
         2,1600000,310000\n\
         3,-50,295000\n",
    )
    .unwrap();
    fs::write(
        dir.join("diameter.csv"),
        "SubjectID,diameter_1,diameter_2\n\
         1,180,95\n\
         2,185,97\n\
         3,179,96\n",
    )
    .unwrap();
    fs::write(
        dir.join("surface.csv"),
        "SubjectID,surface_1,surface_2\n\
         1,65000,21000\n\
         2,67000,21500\n\
         3,64000,20800\n",
    )
    .unwrap();

    fs::write(dir.join("organ_dict.csv"), "name,id\nliver,1\nspleen,2\n").unwrap();
    fs::write(
        dir.join("field_dict.json"),
        r#"{
            "basis_age": { "field_name_eng": "Age at examination" },
            "basis_sex": { "field_name_eng": "Sex" },
            "f_2301": { "field_name_eng": "Body height" }
        }"#,
    )
    .unwrap();
}

fn session() -> CohortSession {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    CohortSession::load(&DataPaths::in_dir(dir.path())).unwrap()
}

#[test]
fn assembly_produces_the_wide_cleaned_table() {
    let s = session();
    let table = s.table();

    // All demographic rows survive the left joins; the key is gone.
    assert_eq!(table.len(), 4);
    assert!(table.column_index("SubjectID").is_none());
    assert!(table.column_index("ID").is_none());

    // Renamed and rescaled: 1_500_000 mm³ → 1500 cm³.
    let liver = table.column_index("Volume: liver").unwrap();
    assert_eq!(table.rows[0][liver].as_f64(), Some(1500.0));

    // Sentinel age (99) and weight-style sentinel (9999) nulled; negative
    // shape value nulled; unmatched subject has missing measurements.
    let age = table.column_index("basis_age").unwrap();
    assert!(table.rows[1][age].is_missing());
    let height = table.column_index("f_2301").unwrap();
    assert!(table.rows[3][height].is_missing());
    assert!(table.rows[2][liver].is_missing());
    assert!(table.rows[3][liver].is_missing());
}

#[test]
fn filters_scope_the_visible_rows() {
    let mut s = session();
    assert_eq!(s.visible_indices().len(), 4);

    s.set_sex(SexFilter::Female);
    assert_eq!(s.visible_indices(), &[1, 2]);

    // Subject 2's age was a sentinel, so an age range drops it.
    s.set_age_range(Some((30, 60)));
    assert_eq!(s.visible_indices(), &[2]);

    s.set_sex(SexFilter::All);
    s.set_age_range(None);
    assert_eq!(s.visible_indices().len(), 4);
}

#[test]
fn column_resolution_uses_both_dictionaries() {
    let s = session();
    assert_eq!(s.resolve_column("Age at examination").unwrap(), "basis_age");
    assert_eq!(
        s.shape_column(Measure::Diameter, "spleen").unwrap(),
        "Diameter: spleen"
    );
    assert_eq!(
        s.shape_column(Measure::Volume, "brain").unwrap_err(),
        ExplorerError::UnknownOrgan("brain".to_string())
    );
    assert!(matches!(
        s.resolve_column("No such field"),
        Err(ExplorerError::MissingColumn(_))
    ));
}

#[test]
fn correlations_report_rather_than_crash() {
    let s = session();

    // Only subject 1 has both a valid age and a valid liver volume.
    let r = s.pearson("basis_age", "Volume: liver").unwrap();
    assert_eq!(r, Correlation::Undefined(UndefinedReason::TooFewPairs(1)));

    // Diameter columns have three valid pairs each.
    let r = s.pearson("Diameter: liver", "Diameter: spleen").unwrap();
    assert!(r.is_defined());
    assert_eq!(
        r,
        s.pearson("Diameter: spleen", "Diameter: liver").unwrap()
    );
    assert!(s.spearman("Diameter: liver", "Diameter: spleen").unwrap().is_defined());
}

#[test]
fn summaries_group_by_sex_over_visible_rows() {
    let s = session();
    let rows = s.summary_by_sex("Diameter: liver").unwrap();
    assert_eq!(rows.len(), 2);

    let (label, male) = &rows[0];
    assert_eq!(*label, "Male");
    // Subject 4 (male) has no measurements, so only subject 1 counts.
    assert_eq!(male.n, 1);
    assert_eq!(male.mean, 18.0);

    let (_, female) = &rows[1];
    assert_eq!(female.n, 2);
    assert_eq!(female.min, 17.9);
    assert_eq!(female.max, 18.5);
}
