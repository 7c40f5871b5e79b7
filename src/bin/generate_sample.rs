use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use cohort_explorer::{CohortSession, DataPaths, Measure};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// One chance in `n`.
    fn one_in(&mut self, n: u64) -> bool {
        self.next_u64() % n == 0
    }
}

const ORGANS: [(&str, u32); 6] = [
    ("liver", 1),
    ("spleen", 2),
    ("kidney_left", 3),
    ("kidney_right", 4),
    ("pancreas", 5),
    ("heart", 6),
];

struct Subject {
    id: i64,
    age: i64,
    sex: i64,
    height_cm: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = Path::new("data");
    std::fs::create_dir_all(out_dir).context("creating output directory")?;

    let mut rng = SimpleRng::new(42);

    // ---- Cohort: 500 subjects, ages 20–69, sentinel-polluted fields ----
    let subjects: Vec<Subject> = (0..500)
        .map(|i| {
            let sex = 1 + (rng.next_u64() % 2) as i64;
            let base_height = if sex == 1 { 178.0 } else { 165.0 };
            Subject {
                id: 1000 + i,
                age: 20 + (rng.next_u64() % 50) as i64,
                sex,
                height_cm: rng.gauss(base_height, 7.0),
            }
        })
        .collect();

    write_cohort(&subjects, &mut rng, &out_dir.join("cohort.csv"))?;
    for measure in Measure::ALL {
        write_measurements(&subjects, measure, &mut rng, out_dir)?;
    }
    write_organ_dict(&out_dir.join("organ_dict.csv"))?;
    write_field_dict(&out_dir.join("field_dict.json"))?;

    println!("Wrote {} subjects to {}", subjects.len(), out_dir.display());

    // Reload through the full pipeline as a sanity check.
    let session = CohortSession::load(&DataPaths::in_dir(out_dir))?;
    let x = "basis_age";
    let y = session.shape_column(Measure::Volume, "liver")?;
    println!(
        "Pipeline check: {} rows, {} columns; pearson(age, liver volume): {}",
        session.table().len(),
        session.table().width(),
        session.pearson(x, &y)?
    );
    Ok(())
}

fn write_cohort(subjects: &[Subject], rng: &mut SimpleRng, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["ID", "basis_age", "basis_sex", "f_2301", "f_2302"])?;

    for s in subjects {
        // Age and weight occasionally carry "not answered" codes.
        let age = if rng.one_in(40) { 99 } else { s.age };
        let weight = if rng.one_in(30) {
            9999.0
        } else {
            rng.gauss(0.45 * s.height_cm, 8.0)
        };
        writer.write_record([
            s.id.to_string(),
            age.to_string(),
            s.sex.to_string(),
            format!("{:.1}", s.height_cm),
            format!("{weight:.1}"),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// One measurement table in raw units: `SubjectID` plus one `<prefix><id>`
/// column per organ. Roughly one subject in 20 is skipped entirely, so the
/// left join has unmatched rows to fill.
fn write_measurements(
    subjects: &[Subject],
    measure: Measure,
    rng: &mut SimpleRng,
    out_dir: &Path,
) -> Result<()> {
    let file = match measure {
        Measure::Volume => "volume.csv",
        Measure::Diameter => "diameter.csv",
        Measure::Surface => "surface.csv",
    };
    let path = out_dir.join(file);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["SubjectID".to_string()];
    header.extend(
        ORGANS
            .iter()
            .map(|(_, id)| format!("{}{}", measure.column_prefix(), id)),
    );
    writer.write_record(&header)?;

    // Raw-unit scale per measure (mm³ / mm / mm²).
    let (base, spread) = match measure {
        Measure::Volume => (1_400_000.0, 250_000.0),
        Measure::Diameter => (160.0, 25.0),
        Measure::Surface => (65_000.0, 9_000.0),
    };

    for s in subjects {
        if rng.one_in(20) {
            continue;
        }
        let mut record = vec![s.id.to_string()];
        for (i, _) in ORGANS.iter().enumerate() {
            // Mild age trend so correlations have something to find;
            // a rare segmentation failure shows up as a negative value.
            let organ_scale = 1.0 - 0.12 * i as f64;
            let age_trend = 1.0 + 0.006 * (s.age as f64 - 45.0);
            let value = if rng.one_in(80) {
                -1.0
            } else {
                rng.gauss(organ_scale * base * age_trend, spread)
            };
            record.push(format!("{value:.1}"));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_organ_dict(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["name", "id"])?;
    for (name, id) in ORGANS {
        writer.write_record([name, &id.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_field_dict(path: &Path) -> Result<()> {
    let dict = json!({
        "basis_age": { "field_name_eng": "Age at examination" },
        "basis_sex": { "field_name_eng": "Sex" },
        "f_2301": { "field_name_eng": "Body height" },
        "f_2302": { "field_name_eng": "Body weight" },
    });
    std::fs::write(path, serde_json::to_string_pretty(&dict)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
