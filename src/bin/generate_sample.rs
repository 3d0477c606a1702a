use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use skill_halflife::data::loader::arrow_schema;
use skill_halflife::data::model::SkillRecord;

const ROWS: usize = 500;

/// (category, typical AI exposure, typical half-life in years)
const CATEGORIES: [(&str, f64, f64); 8] = [
    ("Data Science", 78.0, 2.5),
    ("Software Engineering", 70.0, 3.0),
    ("Cloud Computing", 62.0, 3.5),
    ("Cybersecurity", 48.0, 4.0),
    ("Digital Marketing", 82.0, 2.0),
    ("Project Management", 35.0, 6.5),
    ("Graphic Design", 74.0, 3.0),
    ("Customer Support", 88.0, 1.8),
];

const INDUSTRIES: [&str; 6] = [
    "Technology",
    "Finance",
    "Healthcare",
    "Manufacturing",
    "Retail",
    "Education",
];

const LEARNING_MODES: [&str; 5] = [
    "Online Course",
    "Bootcamp",
    "On-the-Job",
    "Certification",
    "Self-Study",
];

const SEED: u64 = 42;

/// Normal sample via the Box-Muller transform.
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    mean + std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn generate(rng: &mut StdRng) -> Vec<SkillRecord> {
    (0..ROWS)
        .map(|i| {
            let (category, base_exposure, base_half_life) =
                CATEGORIES[rng.gen_range(0..CATEGORIES.len())];

            let exposure = gauss(rng, base_exposure, 12.0).clamp(0.0, 100.0);
            // Highly exposed skills decay faster and are easier to automate.
            let risk = (exposure * 0.8 + gauss(rng, 10.0, 10.0)).clamp(0.0, 100.0);
            let half_life =
                (base_half_life * (1.3 - exposure / 200.0) + gauss(rng, 0.0, 0.6)).max(0.5);
            let reskilling = (half_life * 0.6 + gauss(rng, 0.0, 0.4)).max(0.3);
            let demand = (100.0 - risk * 0.5 + gauss(rng, 0.0, 15.0)).clamp(1.0, 100.0);

            SkillRecord {
                skill_name: Some(format!("{category} #{:03}", i + 1)),
                skill_category: category.to_string(),
                industry: pick(rng, &INDUSTRIES).to_string(),
                ai_exposure_level: round1(exposure),
                automation_risk: round1(risk),
                current_market_demand: round1(demand),
                skill_half_life_years: round1(half_life).max(0.1),
                reskilling_frequency_years: round1(reskilling).max(0.1),
                learning_mode: pick(rng, &LEARNING_MODES).to_string(),
            }
        })
        .collect()
}

fn write_csv(path: &str, records: &[SkillRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for rec in records {
        writer.serialize(rec).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn to_batch(records: &[SkillRecord]) -> Result<RecordBatch> {
    let text = |f: fn(&SkillRecord) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(records.iter().map(f).collect::<Vec<_>>()))
    };
    let number = |f: fn(&SkillRecord) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(records.iter().map(f).collect::<Vec<_>>()))
    };
    let names: ArrayRef = Arc::new(StringArray::from(
        records
            .iter()
            .map(|r| r.skill_name.as_deref())
            .collect::<Vec<_>>(),
    ));

    RecordBatch::try_new(
        arrow_schema(),
        vec![
            names,
            text(|r| r.skill_category.as_str()),
            text(|r| r.industry.as_str()),
            number(|r| r.ai_exposure_level),
            number(|r| r.automation_risk),
            number(|r| r.current_market_demand),
            number(|r| r.skill_half_life_years),
            number(|r| r.reskilling_frequency_years),
            text(|r| r.learning_mode.as_str()),
        ],
    )
    .context("building record batch")
}

fn main() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let records = generate(&mut rng);

    let csv_path = "skill_half_life_ai.csv";
    write_csv(csv_path, &records)?;

    let batch = to_batch(&records)?;
    let parquet_path = "skill_half_life_ai.parquet";
    let file = File::create(parquet_path).with_context(|| format!("creating {parquet_path}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    arrow::util::pretty::print_batches(&[batch.slice(0, 5)]).context("printing preview")?;
    println!(
        "Wrote {} skills ({} categories, {} industries) to {csv_path} and {parquet_path}",
        records.len(),
        CATEGORIES.len(),
        INDUSTRIES.len()
    );
    Ok(())
}
