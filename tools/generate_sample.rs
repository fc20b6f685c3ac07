//! Sample Data Generator
//!
//! Writes a synthetic client sample CSV and a matching logistic model artifact
//! so the API can be run locally without the production files.

use anyhow::Context;
use rand::Rng;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Numeric feature columns in file order (identifier excluded)
const FEATURES: [&str; 8] = [
    "DAYS_BIRTH",
    "AMT_INCOME_TOTAL",
    "AMT_CREDIT",
    "AMT_ANNUITY",
    "CNT_CHILDREN",
    "DAYS_EMPLOYED",
    "EXT_SOURCE_2",
    "FLAG_MOBIL",
];

/// Logistic weights on standardized features
const COEFFICIENTS: [f64; 8] = [0.35, -0.10, 0.20, 0.15, 0.05, -0.25, -0.90, 0.0];
const INTERCEPT: f64 = -2.2;

/// One synthetic applicant, serialized as one CSV row
#[derive(Debug, Serialize)]
struct ClientRow {
    #[serde(rename = "SK_ID_CURR")]
    sk_id_curr: i64,
    #[serde(rename = "DAYS_BIRTH")]
    days_birth: i64,
    #[serde(rename = "AMT_INCOME_TOTAL")]
    amt_income_total: f64,
    #[serde(rename = "AMT_CREDIT")]
    amt_credit: f64,
    #[serde(rename = "AMT_ANNUITY")]
    amt_annuity: Option<f64>,
    #[serde(rename = "CNT_CHILDREN")]
    cnt_children: i64,
    #[serde(rename = "DAYS_EMPLOYED")]
    days_employed: i64,
    #[serde(rename = "EXT_SOURCE_2")]
    ext_source_2: Option<f64>,
    #[serde(rename = "FLAG_MOBIL")]
    flag_mobil: i64,
    #[serde(rename = "NAME_CONTRACT_TYPE")]
    name_contract_type: &'static str,
    #[serde(rename = "CODE_GENDER")]
    code_gender: &'static str,
}

/// Model artifact in the format the API loads
#[derive(Debug, Serialize)]
struct ModelArtifact {
    name: &'static str,
    features: Vec<&'static str>,
    coefficients: Vec<f64>,
    intercept: f64,
}

/// Client generator for local runs
struct ClientGenerator {
    rng: rand::rngs::ThreadRng,
    next_id: i64,
}

impl ClientGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            next_id: 100_003,
        }
    }

    /// The documented reference client
    fn reference_client() -> ClientRow {
        ClientRow {
            sk_id_curr: 100_002,
            days_birth: -9461,
            amt_income_total: 202_500.0,
            amt_credit: 406_597.5,
            amt_annuity: Some(24_700.5),
            cnt_children: 0,
            days_employed: -637,
            ext_source_2: Some(0.262949),
            flag_mobil: 1,
            name_contract_type: "Cash loans",
            code_gender: "M",
        }
    }

    /// Generate a random applicant
    fn generate(&mut self) -> ClientRow {
        let id = self.next_id;
        self.next_id += self.rng.gen_range(1..4);

        let income = (self.rng.gen_range(25_650.0..450_000.0_f64) / 450.0).round() * 450.0;
        let credit = (income * self.rng.gen_range(0.8..6.0_f64) / 4.5).round() * 4.5;
        let term_years: f64 = self.rng.gen_range(5.0..25.0);

        ClientRow {
            sk_id_curr: id,
            days_birth: -self.rng.gen_range(7_500..25_200),
            amt_income_total: income,
            amt_credit: credit,
            amt_annuity: if self.rng.gen_bool(0.02) {
                None
            } else {
                Some((credit / term_years / 1.5).round() * 1.5)
            },
            cnt_children: self.rng.gen_range(0..4),
            days_employed: -self.rng.gen_range(0..15_000),
            ext_source_2: if self.rng.gen_bool(0.05) {
                None
            } else {
                Some(self.rng.gen_range(0.0..0.85))
            },
            flag_mobil: 1,
            name_contract_type: self.random_choice(&["Cash loans", "Revolving loans"]),
            code_gender: self.random_choice(&["M", "F"]),
        }
    }

    fn random_choice(&mut self, choices: &[&'static str]) -> &'static str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_sample=info".parse()?),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let out_dir = args.get(1).map(|s| s.as_str()).unwrap_or("data");
    let count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10_000);

    info!(out_dir = %out_dir, count = count, "Generating sample data");

    let out_dir = Path::new(out_dir);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let csv_path = out_dir.join("test_df_sample.csv");
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("Failed to create {}", csv_path.display()))?;

    let mut generator = ClientGenerator::new();
    writer.serialize(ClientGenerator::reference_client())?;
    for _ in 1..count {
        writer.serialize(generator.generate())?;
    }
    writer.flush()?;

    let artifact = ModelArtifact {
        name: "synthetic_logreg",
        features: FEATURES.to_vec(),
        coefficients: COEFFICIENTS.to_vec(),
        intercept: INTERCEPT,
    };
    let model_path = out_dir.join("model.json");
    std::fs::write(&model_path, serde_json::to_string_pretty(&artifact)?)
        .with_context(|| format!("Failed to write {}", model_path.display()))?;

    info!(
        dataset = %csv_path.display(),
        model = %model_path.display(),
        rows = count.max(1),
        "Sample data written"
    );

    Ok(())
}
