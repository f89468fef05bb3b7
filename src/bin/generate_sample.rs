//! Writes a synthetic employee dataset with the columns the dashboard uses.
//!
//! Usage: `generate_sample [OUTPUT] [--rows N]` (defaults: `data/EA.csv`, 1470).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Write a synthetic HR attrition CSV
#[derive(Parser, Debug)]
#[command(name = "generate_sample", version, about)]
struct Args {
    /// Output CSV path
    #[arg(default_value = "data/EA.csv")]
    output: PathBuf,

    /// Number of employees to generate
    #[arg(long, default_value_t = 1470)]
    rows: usize,
}

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    /// Uniform integer in `lo..=hi`.
    fn int_between(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }

    /// Weighted choice; weights need not sum to 1.
    fn pick<'a>(&mut self, choices: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = choices.iter().map(|c| c.1).sum();
        let mut roll = self.next_f64() * total;
        for &(name, weight) in choices {
            if roll < weight {
                return name;
            }
            roll -= weight;
        }
        choices[choices.len() - 1].0
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const DEPARTMENTS: [(&str, f64); 3] = [
    ("Research & Development", 0.65),
    ("Sales", 0.30),
    ("Human Resources", 0.05),
];

const MARITAL: [(&str, f64); 3] = [("Married", 0.46), ("Single", 0.32), ("Divorced", 0.22)];

fn job_roles(department: &str) -> &'static [(&'static str, f64)] {
    match department {
        "Sales" => &[
            ("Sales Executive", 0.7),
            ("Sales Representative", 0.2),
            ("Manager", 0.1),
        ],
        "Human Resources" => &[("Human Resources", 0.8), ("Manager", 0.2)],
        _ => &[
            ("Research Scientist", 0.3),
            ("Laboratory Technician", 0.27),
            ("Manufacturing Director", 0.15),
            ("Healthcare Representative", 0.13),
            ("Research Director", 0.08),
            ("Manager", 0.07),
        ],
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let Args { output, rows } = Args::parse();

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("creating {}", output.display()))?;

    writer.write_record([
        "EmployeeNumber",
        "Age",
        "Attrition",
        "Department",
        "Education",
        "Gender",
        "JobRole",
        "MaritalStatus",
        "MonthlyIncome",
        "YearsAtCompany",
        "YearsSinceLastPromotion",
        "YearsWithCurrManager",
    ])?;

    let mut leavers = 0usize;
    for id in 1..=rows {
        let age = rng.gauss(37.0, 9.0).round().clamp(18.0, 60.0) as i64;
        let department = rng.pick(&DEPARTMENTS);
        let role = rng.pick(job_roles(department));
        let gender = rng.pick(&[("Male", 0.6), ("Female", 0.4)]);
        let marital = rng.pick(&MARITAL);
        let education = rng.int_between(1, 5);

        let max_tenure = (age - 18).max(0);
        let years_at_company = rng.int_between(0, max_tenure.min(40));
        let since_promotion = rng.int_between(0, years_at_company.min(15));
        let with_manager = rng.int_between(0, years_at_company.min(17));

        let seniority = if role == "Manager" || role.ends_with("Director") { 2.2 } else { 1.0 };
        let income = (1000.0 + (age as f64 - 18.0) * 190.0 * seniority + rng.gauss(0.0, 900.0))
            .clamp(1009.0, 19999.0)
            .round() as i64;

        // Young, single, low-paid, short-tenure sales staff leave most.
        let mut risk = 0.06;
        if age < 30 {
            risk += 0.10;
        }
        if marital == "Single" {
            risk += 0.08;
        }
        if income < 3000 {
            risk += 0.08;
        }
        if years_at_company < 3 {
            risk += 0.06;
        }
        if department == "Sales" {
            risk += 0.04;
        }
        let attrition = if rng.next_f64() < risk { "Yes" } else { "No" };
        if attrition == "Yes" {
            leavers += 1;
        }

        writer.write_record([
            id.to_string(),
            age.to_string(),
            attrition.to_string(),
            department.to_string(),
            education.to_string(),
            gender.to_string(),
            role.to_string(),
            marital.to_string(),
            income.to_string(),
            years_at_company.to_string(),
            since_promotion.to_string(),
            with_manager.to_string(),
        ])?;
    }
    writer.flush()?;

    log::info!("{leavers} of {rows} synthetic employees marked as leavers");
    println!("Wrote {rows} employees to {}", output.display());
    Ok(())
}
