/// Offline test harness for running the S1-S6 scenario battery
/// (spec §8) against the reconstruction engine directly, without
/// touching disk. Grounded in `crates/terra-test`'s offline harness,
/// but fully wired up since the engine it drives already exists.
use anyhow::Result;
use clap::Parser;

use dtm_core::norm::{Norm, DEFAULT_HUBER_COEF};
use dtm_core::{classification, Parameters};

#[derive(Parser, Debug)]
#[command(name = "dtm-test", about = "Offline scenario battery for the DTM reconstruction engine")]
struct Args {
    /// Run a single named scenario (s1..s6); omit to run the whole battery.
    #[arg(short, long)]
    scenario: Option<String>,
}

struct ScenarioResult {
    name: &'static str,
    passed: bool,
    detail: String,
}

fn s1_flat_surface_stays_flat() -> ScenarioResult {
    let p = Parameters::new(vec![0.0; 9], vec![0; 9], 3, 3, 0.0, 1.0, "L2", 1.0, 1.0).unwrap();
    let out = dtm_core::solve(&p, &vec![0.0; 9]);
    let max_abs = out.elevations.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()));
    let passed = max_abs < 1e-6 && out.status.iterations() <= 2;
    ScenarioResult {
        name: "S1 flat surface stays flat",
        passed,
        detail: format!("max|out|={max_abs:.3e}, iterations={}", out.status.iterations()),
    }
}

fn s2_center_spike_relaxes() -> ScenarioResult {
    #[rustfmt::skip]
    let o = vec![
        0.0, 0.0, 0.0,
        0.0, 10.0, 0.0,
        0.0, 0.0, 0.0,
    ];
    let p = Parameters::new(o.clone(), vec![0; 9], 3, 3, 0.0, 10.0, "L2", 1.0, 1.0).unwrap();
    let init: Vec<f64> = o.iter().map(|v| v / 10.0).collect();
    let out = dtm_core::solve(&p, &init);
    let corners_ok = [0, 2, 6, 8].iter().all(|&i| out.elevations[i].abs() < 1.0);
    let passed = out.elevations[4] < 10.0 && corners_ok;
    ScenarioResult {
        name: "S2 center spike relaxes",
        passed,
        detail: format!("center={:.4}, iterations={}", out.elevations[4], out.status.iterations()),
    }
}

fn s3_masked_column_is_frozen() -> ScenarioResult {
    let width = 5;
    let height = 5;
    let mut mask = vec![0i32; width * height];
    for y in 0..height {
        mask[y * width + 2] = 11;
    }
    let o: Vec<f64> = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x as f64 + y as f64) / 10.0))
        .collect();
    let p = Parameters::new(o.clone(), mask, width, height, 0.0, 1.0, "huber", 0.5, 0.02).unwrap();
    let out = dtm_core::solve(&p, &o);
    let mut max_drift = 0.0_f64;
    for y in 0..height {
        let idx = y * width + 2;
        let expected = o[idx] * p.range() + p.vmin();
        max_drift = max_drift.max((out.elevations[idx] - expected).abs());
    }
    ScenarioResult {
        name: "S3 masked column is frozen",
        passed: max_drift < 1e-9,
        detail: format!("max drift={max_drift:.3e}"),
    }
}

fn s4_derivative_classification_check() -> ScenarioResult {
    let mask = vec![0, 0, 11, 0, 0];
    let tx = classification::classify_x(&mask, 5, 1);
    let ty = classification::classify_y(&mask, 5, 1);
    let passed = tx == vec![3, 1, -1, 3, 1] && ty == vec![0, 0, -1, 0, 0];
    ScenarioResult {
        name: "S4 derivative classification",
        passed,
        detail: format!("tx={tx:?}, ty={ty:?}"),
    }
}

fn s5_huber_boundary_continuity() -> ScenarioResult {
    let c = DEFAULT_HUBER_COEF;
    let sigma = 1.0;
    let huber = Norm::huber(c);
    let base = huber.distance(c, sigma);
    let eps = 1e-6;
    let bumped = huber.distance(c + eps, sigma);
    let expected = base + c * eps;
    let err = (bumped - expected).abs();
    ScenarioResult {
        name: "S5 Huber boundary continuity",
        passed: err < 1e-9,
        detail: format!("|bumped-expected|={err:.3e}"),
    }
}

fn s6_huber_tukey_reduces_rms_error_on_noisy_ramp() -> ScenarioResult {
    let width = 16;
    let height = 16;
    let n = width * height;

    let mut state: u32 = 0x9e3779b9;
    let mut next_u32 = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };

    let clean: Vec<f64> = (0..n)
        .map(|i| {
            let x = (i % width) as f64;
            let y = (i / width) as f64;
            (x + y) / (2.0 * (width - 1) as f64)
        })
        .collect();

    let mut noisy = clean.clone();
    for v in noisy.iter_mut() {
        let r = next_u32();
        if r % 10 == 0 {
            *v = if (r / 10) % 2 == 0 { 0.0 } else { 1.0 };
        } else {
            *v += ((r % 1000) as f64 / 1000.0 - 0.5) * 0.02;
        }
    }

    let mask = vec![0i32; n];
    let p = Parameters::new(noisy.clone(), mask, width, height, 0.0, 1.0, "hubertukey", 0.5, 0.02).unwrap();
    let out = dtm_core::solve(&p, &noisy);

    let rms = |a: &[f64], b: &[f64]| -> f64 {
        let sum_sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
        (sum_sq / a.len() as f64).sqrt()
    };
    let rms_before = rms(&noisy, &clean);
    let rms_after = rms(&out.elevations, &clean);

    ScenarioResult {
        name: "S6 HuberTukey reduces RMS error",
        passed: rms_after < rms_before,
        detail: format!("rms_before={rms_before:.4}, rms_after={rms_after:.4}"),
    }
}

fn all_scenarios() -> Vec<ScenarioResult> {
    vec![
        s1_flat_surface_stays_flat(),
        s2_center_spike_relaxes(),
        s3_masked_column_is_frozen(),
        s4_derivative_classification_check(),
        s5_huber_boundary_continuity(),
        s6_huber_tukey_reduces_rms_error_on_noisy_ramp(),
    ]
}

fn print_table(results: &[ScenarioResult]) {
    for r in results {
        let status = if r.passed { "PASS" } else { "FAIL" };
        eprintln!("[{status}] {:<32} {}", r.name, r.detail);
    }
    let failed = results.iter().filter(|r| !r.passed).count();
    eprintln!("{}/{} scenarios passed", results.len() - failed, results.len());
}

fn main() -> Result<()> {
    let args = Args::parse();

    let results = match args.scenario.as_deref() {
        None => all_scenarios(),
        Some("s1") => vec![s1_flat_surface_stays_flat()],
        Some("s2") => vec![s2_center_spike_relaxes()],
        Some("s3") => vec![s3_masked_column_is_frozen()],
        Some("s4") => vec![s4_derivative_classification_check()],
        Some("s5") => vec![s5_huber_boundary_continuity()],
        Some("s6") => vec![s6_huber_tukey_reduces_rms_error_on_noisy_ramp()],
        Some(other) => {
            eprintln!("unknown scenario {other:?}, expected one of s1..s6");
            std::process::exit(1);
        }
    };

    print_table(&results);
    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}
