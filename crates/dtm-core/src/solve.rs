//! Top-level solve: wires the objective and minimizer together and
//! projects the result back to physical units (spec §4.6's final step).

use crate::error::SolveStatus;
use crate::minimizer::{self, MinimizeOutcome};
use crate::objective::Objective;
use crate::params::Parameters;

/// Output of a full solve: elevations in physical units (the input
/// raster's native scale, not the internal `[0,1]` normalization), plus
/// the status the caller should report.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// `out[i] = x[i] * (vmax - vmin) + vmin`.
    pub elevations: Vec<f64>,
    pub status: SolveStatus,
    pub final_gradient_norm: f64,
}

/// Run the DTM reconstruction solve given a built [`Parameters`] bundle
/// and a normalized initial guess (same `[0,1]` convention as the
/// observation vector in `params`).
///
/// `init` must have length `params.len()`.
pub fn solve(params: &Parameters, init: &[f64]) -> SolveOutcome {
    assert_eq!(
        init.len(),
        params.len(),
        "initial guess length must match the parameter grid size"
    );

    let mut objective = Objective::new(params);
    let MinimizeOutcome {
        x,
        status,
        final_gradient_norm,
    } = minimizer::minimize(&mut objective, init);

    let k = params.range();
    let vmin = params.vmin();
    let elevations: Vec<f64> = x.iter().map(|&v| v * k + vmin).collect();

    SolveOutcome {
        elevations,
        status,
        final_gradient_norm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S1: flat input, all trusted, L2, sigma=1, lambda=1 → output flat,
    /// converges within a couple of iterations.
    #[test]
    fn s1_flat_surface_stays_flat() {
        let p = Parameters::new(vec![0.0; 9], vec![0; 9], 3, 3, 0.0, 1.0, "L2", 1.0, 1.0).unwrap();
        let out = solve(&p, &vec![0.0; 9]);
        for e in &out.elevations {
            assert!(e.abs() < 1e-6, "expected ~0, got {e}");
        }
        assert!(out.status.iterations() <= 2, "iterations: {}", out.status.iterations());
    }

    /// S2: single spike in the center relaxes downward under L2 +
    /// regularization while corners stay near zero.
    #[test]
    fn s2_center_spike_relaxes() {
        #[rustfmt::skip]
        let o = vec![
            0.0, 0.0, 0.0,
            0.0, 10.0, 0.0,
            0.0, 0.0, 0.0,
        ];
        let p = Parameters::new(o.clone(), vec![0; 9], 3, 3, 0.0, 10.0, "L2", 1.0, 1.0).unwrap();
        let init: Vec<f64> = o.iter().map(|v| v / 10.0).collect();
        let out = solve(&p, &init);
        assert!(out.elevations[4] < 10.0, "center: {}", out.elevations[4]);
        for &corner in &[0, 2, 6, 8] {
            assert!(out.elevations[corner].abs() < 1.0, "corner {corner}: {}", out.elevations[corner]);
        }
    }

    /// S3: a masked column never moves, exactly, since its gradient is
    /// identically zero regardless of the data around it.
    /// S6: a 16x16 noisy ramp with salt-and-pepper outliers, solved with
    /// HuberTukey, should end up closer to the clean ramp than the noisy
    /// input was — the whole point of the robust data term.
    #[test]
    fn s6_huber_tukey_reduces_rms_error_on_noisy_ramp() {
        let width = 16;
        let height = 16;
        let n = width * height;

        // Deterministic xorshift, not `rand`: dtm-core has no RNG
        // dependency, and this only needs a fixed repeatable pattern.
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
                // ~10% salt-and-pepper outliers.
                *v = if (r / 10) % 2 == 0 { 0.0 } else { 1.0 };
            } else {
                *v += ((r % 1000) as f64 / 1000.0 - 0.5) * 0.02;
            }
        }

        let mask = vec![0i32; n];
        let p = Parameters::new(noisy.clone(), mask, width, height, 0.0, 1.0, "hubertukey", 0.5, 0.02).unwrap();
        let out = solve(&p, &noisy);

        let rms = |a: &[f64], b: &[f64]| -> f64 {
            let sum_sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
            (sum_sq / a.len() as f64).sqrt()
        };

        let rms_before = rms(&noisy, &clean);
        let rms_after = rms(&out.elevations, &clean);
        assert!(
            rms_after < rms_before,
            "expected improvement: before={rms_before}, after={rms_after}"
        );
    }

    /// Feeding a converged solve's output back in as the initial guess
    /// should be a fixed point: negligible further change.
    #[test]
    fn converged_output_is_a_fixed_point() {
        #[rustfmt::skip]
        let o = vec![
            0.0, 0.1, 0.0,
            0.1, 0.8, 0.1,
            0.0, 0.1, 0.0,
        ];
        let p = Parameters::new(o.clone(), vec![0; 9], 3, 3, 0.0, 10.0, "L2", 1.0, 1.0).unwrap();
        let first = solve(&p, &o);
        let first_norm: Vec<f64> = first
            .elevations
            .iter()
            .map(|&v| (v - p.vmin()) / p.range())
            .collect();
        let second = solve(&p, &first_norm);
        for (a, b) in first.elevations.iter().zip(&second.elevations) {
            assert!((a - b).abs() < 1e-6, "not a fixed point: {a} vs {b}");
        }
    }

    #[test]
    fn s3_masked_column_is_frozen() {
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
        let init = o.clone();
        let out = solve(&p, &init);
        for y in 0..height {
            let idx = y * width + 2;
            assert!(
                (out.elevations[idx] - (init[idx] * p.range() + p.vmin())).abs() < 1e-9,
                "masked pixel moved at row {y}"
            );
        }
    }
}
