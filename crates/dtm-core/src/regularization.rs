//! Regularization functional (C4, spec §4.4): sum of squared discrete
//! second derivatives along X and Y, and its analytic gradient.

use crate::params::Parameters;

/// `R(x)`: three-point second-difference stencils `(z0 - 2*z1 + z2)^2`,
/// accumulated along each row where `tx > 4` and along each column where
/// `ty > 4`. The 1D sweeps skip the first and last cell on their axis —
/// the stencil needs both neighbors, so a code `> 4` can never occur
/// there anyway (see `classification`).
pub fn value(x: &[f64], p: &Parameters) -> f64 {
    let w = p.width();
    let h = p.height();
    let mut total = 0.0;

    // X axis: slide a 3-wide window along each row.
    for j in 0..h {
        if w < 3 {
            continue;
        }
        for i in 1..w - 1 {
            let idx = j * w + i;
            if p.type_x(idx) > 4 {
                let z0 = x[idx - 1];
                let z1 = x[idx];
                let z2 = x[idx + 1];
                let d = z0 - 2.0 * z1 + z2;
                total += d * d;
            }
        }
    }

    // Y axis: slide a 3-tall window along each column.
    if h >= 3 {
        for i in 0..w {
            for j in 1..h - 1 {
                let idx = j * w + i;
                if p.type_y(idx) > 4 {
                    let z0 = x[idx - w];
                    let z1 = x[idx];
                    let z2 = x[idx + w];
                    let d = z0 - 2.0 * z1 + z2;
                    total += d * d;
                }
            }
        }
    }

    total
}

/// `∇R(x)`. Written into `out` (length `p.len()`), `0` at excluded pixels.
///
/// For each active pixel and each axis, the per-`Type` coefficient table
/// of spec §4.4 gives the exact derivative of the sum of squared second
/// differences the center pixel participates in (as the stencil's own
/// center, or as a neighbor borrowed by an adjacent stencil).
pub fn gradient_into(x: &[f64], p: &Parameters, out: &mut [f64]) {
    let w = p.width();
    let n = p.len();

    for i in 0..n {
        if p.is_excluded(i) {
            out[i] = 0.0;
            continue;
        }

        let mut temp = 0.0f64;
        let mut coef = 0.0f64;

        accumulate_axis(x, i, 1, p.type_x(i), &mut temp, &mut coef);
        accumulate_axis(x, i, w, p.type_y(i), &mut temp, &mut coef);

        out[i] = temp + coef * x[i];
    }
}

/// Add one axis's contribution to `temp`/`coef` for pixel `i`, where
/// `stride` is `1` for X and `width` for Y.
#[inline]
fn accumulate_axis(x: &[f64], i: usize, stride: usize, ty: i32, temp: &mut f64, coef: &mut f64) {
    let zm2 = || x[i - 2 * stride];
    let zm1 = || x[i - stride];
    let zp1 = || x[i + stride];
    let zp2 = || x[i + 2 * stride];

    match ty {
        0 | 1 | 3 => {}
        2 => {
            *temp += 2.0 * zm2() - 4.0 * zm1();
            *coef += 2.0;
        }
        4 => {
            *temp += -4.0 * zp1() + 2.0 * zp2();
            *coef += 2.0;
        }
        5 => {
            *temp += 2.0 * zm2() - 8.0 * zm1() - 4.0 * zp1();
            *coef += 10.0;
        }
        6 => {
            *temp += -4.0 * zm1() - 4.0 * zp1();
            *coef += 8.0;
        }
        7 => {
            *temp += 2.0 * zp2() - 4.0 * zm1() - 8.0 * zp1();
            *coef += 10.0;
        }
        8 => {
            *temp += 2.0 * zm2() + 2.0 * zp2() - 8.0 * zm1() - 8.0 * zp1();
            *coef += 12.0;
        }
        -1 => {}
        other => unreachable!("derivative type out of range: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn flat_surface_has_zero_value_and_gradient() {
        let p = Parameters::new(vec![0.0; 25], vec![0; 25], 5, 5, 0.0, 1.0, "L2", 1.0, 1.0).unwrap();
        let x = vec![0.3; 25];
        assert_eq!(value(&x, &p), 0.0);
        let mut grad = vec![f64::NAN; 25];
        gradient_into(&x, &p, &mut grad);
        for g in grad {
            assert_abs_diff_eq!(g, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn single_row_has_no_y_contribution() {
        let p = Parameters::new(vec![0.0; 5], vec![0; 5], 5, 1, 0.0, 1.0, "L2", 1.0, 1.0).unwrap();
        for i in 0..5 {
            assert_eq!(p.type_y(i), 0);
        }
        let x = vec![0.0, 1.0, 5.0, 1.0, 0.0];
        // Value only reflects the X-axis stencils.
        let v = value(&x, &p);
        assert!(v > 0.0);
    }

    #[test]
    fn masked_pixel_has_zero_gradient() {
        let mut mask = vec![0i32; 25];
        mask[12] = 11;
        let p = Parameters::new(vec![0.0; 25], mask, 5, 5, 0.0, 1.0, "L2", 1.0, 1.0).unwrap();
        let x: Vec<f64> = (0..25).map(|i| i as f64 * 0.01).collect();
        let mut grad = vec![0.0; 25];
        gradient_into(&x, &p, &mut grad);
        assert_eq!(grad[12], 0.0);
    }

    #[test]
    fn gradient_matches_finite_difference_on_interior_bump() {
        let p = Parameters::new(vec![0.0; 25], vec![0; 25], 5, 5, 0.0, 1.0, "L2", 1.0, 1.0).unwrap();
        let mut x: Vec<f64> = vec![0.0; 25];
        x[12] = 0.2; // a bump in the center
        x[7] = 0.1;
        x[13] = -0.05;

        let mut analytic = vec![0.0; 25];
        gradient_into(&x, &p, &mut analytic);

        let h = 1e-6;
        for i in 0..25 {
            if p.is_excluded(i) {
                continue;
            }
            let mut xp = x.clone();
            xp[i] += h;
            let mut xm = x.clone();
            xm[i] -= h;
            let fd = (value(&xp, &p) - value(&xm, &p)) / (2.0 * h);
            assert_abs_diff_eq!(analytic[i], fd, epsilon = 1e-4);
        }
    }
}
