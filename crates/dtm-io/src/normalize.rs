//! Pre-processing contract named at the core's boundary (spec §6):
//! derive `(vmin, vmax)` excluding the no-data sentinel, then normalize
//! both the DSM and the initial guess into `[0, 1]`.

use crate::error::{Error, Result};

/// Compute `(vmin, vmax)` over `o_raw`, excluding pixels equal to
/// `no_data_sentinel`. `vmin`/`vmax` are returned as the integer pair
/// spec §3 calls the "output range", truncated toward zero from the raw
/// float extrema (both endpoints, matching the original's `int` cast).
pub fn compute_output_range(o_raw: &[f64], no_data_sentinel: f64) -> Result<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in o_raw {
        if v == no_data_sentinel {
            continue;
        }
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return Err(Error::AllNoData {
            sentinel: no_data_sentinel,
        });
    }
    // Matches Parametres.SAUVER.cpp's `static_cast<int>(...)`, which
    // truncates toward zero; for this system's non-negative elevation
    // data that's `trunc()` on both endpoints, not `floor(min)`/`ceil(max)`.
    Ok((min.trunc(), max.trunc()))
}

/// `(v - vmin) / (vmax - vmin)` applied element-wise.
pub fn normalize(values: &[f64], vmin: f64, vmax: f64) -> Vec<f64> {
    let range = vmax - vmin;
    values.iter().map(|&v| (v - vmin) / range).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_no_data_sentinel_from_range() {
        let o = vec![1.0, 2.0, -9999.0, 5.0];
        let (vmin, vmax) = compute_output_range(&o, -9999.0).unwrap();
        assert_eq!(vmin, 1.0);
        assert_eq!(vmax, 5.0);
    }

    #[test]
    fn truncates_both_endpoints_toward_zero() {
        let o = vec![1.2, 2.0, 5.9];
        let (vmin, vmax) = compute_output_range(&o, -9999.0).unwrap();
        assert_eq!(vmin, 1.0);
        assert_eq!(vmax, 5.0);
    }

    #[test]
    fn all_no_data_is_an_error() {
        let o = vec![-9999.0; 4];
        assert!(compute_output_range(&o, -9999.0).is_err());
    }

    #[test]
    fn normalize_maps_extremes_to_unit_interval() {
        let v = normalize(&[0.0, 5.0, 10.0], 0.0, 10.0);
        assert_eq!(v, vec![0.0, 0.5, 1.0]);
    }
}
