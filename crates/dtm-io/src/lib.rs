//! The raster I/O and normalization boundary named "external
//! collaborator" in the core engine's spec (§1, §6): GeoTIFF-ish
//! single-band raster reading/writing, the no-data-excluding vmin/vmax
//! derivation, and the `solve_rasters`/`solve_from_paths` facades that
//! normalize inputs and hand off to `dtm_core::solve`.

pub mod error;
pub mod normalize;
pub mod raster;

use std::path::Path;

pub use error::{Error, Result};

/// Library entry point named in spec §6:
/// `Solve(o_raw, mask, init_raw, no_data_sentinel, norm_name, σ, λ) → mnt_out`.
///
/// Normalizes `o_raw` and `init_raw` by the output range derived from
/// `o_raw` (excluding `no_data_sentinel`), builds a `dtm_core::Parameters`
/// bundle, and runs the solve. `o_raw`, `mask`, and `init_raw` must all
/// share `width * height` length.
#[allow(clippy::too_many_arguments)]
pub fn solve_rasters(
    o_raw: &[f64],
    mask: &[i32],
    init_raw: &[f64],
    width: usize,
    height: usize,
    no_data_sentinel: f64,
    norm_name: &str,
    sigma: f64,
    lambda: f64,
) -> Result<dtm_core::SolveOutcome> {
    let (vmin, vmax) = normalize::compute_output_range(o_raw, no_data_sentinel)?;
    let o_norm = normalize::normalize(o_raw, vmin, vmax);
    let init_norm = normalize::normalize(init_raw, vmin, vmax);

    let params = dtm_core::Parameters::new(
        o_norm,
        mask.to_vec(),
        width,
        height,
        vmin,
        vmax,
        norm_name,
        sigma,
        lambda,
    )?;

    Ok(dtm_core::solve(&params, &init_norm))
}

/// Same as [`solve_rasters`], but reading the DSM/mask/init from disk
/// and writing the reconstructed DTM back out. This is what
/// `tools/dtm-solve`'s CLI surface wraps.
#[allow(clippy::too_many_arguments)]
pub fn solve_from_paths(
    input_dsm: &Path,
    mask_path: &Path,
    init_path: &Path,
    output_path: &Path,
    no_data_sentinel: f64,
    norm_name: &str,
    sigma: f64,
    lambda: f64,
) -> Result<dtm_core::SolveOutcome> {
    let dsm = raster::read_float_band(input_dsm)?;
    let mask = raster::read_mask_band(mask_path)?;
    let init = raster::read_float_band(init_path)?;

    if mask.width != dsm.width || mask.height != dsm.height {
        return Err(dtm_core::Error::ShapeMismatch {
            what: "mask",
            got_w: mask.width,
            got_h: mask.height,
            want_w: dsm.width,
            want_h: dsm.height,
        }
        .into());
    }
    if init.width != dsm.width || init.height != dsm.height {
        return Err(dtm_core::Error::ShapeMismatch {
            what: "initial solution",
            got_w: init.width,
            got_h: init.height,
            want_w: dsm.width,
            want_h: dsm.height,
        }
        .into());
    }

    let outcome = solve_rasters(
        &dsm.data,
        &mask.data,
        &init.data,
        dsm.width,
        dsm.height,
        no_data_sentinel,
        norm_name,
        sigma,
        lambda,
    )?;

    raster::write_float_band(output_path, &outcome.elevations, dsm.width, dsm.height)?;

    Ok(outcome)
}
