//! Single-band raster I/O. Pure-Rust GeoTIFF-ish decoding via the `tiff`
//! crate, matching the teacher's preference for a pure-Rust decoder over
//! an OpenCV/GDAL binding (see `tools/sampler`'s dependency comment).
//!
//! The core engine only ever sees flat `Vec<f64>`/`Vec<i32>` buffers —
//! everything raster-shaped stops here.

use std::fs::File;
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};

use crate::error::{Error, Result};

/// A decoded single-band raster, row-major, with its dimensions.
pub struct Band<T> {
    pub data: Vec<T>,
    pub width: usize,
    pub height: usize,
}

/// Read a single-band float raster (the DSM or the initial-solution
/// raster). Accepts `F32` or `U16` sample formats, widening to `f64`.
pub fn read_float_band(path: &Path) -> Result<Band<f64>> {
    let path_str = path.display().to_string();
    let file = File::open(path).map_err(|source| Error::Read {
        path: path_str.clone(),
        source,
    })?;
    let mut decoder = Decoder::new(file).map_err(|source| Error::Decode {
        path: path_str.clone(),
        source,
    })?;
    let (width, height) = decoder
        .dimensions()
        .map_err(|source| Error::Decode {
            path: path_str.clone(),
            source,
        })?;
    let image = decoder.read_image().map_err(|source| Error::Decode {
        path: path_str.clone(),
        source,
    })?;

    let data: Vec<f64> = match image {
        DecodingResult::F32(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F64(v) => v,
        DecodingResult::U16(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::U8(v) => v.into_iter().map(|x| x as f64).collect(),
        _ => {
            return Err(Error::UnsupportedFormat { path: path_str });
        }
    };

    Ok(Band {
        data,
        width: width as usize,
        height: height as usize,
    })
}

/// Read a single-band integer mask raster. Accepts `U16` or `U8`.
pub fn read_mask_band(path: &Path) -> Result<Band<i32>> {
    let path_str = path.display().to_string();
    let file = File::open(path).map_err(|source| Error::Read {
        path: path_str.clone(),
        source,
    })?;
    let mut decoder = Decoder::new(file).map_err(|source| Error::Decode {
        path: path_str.clone(),
        source,
    })?;
    let (width, height) = decoder
        .dimensions()
        .map_err(|source| Error::Decode {
            path: path_str.clone(),
            source,
        })?;
    let image = decoder.read_image().map_err(|source| Error::Decode {
        path: path_str.clone(),
        source,
    })?;

    let data: Vec<i32> = match image {
        DecodingResult::U16(v) => v.into_iter().map(|x| x as i32).collect(),
        DecodingResult::U8(v) => v.into_iter().map(|x| x as i32).collect(),
        _ => {
            return Err(Error::UnsupportedFormat { path: path_str });
        }
    };

    Ok(Band {
        data,
        width: width as usize,
        height: height as usize,
    })
}

/// Write a single-band `f32` raster (the reconstructed DTM).
pub fn write_float_band(path: &Path, data: &[f64], width: usize, height: usize) -> Result<()> {
    let path_str = path.display().to_string();
    let file = File::create(path).map_err(|source| Error::Write {
        path: path_str.clone(),
        source,
    })?;
    let mut encoder = TiffEncoder::new(file).map_err(|source| Error::Encode {
        path: path_str.clone(),
        source,
    })?;
    let samples: Vec<f32> = data.iter().map(|&v| v as f32).collect();
    encoder
        .write_image::<colortype::Gray32Float>(width as u32, height as u32, &samples)
        .map_err(|source| Error::Encode {
            path: path_str.clone(),
            source,
        })?;
    Ok(())
}
