//! Error type for the raster I/O boundary, distinct from `dtm_core::Error`
//! since a bad file on disk is a different failure mode from a bad
//! hyperparameter.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read raster {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode raster {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: tiff::TiffError,
    },

    #[error("failed to write raster {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode raster {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: tiff::TiffError,
    },

    #[error("raster {path} has unsupported sample format (expected single-band float or u16)")]
    UnsupportedFormat { path: String },

    #[error("all observation pixels are the no-data sentinel ({sentinel}); cannot derive vmin/vmax")]
    AllNoData { sentinel: f64 },

    #[error(transparent)]
    Core(#[from] dtm_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
