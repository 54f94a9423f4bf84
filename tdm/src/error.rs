use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TdmError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "netcdf")]
    #[error("{0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("coordinate {0} has no values")]
    EmptyCoordinate(&'static str),

    #[error("grid shape {found:?} does not match raster shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("raster has no bands or no pixels")]
    EmptyRaster,

    #[error("raster of {0} bytes does not fit in a classic TIFF")]
    RasterTooLarge(usize),

    #[error("cannot derive class, name and uid from {0}")]
    ProductName(PathBuf),

    #[error("missing variable {0}")]
    MissingVariable(String),

    #[error("variable {0} is not shaped (time, lat, lon)")]
    VariableShape(String),

    #[error("unsupported time units {0:?}")]
    TimeUnits(String),

    #[error("timestamp {0} ns is out of range")]
    Timestamp(i64),

    #[error("invalid output directory {0}")]
    DfsPath(String),

    #[error("invalid url {0}")]
    Url(String),

    #[error("webhdfs {op} on {path} failed with status {status}")]
    WebHdfs {
        op: &'static str,
        path: String,
        status: u16,
    },
}
