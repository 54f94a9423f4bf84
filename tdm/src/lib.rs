//! Georeferenced product trees for the TDM weather data lake.
//!
//! Two workflows share this crate:
//!
//! 1. Gridded forecasts (NetCDF, behind the default `netcdf` feature)
//!    are rasterized into one GeoTIFF per time step and variable
//!    group, laid out under `tdm/odata/product/...` and described by
//!    a `description.json` manifest. See [`export::dump_to_tree`].
//! 1. Timestamp-named radar images are renamed and copied to a local
//!    or WebHDFS directory. See [`radar`] and [`dfs`].

mod dataset;
pub mod dfs;
mod error;
pub mod export;
mod geotiff;
mod geotransform;
mod manifest;
#[cfg(feature = "netcdf")]
mod nc;
mod path;
pub mod radar;
mod raster;
mod simulation;
pub mod time;

#[cfg(feature = "netcdf")]
pub use crate::nc::NcSource;
pub use crate::{
    dataset::{widen_axis, Coordinates, GridSource},
    error::TdmError,
    geotransform::GeoTransform,
    manifest::{resource_url, Manifest, Resource, Resources},
    path::PathBuilder,
    raster::{Grid, Raster, RasterBuilder, EPSG_WGS84},
    simulation::{
        coord_range, Overrides, ProductName, Simulation, DEFAULT_GROUP, EMPTY_GROUP_FALLBACK,
    },
};
