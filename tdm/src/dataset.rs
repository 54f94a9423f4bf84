//! Sources of gridded time series.

use crate::{Grid, TdmError};

/// The time, longitude and latitude axes of a dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Coordinates {
    /// Nanoseconds since the epoch, in dataset order.
    pub times: Vec<i64>,

    /// Ascending longitudes.
    pub lons: Vec<f64>,

    /// Ascending latitudes.
    pub lats: Vec<f64>,
}

/// A dataset of variables laid out on a `(time, lat, lon)` grid.
pub trait GridSource {
    /// Returns the dataset's coordinate axes.
    fn coordinates(&self) -> Result<Coordinates, TdmError>;

    /// Returns the `(lat, lon)` slice of `variable` at `time_index`.
    ///
    /// The first row of the returned grid corresponds to the first
    /// (southernmost) latitude.
    fn grid(&self, variable: &str, time_index: usize) -> Result<Grid, TdmError>;
}

/// Widens a float32 coordinate axis through each value's shortest
/// decimal form, so `6.1_f32` becomes `6.1` rather than
/// `6.099999904632568`.
pub fn widen_axis(values: &[f32]) -> Vec<f64> {
    values
        .iter()
        .map(|v| v.to_string().parse().unwrap_or_else(|_| f64::from(*v)))
        .collect()
}
