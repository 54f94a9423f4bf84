//! In-memory multi-band rasters.

use crate::{GeoTransform, TdmError};

/// EPSG code of the geographic (WGS 84) spatial reference all rasters
/// are tagged with.
pub const EPSG_WGS84: u16 = 4326;

/// A 2-D array of samples stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, TdmError> {
        if data.len() != rows * cols {
            return Err(TdmError::ShapeMismatch {
                expected: (rows, cols),
                found: (data.len() / cols.max(1), cols),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Returns (rows, columns).
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the sample at (`row`, `col`), if in bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Applies `f` to every sample.
    #[must_use]
    pub fn map(mut self, f: impl Fn(f32) -> f32) -> Self {
        self.data.iter_mut().for_each(|v| *v = f(*v));
        self
    }

    /// Returns the samples with the row order reversed.
    fn flipped(&self) -> Vec<f32> {
        if self.cols == 0 {
            return Vec::new();
        }
        self.data
            .chunks_exact(self.cols)
            .rev()
            .flatten()
            .copied()
            .collect()
    }
}

/// Builds north-up rasters sharing a single geotransform.
#[derive(Debug, Clone)]
pub struct RasterBuilder {
    transform: GeoTransform,
}

impl RasterBuilder {
    pub fn new(transform: GeoTransform) -> Self {
        Self { transform }
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Returns a raster with one band per grid.
    ///
    /// Source grids have their first row at the southernmost
    /// latitude, so each one is flipped vertically before it's
    /// stored.
    pub fn build(&self, grids: &[Grid]) -> Result<Raster, TdmError> {
        let first = grids.first().ok_or(TdmError::EmptyRaster)?;
        let (rows, cols) = first.shape();
        if rows == 0 || cols == 0 {
            return Err(TdmError::EmptyRaster);
        }
        let mut bands = Vec::with_capacity(grids.len());
        for grid in grids {
            if grid.shape() != (rows, cols) {
                return Err(TdmError::ShapeMismatch {
                    expected: (rows, cols),
                    found: grid.shape(),
                });
            }
            bands.push(grid.flipped());
        }
        Ok(Raster {
            transform: self.transform,
            epsg: EPSG_WGS84,
            rows,
            cols,
            bands,
        })
    }
}

/// A georeferenced raster held in memory, rows running north to
/// south.
#[derive(Debug, Clone)]
pub struct Raster {
    pub(crate) transform: GeoTransform,
    pub(crate) epsg: u16,
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) bands: Vec<Vec<f32>>,
}

impl Raster {
    /// Returns (rows, columns).
    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn epsg(&self) -> u16 {
        self.epsg
    }

    /// Returns the `index`th band (zero-based), rows north to south.
    pub fn band(&self, index: usize) -> Option<&[f32]> {
        self.bands.get(index).map(Vec::as_slice)
    }

    /// Returns all bands interleaved pixel by pixel.
    pub(crate) fn interleaved(&self) -> Vec<f32> {
        let n_pixels = self.rows * self.cols;
        let mut out = Vec::with_capacity(n_pixels * self.bands.len());
        for idx in 0..n_pixels {
            out.extend(self.bands.iter().map(|band| band[idx]));
        }
        out
    }
}
