//! Mapping of a regular lon/lat grid onto a north-up affine transform.

use crate::TdmError;
use geo::geometry::Coord;

/// Affine transform from (column, row) to (longitude, latitude).
///
/// There is no rotation term: the grid is assumed to be aligned with
/// the meridians and parallels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// Longitude and latitude of the top-left corner.
    pub origin: Coord<f64>,

    /// Degrees of longitude per column. Positive.
    pub pixel_width: f64,

    /// Degrees of latitude per row. Negative, since rows run
    /// north-to-south.
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Returns the transform for a grid whose source rows start at
    /// the southernmost latitude.
    ///
    /// This is coordinated with the row flip performed by
    /// [`RasterBuilder`](crate::RasterBuilder): the origin is the
    /// *last* latitude and the pixel height is negative.
    pub fn from_coords(lons: &[f64], lats: &[f64]) -> Result<Self, TdmError> {
        let (lon_first, lon_last) = first_last(lons).ok_or(TdmError::EmptyCoordinate("lon"))?;
        let (lat_first, lat_last) = first_last(lats).ok_or(TdmError::EmptyCoordinate("lat"))?;

        #[allow(clippy::cast_precision_loss)]
        let (n_lons, n_lats) = (lons.len() as f64, lats.len() as f64);

        Ok(Self {
            origin: Coord {
                x: lon_first,
                y: lat_last,
            },
            pixel_width: (lon_last - lon_first) / n_lons,
            pixel_height: -(lat_last - lat_first) / n_lats,
        })
    }

    /// Returns the six coefficients in GDAL order:
    /// `[x0, dx, row_rotation, y0, col_rotation, dy]`.
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.origin.x,
            self.pixel_width,
            0.0,
            self.origin.y,
            0.0,
            self.pixel_height,
        ]
    }

    /// Returns the geographic coordinate of the top-left corner of
    /// the pixel at (`col`, `row`).
    #[allow(clippy::cast_precision_loss)]
    pub fn pixel_to_coord(&self, col: usize, row: usize) -> Coord<f64> {
        Coord {
            x: self.origin.x + col as f64 * self.pixel_width,
            y: self.origin.y + row as f64 * self.pixel_height,
        }
    }
}

fn first_last(values: &[f64]) -> Option<(f64, f64)> {
    Some((*values.first()?, *values.last()?))
}

#[cfg(test)]
mod tests {
    use super::{Coord, GeoTransform};
    use crate::TdmError;
    use approx::assert_relative_eq;

    #[test]
    fn test_north_up_signs() {
        let lons = [6.0, 6.5, 7.0, 7.5];
        let lats = [36.0, 36.25, 36.5];
        let gt = GeoTransform::from_coords(&lons, &lats).unwrap();
        assert!(gt.pixel_width > 0.0);
        assert!(gt.pixel_height < 0.0);
        assert_eq!(gt.origin.y, 36.5);
        assert_eq!(gt.origin.x, 6.0);
        assert_relative_eq!(gt.pixel_width, 1.5 / 4.0);
        assert_relative_eq!(gt.pixel_height, -0.5 / 3.0);
    }

    #[test]
    fn test_as_array() {
        let gt = GeoTransform::from_coords(&[0.0, 1.0], &[10.0, 12.0]).unwrap();
        assert_eq!(gt.as_array(), [0.0, 0.5, 0.0, 12.0, 0.0, -1.0]);
    }

    #[test]
    fn test_pixel_to_coord() {
        let gt = GeoTransform::from_coords(&[0.0, 1.0], &[10.0, 12.0]).unwrap();
        assert_eq!(gt.pixel_to_coord(0, 0), Coord { x: 0.0, y: 12.0 });
        assert_eq!(gt.pixel_to_coord(2, 1), Coord { x: 1.0, y: 11.0 });
    }

    #[test]
    fn test_empty_coordinates() {
        assert!(matches!(
            GeoTransform::from_coords(&[], &[1.0]),
            Err(TdmError::EmptyCoordinate("lon"))
        ));
        assert!(matches!(
            GeoTransform::from_coords(&[1.0], &[]),
            Err(TdmError::EmptyCoordinate("lat"))
        ));
    }
}
