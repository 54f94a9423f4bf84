//! GeoTIFF encoding of [`Raster`]s.
//!
//! Rasters are written as a single strip of pixel-interleaved 32-bit
//! floats, Deflate compressed, with the GeoTIFF tags needed to place
//! them on a geographic (lon/lat) grid.
//!
//! # References
//!
//! 1. [GeoTIFF format specification](https://docs.ogc.org/is/19-008r4/19-008r4.html)
//! 1. [TIFF 6.0](https://www.itu.int/itudoc/itu-t/com16/tiff-fx/docs/tiff6.pdf)

use crate::{Raster, TdmError};
use byteorder::{NativeEndian, WriteBytesExt};
use chrono::{DateTime, Utc};
use flate2::{write::ZlibEncoder, Compression};
use std::{
    fs,
    io::{Cursor, Seek, Write},
    path::Path,
};
use tiff::{encoder::TiffEncoder, tags::Tag};

const GT_MODEL_TYPE_GEO_KEY: u16 = 1024;
const GT_RASTER_TYPE_GEO_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;

const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

const COMPRESSION_DEFLATE: u16 = 8;
const PHOTOMETRIC_BLACK_IS_ZERO: u16 = 1;
const PLANAR_CHUNKY: u16 = 1;
const SAMPLE_FORMAT_IEEE_FP: u16 = 3;
const EXTRA_SAMPLE_UNSPECIFIED: u16 = 0;

impl Raster {
    /// Writes `self` to `path` as a GeoTIFF, replacing any existing
    /// file.
    ///
    /// When given, `timestamp` is stored in the TIFF `DateTime` tag.
    pub fn write_geotiff<P: AsRef<Path>>(
        &self,
        path: P,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<(), TdmError> {
        let mut buf = Cursor::new(Vec::new());
        self.encode_geotiff(&mut buf, timestamp)?;
        fs::write(path, buf.into_inner())?;
        Ok(())
    }

    /// Encodes `self` as a GeoTIFF into `out`.
    pub fn encode_geotiff<W: Write + Seek>(
        &self,
        out: W,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<(), TdmError> {
        let n_bands = self.band_count();
        if n_bands == 0 || self.rows == 0 || self.cols == 0 {
            return Err(TdmError::EmptyRaster);
        }
        let width = to_u32(self.cols, self.cols)?;
        let height = to_u32(self.rows, self.rows)?;
        let samples_per_pixel =
            u16::try_from(n_bands).map_err(|_| TdmError::RasterTooLarge(n_bands))?;

        let strip = self.compressed_strip()?;
        let strip_len = to_u32(strip.len(), strip.len())?;

        let mut encoder = TiffEncoder::new(out)?;
        let mut dir = encoder.new_directory()?;

        dir.write_tag(Tag::ImageWidth, width)?;
        dir.write_tag(Tag::ImageLength, height)?;
        dir.write_tag(Tag::BitsPerSample, vec![32_u16; n_bands].as_slice())?;
        dir.write_tag(Tag::Compression, COMPRESSION_DEFLATE)?;
        dir.write_tag(Tag::PhotometricInterpretation, PHOTOMETRIC_BLACK_IS_ZERO)?;
        dir.write_tag(Tag::SamplesPerPixel, samples_per_pixel)?;
        dir.write_tag(Tag::RowsPerStrip, height)?;
        dir.write_tag(Tag::PlanarConfiguration, PLANAR_CHUNKY)?;
        dir.write_tag(
            Tag::SampleFormat,
            vec![SAMPLE_FORMAT_IEEE_FP; n_bands].as_slice(),
        )?;
        if n_bands > 1 {
            dir.write_tag(
                Tag::ExtraSamples,
                vec![EXTRA_SAMPLE_UNSPECIFIED; n_bands - 1].as_slice(),
            )?;
        }
        if let Some(timestamp) = timestamp {
            let datetime = timestamp.format("%Y:%m:%d %H:%M:%S").to_string();
            dir.write_tag(Tag::DateTime, datetime.as_str())?;
        }

        let gt = self.transform;
        dir.write_tag(
            Tag::ModelPixelScaleTag,
            [gt.pixel_width, -gt.pixel_height, 0.0].as_slice(),
        )?;
        dir.write_tag(
            Tag::ModelTiepointTag,
            [0.0, 0.0, 0.0, gt.origin.x, gt.origin.y, 0.0].as_slice(),
        )?;
        dir.write_tag(
            Tag::GeoKeyDirectoryTag,
            self.geo_keys().as_slice(),
        )?;

        let offset = dir.write_data(strip.as_slice())?;
        let offset = u32::try_from(offset).map_err(|_| TdmError::RasterTooLarge(strip.len()))?;
        dir.write_tag(Tag::StripOffsets, offset)?;
        dir.write_tag(Tag::StripByteCounts, strip_len)?;
        dir.finish()?;
        Ok(())
    }
}

/// Private API
impl Raster {
    /// Returns the pixel-interleaved samples, zlib compressed.
    fn compressed_strip(&self) -> Result<Vec<u8>, TdmError> {
        let mut wtr = ZlibEncoder::new(Vec::new(), Compression::default());
        for sample in self.interleaved() {
            wtr.write_f32::<NativeEndian>(sample)?;
        }
        Ok(wtr.finish()?)
    }

    /// Returns the GeoKey directory: header followed by
    /// `(key, location, count, value)` entries.
    #[rustfmt::skip]
    fn geo_keys(&self) -> Vec<u16> {
        vec![
            1, 1, 0, 3, // version, revision, minor revision, number of keys
            GT_MODEL_TYPE_GEO_KEY, 0, 1, MODEL_TYPE_GEOGRAPHIC,
            GT_RASTER_TYPE_GEO_KEY, 0, 1, RASTER_PIXEL_IS_AREA,
            GEOGRAPHIC_TYPE_GEO_KEY, 0, 1, self.epsg,
        ]
    }
}

fn to_u32(value: usize, size: usize) -> Result<u32, TdmError> {
    u32::try_from(value).map_err(|_| TdmError::RasterTooLarge(size))
}
