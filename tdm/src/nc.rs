//! NetCDF backed [`GridSource`].

use crate::{time::decode_cf_time, widen_axis, Coordinates, Grid, GridSource, TdmError};
use log::debug;
use netcdf::{
    types::{FloatType, NcVariableType},
    AttributeValue, Variable,
};
use std::path::{Path, PathBuf};

/// A NetCDF file exposing `time`, `lon` and `lat` coordinate
/// variables.
pub struct NcSource {
    file: netcdf::File,
    path: PathBuf,
}

impl NcSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TdmError> {
        let path = path.as_ref().to_owned();
        debug!("opening {path:?}");
        let file = netcdf::open(&path)?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn variable(&self, name: &str) -> Result<Variable<'_>, TdmError> {
        self.file
            .variable(name)
            .ok_or_else(|| TdmError::MissingVariable(name.to_owned()))
    }

    fn axis(&self, name: &str) -> Result<Vec<f64>, TdmError> {
        let var = self.variable(name)?;
        match var.vartype() {
            NcVariableType::Float(FloatType::F32) => {
                Ok(widen_axis(&var.get_values::<f32, _>(..)?))
            }
            _ => Ok(var.get_values::<f64, _>(..)?),
        }
    }
}

impl GridSource for NcSource {
    fn coordinates(&self) -> Result<Coordinates, TdmError> {
        let time = self.variable("time")?;
        let units = match attr_str(&time, "units") {
            Some(units) => units,
            None => return Err(TdmError::TimeUnits(String::new())),
        };
        let raw_times = time.get_values::<f64, _>(..)?;
        Ok(Coordinates {
            times: decode_cf_time(&raw_times, &units)?,
            lons: self.axis("lon")?,
            lats: self.axis("lat")?,
        })
    }

    fn grid(&self, variable: &str, time_index: usize) -> Result<Grid, TdmError> {
        let var = self.variable(variable)?;
        let (rows, cols) = match var.dimensions() {
            [time, lat, lon] if time_index < time.len() => (lat.len(), lon.len()),
            _ => return Err(TdmError::VariableShape(variable.to_owned())),
        };

        let scale = attr_f64(&var, "scale_factor").unwrap_or(1.0);
        let offset = attr_f64(&var, "add_offset").unwrap_or(0.0);
        #[allow(clippy::cast_possible_truncation)]
        let fill = attr_f64(&var, "_FillValue").map(|f| f as f32);

        let raw = var.get_values::<f32, _>((time_index, .., ..))?;
        #[allow(clippy::cast_possible_truncation)]
        let data = raw
            .into_iter()
            .map(|v| match fill {
                Some(fill) if v == fill => f32::NAN,
                _ => (f64::from(v) * scale + offset) as f32,
            })
            .collect();
        Grid::new(rows, cols, data)
    }
}

fn attr_str(var: &Variable, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

fn attr_f64(var: &Variable, name: &str) -> Option<f64> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Double(d) => Some(d),
        AttributeValue::Float(f) => Some(f64::from(f)),
        AttributeValue::Short(s) => Some(f64::from(s)),
        AttributeValue::Int(i) => Some(f64::from(i)),
        _ => None,
    }
}
