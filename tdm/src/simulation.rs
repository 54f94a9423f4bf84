//! Simulation descriptors derived from a dataset and its file name.

use crate::{time::format_timestamp, Coordinates, TdmError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Product group used when none is given.
pub const DEFAULT_GROUP: &str = "meteosim";

/// Product group used when an empty one is given.
pub const EMPTY_GROUP_FALLBACK: &str = "simulation";

/// Class, name and uid of a product, as encoded in a file name of
/// the form `<class>_<name>_<uid>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductName {
    pub class: String,
    pub name: String,
    pub uid: String,
}

impl ProductName {
    /// Parses the stem of `path`.
    ///
    /// The first `_`-separated token is the class, the last is the
    /// uid and everything in between is the name. Stems that don't
    /// yield three non-empty parts are rejected.
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Self, TdmError> {
        let mk_err = || TdmError::ProductName(path.as_ref().to_owned());
        let stem = path
            .as_ref()
            .file_stem()
            .and_then(std::ffi::OsStr::to_str)
            .ok_or_else(mk_err)?;
        let (class, rest) = stem.split_once('_').ok_or_else(mk_err)?;
        let (name, uid) = rest.rsplit_once('_').ok_or_else(mk_err)?;
        if class.is_empty() || name.is_empty() || uid.is_empty() {
            return Err(mk_err());
        }
        Ok(Self {
            class: class.to_owned(),
            name: name.to_owned(),
            uid: uid.to_owned(),
        })
    }
}

/// Explicit values which take precedence over those parsed from the
/// file name.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub group: Option<String>,
    pub class: Option<String>,
    pub uid: Option<String>,
}

/// Provenance and spatio-temporal extent of a dataset.
///
/// Field order is the key order of the `description` object in
/// `description.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulation {
    pub group: String,
    pub class: String,
    pub name: String,
    pub uid: String,
    pub path: PathBuf,
    pub history: Vec<String>,
    pub start_time: String,
    pub end_time: String,
    pub lon_range: String,
    pub lat_range: String,
}

impl Simulation {
    /// Returns the descriptor for the dataset at `path`.
    ///
    /// If the file name can't be parsed, both a class and a uid
    /// override are required and the whole file stem is used as the
    /// name.
    pub fn new(
        path: &Path,
        coords: &Coordinates,
        overrides: &Overrides,
    ) -> Result<Self, TdmError> {
        let parsed = match ProductName::parse(path) {
            Ok(parsed) => parsed,
            Err(e) => match (&overrides.class, &overrides.uid) {
                (Some(class), Some(uid)) => ProductName {
                    class: class.clone(),
                    name: path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .ok_or(e)?,
                    uid: uid.clone(),
                },
                _ => return Err(e),
            },
        };
        let group = match overrides.group.as_deref() {
            None => DEFAULT_GROUP,
            Some("") => EMPTY_GROUP_FALLBACK,
            Some(group) => group,
        }
        .to_owned();
        let class = overrides.class.clone().unwrap_or(parsed.class);
        let uid = overrides.uid.clone().unwrap_or(parsed.uid);

        let start = *coords.times.first().ok_or(TdmError::EmptyCoordinate("time"))?;
        let end = *coords.times.last().ok_or(TdmError::EmptyCoordinate("time"))?;

        Ok(Self {
            group,
            class,
            name: parsed.name,
            uid,
            path: path.to_owned(),
            history: vec![format!(
                "Extracted by tdm map_to_tree {}",
                env!("CARGO_PKG_VERSION")
            )],
            start_time: format_timestamp(start),
            end_time: format_timestamp(end),
            lon_range: coord_range(&coords.lons).ok_or(TdmError::EmptyCoordinate("lon"))?,
            lat_range: coord_range(&coords.lats).ok_or(TdmError::EmptyCoordinate("lat"))?,
        })
    }

    /// Returns the `<lon_range>_<lat_range>` path segment.
    pub fn lonlat(&self) -> String {
        format!("{}_{}", self.lon_range, self.lat_range)
    }
}

/// Returns `first:count:step` for a regularly spaced coordinate,
/// where `step` is `(last - first) / count` with three significant
/// digits.
pub fn coord_range(values: &[f64]) -> Option<String> {
    let first = *values.first()?;
    let last = *values.last()?;
    #[allow(clippy::cast_precision_loss)]
    let step = (last - first) / values.len() as f64;
    Some(format!(
        "{}:{}:{}",
        format_float(first),
        values.len(),
        format_general(step, 3)
    ))
}

/// Formats `value` as a float literal, always keeping a decimal
/// point for finite integral values (`6` becomes `6.0`).
fn format_float(value: f64) -> String {
    let s = value.to_string();
    if value.is_finite() && !s.contains(['.', 'e', 'E']) {
        format!("{s}.0")
    } else {
        s
    }
}

/// Formats `value` with `precision` significant digits, switching to
/// scientific notation for very large or small magnitudes and
/// stripping trailing zeros, like C's `%g`.
fn format_general(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    let precision_i = precision as i32;
    if exp < -4 || exp >= precision_i {
        let sign = if exp < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction_zeros(mantissa),
            exp.unsigned_abs()
        )
    } else {
        #[allow(clippy::cast_sign_loss)]
        let decimals = (precision_i - 1 - exp) as usize;
        trim_fraction_zeros(&format!("{value:.decimals$}")).to_owned()
    }
}

fn trim_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
