//! The `description.json` document listing a product's resources.

use crate::{Simulation, TdmError};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use std::{
    fs::{self, Metadata},
    path::Path,
    time::SystemTime,
};

/// One produced file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub description: String,
    pub url: String,
    pub format: String,
    pub mimetype: String,
    /// Seconds since the epoch.
    pub created: f64,
    /// Seconds since the epoch.
    pub last_modified: f64,
    /// Bytes.
    pub size: u64,
}

impl Resource {
    /// Describes the TIFF just written to `path`, stat'ing it for
    /// times and size.
    pub fn tiff(name: &str, description: &str, url: String, path: &Path) -> Result<Self, TdmError> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            name: name.to_owned(),
            description: description.to_owned(),
            url,
            format: "TIFF".to_owned(),
            mimetype: "image/tiff".to_owned(),
            created: ctime(&meta),
            last_modified: epoch_secs(meta.modified().ok()),
            size: meta.len(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub resources: Vec<Resource>,
}

/// Descriptor plus resources for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub description: Simulation,
    pub result: Resources,
}

impl Manifest {
    pub fn new(description: Simulation, resources: Vec<Resource>) -> Self {
        Self {
            description,
            result: Resources { resources },
        }
    }

    /// Returns `self` as JSON indented by four spaces.
    pub fn to_json(&self) -> Result<Vec<u8>, TdmError> {
        let mut out = Vec::new();
        let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        Ok(out)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), TdmError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, TdmError> {
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }
}

/// Resolves `path` against `url_root` the way a browser resolves a
/// relative link: absolute paths replace the root's path, relative
/// ones are appended to its last directory.
pub fn resource_url(url_root: &str, path: &Path) -> Result<String, TdmError> {
    let root = Url::parse(url_root).map_err(|e| TdmError::Url(format!("{url_root}: {e}")))?;
    let reference = path.to_string_lossy();
    let url = root
        .join(&reference)
        .map_err(|e| TdmError::Url(format!("{reference}: {e}")))?;
    Ok(url.into())
}

#[cfg(unix)]
#[allow(clippy::cast_precision_loss)]
fn ctime(meta: &Metadata) -> f64 {
    use std::os::unix::fs::MetadataExt;
    meta.ctime() as f64 + meta.ctime_nsec() as f64 * 1e-9
}

#[cfg(not(unix))]
fn ctime(meta: &Metadata) -> f64 {
    epoch_secs(meta.created().ok())
}

fn epoch_secs(time: Option<SystemTime>) -> f64 {
    time.and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map_or(0.0, |d| d.as_secs_f64())
}
