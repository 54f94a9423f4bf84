//! Layout of the product tree.

use crate::Simulation;
use std::path::{Path, PathBuf};

/// Computes output paths for one simulation.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    product_root: PathBuf,
}

impl PathBuilder {
    /// Product root is
    /// `<root>/tdm/odata/product/<group>/<class>/<name>/<uid>`.
    pub fn new<P: AsRef<Path>>(root: P, sim: &Simulation) -> Self {
        let product_root = [
            root.as_ref(),
            Path::new("tdm/odata/product"),
            Path::new(&sim.group),
            Path::new(&sim.class),
            Path::new(&sim.name),
            Path::new(&sim.uid),
        ]
        .iter()
        .collect();
        Self { product_root }
    }

    pub fn product_root(&self) -> &Path {
        &self.product_root
    }

    /// Returns the product root joined with `segments`.
    ///
    /// Directories are not created.
    pub fn build<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let mut path = self.product_root.clone();
        path.extend(segments);
        path
    }
}
