//! Dumps a gridded forecast into a product tree of GeoTIFFs.

use crate::{
    manifest::resource_url,
    time::{format_timestamp, from_nanos},
    GeoTransform, Grid, GridSource, Manifest, PathBuilder, RasterBuilder, Resource, Simulation,
    TdmError,
};
use log::debug;
use std::{fs, path::Path};

/// Kelvin to Celsius offset.
const ZERO_CELSIUS_K: f32 = 273.15;

/// One output raster per time step.
#[derive(Debug, Clone, Copy)]
pub struct Product {
    /// Output file stem.
    pub name: &'static str,
    pub description: &'static str,
    /// Source variables, one band each.
    pub variables: &'static [&'static str],
    /// Conversion applied to every sample.
    pub convert: Option<fn(f32) -> f32>,
}

/// The products written for every time step, in output order.
pub const PRODUCTS: [Product; 4] = [
    Product {
        name: "tcov",
        description: "Total cloud coverage [percent]",
        variables: &["TCDC_surface"],
        convert: None,
    },
    Product {
        name: "tprec",
        description: "Total precipitation [kg/m^2]",
        variables: &["APCP_surface"],
        convert: None,
    },
    Product {
        name: "temp2m",
        description: "Temperature 2m above ground [C]",
        variables: &["TMP_2maboveground"],
        convert: Some(kelvin_to_celsius),
    },
    Product {
        name: "uv10",
        description: "Wind velocity at 10m [m/s]",
        variables: &["UGRD_10maboveground", "VGRD_10maboveground"],
        convert: None,
    },
];

fn kelvin_to_celsius(k: f32) -> f32 {
    k - ZERO_CELSIUS_K
}

impl Product {
    fn grids<S: GridSource + ?Sized>(
        &self,
        source: &S,
        time_index: usize,
    ) -> Result<Vec<Grid>, TdmError> {
        self.variables
            .iter()
            .map(|var| {
                let grid = source.grid(var, time_index)?;
                Ok(match self.convert {
                    Some(f) => grid.map(f),
                    None => grid,
                })
            })
            .collect()
    }
}

/// Writes every time step of `source` under `out_dir`, then the
/// `description.json` manifest, which is returned.
///
/// Progress is printed to stdout, one line per raster. Nothing is
/// rolled back on failure: the tree is left partially populated and
/// no manifest is written.
pub fn dump_to_tree<S: GridSource + ?Sized>(
    out_dir: &Path,
    source: &S,
    sim: &Simulation,
    url_root: &str,
) -> Result<Manifest, TdmError> {
    let coords = source.coordinates()?;
    let rbuilder = RasterBuilder::new(GeoTransform::from_coords(&coords.lons, &coords.lats)?);
    let pbuilder = PathBuilder::new(out_dir, sim);
    let lonlat = sim.lonlat();

    let mut resources = Vec::with_capacity(coords.times.len() * PRODUCTS.len());
    for (time_index, &t) in coords.times.iter().enumerate() {
        let ts = format_timestamp(t);
        let dir = pbuilder.build([ts.as_str(), lonlat.as_str()]);
        fs::create_dir_all(&dir)?;
        debug!("time step {time_index} -> {dir:?}");

        for product in &PRODUCTS {
            let grids = product.grids(source, time_index)?;
            let raster = rbuilder.build(&grids)?;
            let out_path = dir.join(format!("{}.tif", product.name));
            raster.write_geotiff(&out_path, Some(from_nanos(t)))?;
            drop(raster);

            let url = resource_url(url_root, &out_path)?;
            resources.push(Resource::tiff(
                product.name,
                product.description,
                url,
                &out_path,
            )?);
            println!("created {}", out_path.display());
        }
    }

    let manifest = Manifest::new(sim.clone(), resources);
    let desc_path = pbuilder.build(["description.json"]);
    manifest.write(&desc_path)?;
    debug!("wrote {desc_path:?}");
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::{dump_to_tree, PRODUCTS};
    use crate::{Coordinates, Grid, GridSource, Manifest, Simulation, TdmError};
    use approx::assert_relative_eq;
    use std::path::Path;
    use tiff::decoder::{Decoder, DecodingResult};

    const MAY_1_2018: i64 = 1_525_132_800 * 1_000_000_000;
    const HOUR: i64 = 3_600 * 1_000_000_000;

    /// Three rows by two columns; every variable's sample is
    /// `time_index * 100 + row * 10 + col`, plus a per-variable bias.
    struct MemSource {
        coords: Coordinates,
        fail_at: Option<usize>,
    }

    impl MemSource {
        fn new(n_times: usize) -> Self {
            #[allow(clippy::cast_possible_wrap)]
            let times = (0..n_times).map(|i| MAY_1_2018 + i as i64 * HOUR).collect();
            Self {
                coords: Coordinates {
                    times,
                    lons: vec![8.0, 8.5],
                    lats: vec![39.0, 39.5, 40.0],
                },
                fail_at: None,
            }
        }
    }

    impl GridSource for MemSource {
        fn coordinates(&self) -> Result<Coordinates, TdmError> {
            Ok(self.coords.clone())
        }

        #[allow(clippy::cast_precision_loss)]
        fn grid(&self, variable: &str, time_index: usize) -> Result<Grid, TdmError> {
            if self.fail_at == Some(time_index) {
                return Err(TdmError::MissingVariable(variable.to_owned()));
            }
            let bias = match variable {
                "TMP_2maboveground" => 273.15,
                "VGRD_10maboveground" => 1000.0,
                _ => 0.0,
            };
            let data = (0..3)
                .flat_map(|row| (0..2).map(move |col| (row * 10 + col) as f32))
                .map(|v| v + (time_index * 100) as f32 + bias)
                .collect();
            Grid::new(3, 2, data)
        }
    }

    fn sim(source: &MemSource) -> Simulation {
        Simulation::new(
            Path::new("moloch_sardinia_001.nc"),
            &source.coords,
            &Default::default(),
        )
        .unwrap()
    }

    fn read_f32(path: &Path) -> Vec<f32> {
        let mut decoder = Decoder::new(std::fs::File::open(path).unwrap()).unwrap();
        match decoder.read_image().unwrap() {
            DecodingResult::F32(v) => v,
            _ => panic!("expected f32 samples"),
        }
    }

    #[test]
    fn test_tree_layout_and_manifest() {
        let source = MemSource::new(2);
        let sim = sim(&source);
        let out = tempfile::tempdir().unwrap();
        let manifest = dump_to_tree(out.path(), &source, &sim, "https://rest.tdm-project.it")
            .unwrap();

        assert_eq!(manifest.result.resources.len(), 4 * 2);
        let names: Vec<&str> = manifest
            .result
            .resources
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["tcov", "tprec", "temp2m", "uv10", "tcov", "tprec", "temp2m", "uv10"]
        );

        let root = out.path().join("tdm/odata/product/meteosim/moloch/sardinia/001");
        let step = root.join("2018-05-01_01:00:00").join(sim.lonlat());
        for product in &PRODUCTS {
            assert!(step.join(format!("{}.tif", product.name)).is_file());
        }

        let desc = root.join("description.json");
        let reread = Manifest::read(&desc).unwrap();
        assert_eq!(reread, manifest);
        assert_eq!(reread.description, sim);

        let first = &manifest.result.resources[0];
        assert!(first.url.starts_with("https://rest.tdm-project.it/"));
        assert!(first.url.ends_with("/tcov.tif"));
        assert_eq!(first.description, "Total cloud coverage [percent]");
        assert!(first.size > 0);
    }

    #[test]
    fn test_celsius_and_flip() {
        let source = MemSource::new(1);
        let sim = sim(&source);
        let out = tempfile::tempdir().unwrap();
        dump_to_tree(out.path(), &source, &sim, "https://rest.tdm-project.it").unwrap();

        let step = out
            .path()
            .join("tdm/odata/product/meteosim/moloch/sardinia/001/2018-05-01_00:00:00")
            .join(sim.lonlat());
        let temps = read_f32(&step.join("temp2m.tif"));
        // Northernmost source row (row 2) comes first.
        let expected = [20.0, 21.0, 10.0, 11.0, 0.0, 1.0];
        for (got, want) in temps.iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_rerun_overwrites() {
        let source = MemSource::new(1);
        let sim = sim(&source);
        let out = tempfile::tempdir().unwrap();
        let first = dump_to_tree(out.path(), &source, &sim, "https://rest.tdm-project.it").unwrap();
        let second =
            dump_to_tree(out.path(), &source, &sim, "https://rest.tdm-project.it").unwrap();
        assert_eq!(first.result.resources.len(), second.result.resources.len());
        for (a, b) in first.result.resources.iter().zip(&second.result.resources) {
            assert_eq!(a.url, b.url);
            assert_eq!(a.size, b.size);
        }
    }

    #[test]
    fn test_failure_leaves_no_manifest() {
        let mut source = MemSource::new(3);
        source.fail_at = Some(1);
        let sim = sim(&source);
        let out = tempfile::tempdir().unwrap();
        let res = dump_to_tree(out.path(), &source, &sim, "https://rest.tdm-project.it");
        assert!(matches!(res, Err(TdmError::MissingVariable(_))));

        let root = out.path().join("tdm/odata/product/meteosim/moloch/sardinia/001");
        assert!(root
            .join("2018-05-01_00:00:00")
            .join(sim.lonlat())
            .join("uv10.tif")
            .is_file());
        assert!(!root.join("description.json").exists());
        assert!(!root.join("2018-05-01_02:00:00").exists());
    }
}
