mod options;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use options::Cli;
use std::env;
use tdm::{export::dump_to_tree, GridSource, NcSource, Overrides, Simulation};

fn main() -> Result<()> {
    let Cli {
        nc_path,
        out_dir,
        product_group,
        product_class,
        instance_uid,
        url_root,
    } = Cli::parse();

    env_logger::init();

    let out_dir = match out_dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };

    let source = NcSource::open(&nc_path).with_context(|| format!("opening {nc_path:?}"))?;
    let coords = source.coordinates()?;
    let overrides = Overrides {
        group: Some(product_group),
        class: product_class,
        uid: instance_uid,
    };
    let sim = Simulation::new(&nc_path, &coords, &overrides)?;
    info!(
        "{}/{}/{}/{}: {} time steps",
        sim.group,
        sim.class,
        sim.name,
        sim.uid,
        coords.times.len()
    );

    let manifest = dump_to_tree(&out_dir, &source, &sim, &url_root)?;
    info!("wrote {} resources", manifest.result.resources.len());
    Ok(())
}
