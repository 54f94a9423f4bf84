use clap::Parser;
use std::path::PathBuf;

/// Dump a NetCDF forecast into a tree of GeoTIFFs described by a
/// `description.json` manifest.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input dataset, named `<class>_<name>_<uid>.nc`.
    #[arg(value_name = "NETCDF_FILE")]
    pub nc_path: PathBuf,

    /// Root of the output tree [default: current directory].
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// e.g., meteosim
    #[arg(long, value_name = "PRODUCT_GROUP", default_value = tdm::DEFAULT_GROUP)]
    pub product_group: String,

    /// e.g., moloch
    #[arg(long, value_name = "PRODUCT_CLASS")]
    pub product_class: Option<String>,

    /// An unique identifier for this dataset.
    #[arg(long, value_name = "UID")]
    pub instance_uid: Option<String>,

    /// The url root of the data tree.
    #[arg(long, value_name = "URL_ROOT", default_value = "https://rest.tdm-project.it")]
    pub url_root: String,
}
