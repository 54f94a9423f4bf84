use anyhow::Error as AnyError;
use chrono::NaiveDateTime;
use clap::Parser;
use std::{path::PathBuf, str::FromStr};
use tdm::time::TIMESTAMP_FMT;

/// Copy radar images to HDFS, converting file names to avoid illegal
/// characters.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory of `*_YYYY-MM-DD_HH:MM:SS.png` images.
    #[arg(value_name = "INPUT_DIR")]
    pub in_dir: PathBuf,

    /// Destination: a local path, `file:///path`,
    /// `hdfs://host[:port]/path` or `webhdfs://host[:port]/path`.
    #[arg(value_name = "OUTPUT_DIR")]
    pub out_dir: String,

    /// Skip images older than this "YYYY-MM-DD_HH:MM:SS".
    #[arg(long)]
    pub after: Option<Timestamp>,

    /// Skip images newer than this "YYYY-MM-DD_HH:MM:SS".
    #[arg(long)]
    pub before: Option<Timestamp>,

    /// WebHDFS user name.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Namenode HTTP port for `hdfs://` destinations [default: 9870].
    #[arg(long, value_name = "PORT")]
    pub webhdfs_port: Option<u16>,
}

#[derive(Clone, Debug, Copy)]
pub struct Timestamp(pub NaiveDateTime);

impl FromStr for Timestamp {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        Ok(Self(NaiveDateTime::parse_from_str(s, TIMESTAMP_FMT)?))
    }
}
