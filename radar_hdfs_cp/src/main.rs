mod options;

use anyhow::Result;
use clap::Parser;
use log::info;
use options::{Cli, Timestamp};
use tdm::{
    dfs::{self, DfsPath},
    radar::{copy_images, get_images, TimeWindow},
};

fn main() -> Result<()> {
    let Cli {
        in_dir,
        out_dir,
        after,
        before,
        user,
        webhdfs_port,
    } = Cli::parse();

    env_logger::init();

    let mut window = TimeWindow::default();
    if let Some(Timestamp(after)) = after {
        window.after = after;
    }
    if let Some(Timestamp(before)) = before {
        window.before = before;
    }

    let mut target = DfsPath::parse(&out_dir)?;
    if let Some(port) = webhdfs_port {
        target = target.with_webhdfs_port(port);
    }
    let fs = dfs::open(&target, user.as_deref())?;
    let images = get_images(&in_dir, &window)?;
    info!("{} images in {in_dir:?}", images.len());
    let bytes = copy_images(&images, fs.as_ref(), target.path())?;
    info!("{bytes} bytes copied");
    Ok(())
}
