//! Timestamp-named radar images.

use crate::{
    dfs::Dfs,
    time::{TIMESTAMP_FMT, TIMESTAMP_LEN},
    TdmError,
};
use chrono::NaiveDateTime;
use log::{debug, info};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

/// Canonical output name format, without extension.
const OUT_NAME_FMT: &str = "%Y%m%d%H%M%S";

/// A radar image whose file stem ends in a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub timestamp: NaiveDateTime,
    pub path: PathBuf,
}

impl Image {
    /// Parses the trailing timestamp of `path`'s stem.
    ///
    /// Returns `None` if the stem is too short or its suffix is not a
    /// `YYYY-MM-DD_HH:MM:SS` timestamp.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        let skip = stem.chars().count().checked_sub(TIMESTAMP_LEN)?;
        let (idx, _) = stem.char_indices().nth(skip)?;
        let timestamp = NaiveDateTime::parse_from_str(&stem[idx..], TIMESTAMP_FMT).ok()?;
        Some(Self { timestamp, path })
    }

    /// Returns `YYYYMMDDHHMMSS.png`.
    pub fn out_name(&self) -> String {
        format!("{}.png", self.timestamp.format(OUT_NAME_FMT))
    }
}

/// Inclusive bounds on image timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub after: NaiveDateTime,
    pub before: NaiveDateTime,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            after: NaiveDateTime::MIN,
            before: NaiveDateTime::MAX,
        }
    }
}

impl TimeWindow {
    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        self.after <= *ts && *ts <= self.before
    }
}

/// Lists the images directly under `root` whose timestamp falls in
/// `window`, oldest first.
///
/// Subdirectories and files without a timestamp suffix are skipped.
/// Images sharing a timestamp keep directory listing order.
pub fn get_images<P: AsRef<Path>>(root: P, window: &TimeWindow) -> Result<Vec<Image>, TdmError> {
    let mut images = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        match Image::from_path(entry.path()) {
            Some(image) if window.contains(&image.timestamp) => images.push(image),
            Some(image) => debug!("{:?} outside time window", image.path),
            None => debug!("skipping {:?}", entry.path()),
        }
    }
    images.sort_by_key(|image| image.timestamp);
    Ok(images)
}

/// Copies `images`, in order, into `out_dir` on `fs` under their
/// canonical names. Returns the number of bytes copied.
///
/// `out_dir` is created first, even when there is nothing to copy.
pub fn copy_images(images: &[Image], fs: &dyn Dfs, out_dir: &Path) -> Result<u64, TdmError> {
    fs.create_directory(out_dir)?;
    let mut total = 0;
    for image in images {
        let dest = out_dir.join(image.out_name());
        let source = File::open(&image.path)?;
        let n = fs.write_file(&dest, source)?;
        debug!("{:?} -> {dest:?} ({n} bytes)", image.path);
        total += n;
    }
    info!("copied {} images to {out_dir:?}", images.len());
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::{copy_images, get_images, Image, TimeWindow, TIMESTAMP_FMT};
    use crate::dfs::LocalFs;
    use chrono::NaiveDateTime;
    use std::{fs, path::PathBuf};

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FMT).unwrap()
    }

    fn touch(dir: &std::path::Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_from_path() {
        let image = Image::from_path(PathBuf::from("/r/cag01est2400_2018-05-01_06:30:00.png")).unwrap();
        assert_eq!(image.timestamp, ts("2018-05-01_06:30:00"));
        assert_eq!(image.out_name(), "20180501063000.png");

        assert!(Image::from_path(PathBuf::from("2018-05-01_06:30:00.png")).is_some());
        assert!(Image::from_path(PathBuf::from("readme.txt")).is_none());
        assert!(Image::from_path(PathBuf::from("cag_2018-05-01_6:30:00.png")).is_none());
        assert!(Image::from_path(PathBuf::from("cag_2018-13-01_06:30:00.png")).is_none());
    }

    #[test]
    fn test_get_images_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "rad_2018-05-01_12:00:00.png", "c");
        touch(dir.path(), "rad_2018-05-01_06:00:00.png", "a");
        touch(dir.path(), "rad_2018-05-01_09:00:00.png", "b");
        touch(dir.path(), "notes.txt", "x");
        fs::create_dir(dir.path().join("sub_2018-05-01_07:00:00")).unwrap();

        let all = get_images(dir.path(), &TimeWindow::default()).unwrap();
        let stamps: Vec<_> = all.iter().map(Image::out_name).collect();
        assert_eq!(
            stamps,
            ["20180501060000.png", "20180501090000.png", "20180501120000.png"]
        );

        let window = TimeWindow {
            after: ts("2018-05-01_06:00:00"),
            before: ts("2018-05-01_09:00:00"),
        };
        let some = get_images(dir.path(), &window).unwrap();
        assert_eq!(some.len(), 2);
        assert_eq!(some[0].timestamp, window.after);
        assert_eq!(some[1].timestamp, window.before);
    }

    #[test]
    fn test_after_bound() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "cag_2020-01-02_00:00:00.img", "b");
        touch(dir.path(), "cag_2020-01-01_00:00:00.img", "a");
        touch(dir.path(), "garbage.img", "x");

        let all = get_images(dir.path(), &TimeWindow::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].timestamp < all[1].timestamp);

        let window = TimeWindow {
            after: ts("2020-01-02_00:00:00"),
            ..Default::default()
        };
        let later = get_images(dir.path(), &window).unwrap();
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].out_name(), "20200102000000.png");
    }

    #[test]
    fn test_ties_keep_both() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a_2018-05-01_06:00:00.png", "a");
        touch(dir.path(), "b_2018-05-01_06:00:00.png", "b");
        let images = get_images(dir.path(), &TimeWindow::default()).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].timestamp, images[1].timestamp);
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(get_images(dir.path().join("nope"), &TimeWindow::default()).is_err());
    }

    #[test]
    fn test_copy_images() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        touch(src.path(), "rad_2018-05-01_09:00:00.png", "later");
        touch(src.path(), "rad_2018-05-01_06:00:00.png", "early");

        let images = get_images(src.path(), &TimeWindow::default()).unwrap();
        let out_dir = dst.path().join("radar/cag");
        let copied = copy_images(&images, &LocalFs, &out_dir).unwrap();
        assert_eq!(copied, 10);
        assert_eq!(
            fs::read_to_string(out_dir.join("20180501060000.png")).unwrap(),
            "early"
        );
        assert_eq!(
            fs::read_to_string(out_dir.join("20180501090000.png")).unwrap(),
            "later"
        );

        // Second run overwrites in place.
        assert_eq!(copy_images(&images, &LocalFs, &out_dir).unwrap(), 10);
        assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 2);
    }

    #[test]
    fn test_copy_nothing_creates_dir() {
        let dst = tempfile::tempdir().unwrap();
        let out_dir = dst.path().join("empty");
        assert_eq!(copy_images(&[], &LocalFs, &out_dir).unwrap(), 0);
        assert!(out_dir.is_dir());
    }
}
