//! Filesystems radar images can be copied into.

use crate::TdmError;
use log::debug;
use reqwest::{
    blocking::{Body, Client, ClientBuilder},
    header::LOCATION,
    redirect::Policy,
    StatusCode, Url,
};
use std::{
    fs::{self, File},
    io,
    path::{Component, Path, PathBuf},
};

/// Default namenode HTTP port.
pub const WEBHDFS_PORT: u16 = 9870;

/// A parsed output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DfsPath {
    Local(PathBuf),
    WebHdfs {
        host: String,
        port: u16,
        path: PathBuf,
    },
}

impl DfsPath {
    /// Parses `hdfs://host[:port]/path`, `webhdfs://host[:port]/path`,
    /// `file:///path`, or a bare local path.
    ///
    /// The port of an `hdfs://` URI is the namenode RPC port, so it is
    /// replaced by [`WEBHDFS_PORT`]; only `webhdfs://` URIs carry the
    /// HTTP port.
    pub fn parse(s: &str) -> Result<Self, TdmError> {
        let mk_err = || TdmError::DfsPath(s.to_owned());
        let Some((scheme, _)) = s.split_once("://") else {
            return Ok(Self::Local(PathBuf::from(s)));
        };
        match scheme {
            "file" => Ok(Self::Local(PathBuf::from(&s["file://".len()..]))),
            "hdfs" | "webhdfs" => {
                let url = Url::parse(s).map_err(|_| mk_err())?;
                let host = url.host_str().filter(|h| !h.is_empty()).ok_or_else(mk_err)?;
                let path = match url.path() {
                    "" => "/",
                    p => p,
                };
                let port = match scheme {
                    "webhdfs" => url.port().unwrap_or(WEBHDFS_PORT),
                    _ => WEBHDFS_PORT,
                };
                Ok(Self::WebHdfs {
                    host: host.to_owned(),
                    port,
                    path: PathBuf::from(path),
                })
            }
            _ => Err(mk_err()),
        }
    }

    /// Replaces the HTTP port of a WebHDFS target. Local targets are
    /// returned unchanged.
    #[must_use]
    pub fn with_webhdfs_port(self, port: u16) -> Self {
        match self {
            Self::WebHdfs { host, path, .. } => Self::WebHdfs { host, port, path },
            local @ Self::Local(_) => local,
        }
    }

    /// The directory part, relative to the filesystem root.
    pub fn path(&self) -> &Path {
        match self {
            Self::Local(path) | Self::WebHdfs { path, .. } => path,
        }
    }
}

/// The two operations copying needs.
pub trait Dfs {
    /// Creates `dir` and any missing parents. Succeeds if it exists.
    fn create_directory(&self, dir: &Path) -> Result<(), TdmError>;

    /// Streams `source` into `dest`, replacing it if present, and
    /// returns the number of bytes written.
    fn write_file(&self, dest: &Path, source: File) -> Result<u64, TdmError>;
}

/// Returns a filesystem handle for `target`.
///
/// `user` only applies to WebHDFS.
pub fn open(target: &DfsPath, user: Option<&str>) -> Result<Box<dyn Dfs>, TdmError> {
    let fs: Box<dyn Dfs> = match target {
        DfsPath::Local(_) => Box::new(LocalFs),
        DfsPath::WebHdfs { host, port, .. } => {
            Box::new(WebHdfs::new(host, *port, user.map(str::to_owned))?)
        }
    };
    Ok(fs)
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl Dfs for LocalFs {
    fn create_directory(&self, dir: &Path) -> Result<(), TdmError> {
        fs::create_dir_all(dir)?;
        Ok(())
    }

    fn write_file(&self, dest: &Path, mut source: File) -> Result<u64, TdmError> {
        let mut out = File::create(dest)?;
        Ok(io::copy(&mut source, &mut out)?)
    }
}

/// HDFS through the namenode's WebHDFS REST endpoint.
pub struct WebHdfs {
    client: Client,
    base: Url,
    user: Option<String>,
}

impl WebHdfs {
    pub fn new(host: &str, port: u16, user: Option<String>) -> Result<Self, TdmError> {
        Self::with_builder(host, port, user, Client::builder())
    }
}

/// Private API
impl WebHdfs {
    fn with_builder(
        host: &str,
        port: u16,
        user: Option<String>,
        builder: ClientBuilder,
    ) -> Result<Self, TdmError> {
        let base = format!("http://{host}:{port}/webhdfs/v1");
        let base = Url::parse(&base).map_err(|e| TdmError::Url(format!("{base}: {e}")))?;
        // CREATE redirects to a datanode; followed by hand.
        let client = builder.redirect(Policy::none()).build()?;
        Ok(Self { client, base, user })
    }

    fn url(&self, path: &Path, op: &str, params: &[(&str, &str)]) -> Result<Url, TdmError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| TdmError::Url(self.base.to_string()))?;
            for component in path.components() {
                if let Component::Normal(seg) = component {
                    segments.push(&seg.to_string_lossy());
                }
            }
        }
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("op", op);
            for (k, v) in params {
                query.append_pair(k, v);
            }
            if let Some(user) = &self.user {
                query.append_pair("user.name", user);
            }
        }
        Ok(url)
    }

    fn check(op: &'static str, path: &Path, status: StatusCode) -> Result<(), TdmError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(TdmError::WebHdfs {
                op,
                path: path.display().to_string(),
                status: status.as_u16(),
            })
        }
    }
}

impl Dfs for WebHdfs {
    fn create_directory(&self, dir: &Path) -> Result<(), TdmError> {
        let url = self.url(dir, "MKDIRS", &[])?;
        debug!("PUT {url}");
        let resp = self.client.put(url).send()?;
        Self::check("MKDIRS", dir, resp.status())
    }

    fn write_file(&self, dest: &Path, source: File) -> Result<u64, TdmError> {
        let url = self.url(dest, "CREATE", &[("overwrite", "true")])?;
        debug!("PUT {url}");
        let resp = self.client.put(url).send()?;
        let status = resp.status();
        let location = match resp.headers().get(LOCATION).map(|v| v.to_str()) {
            Some(Ok(location)) if status.is_redirection() => location.to_owned(),
            _ => {
                return Err(TdmError::WebHdfs {
                    op: "CREATE",
                    path: dest.display().to_string(),
                    status: status.as_u16(),
                })
            }
        };

        let len = source.metadata()?.len();
        debug!("PUT {location} ({len} bytes)");
        let resp = self
            .client
            .put(location)
            .body(Body::sized(source, len))
            .send()?;
        Self::check("CREATE", dest, resp.status())?;
        Ok(len)
    }
}
