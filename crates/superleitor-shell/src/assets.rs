// Local asset origin and the sources that back it.
//
// The packaged web bundle is reachable under a virtual origin
// (`file:///android_asset/` by default). Requests under that origin map to
// bundle-relative paths, which an `AssetSource` resolves to bytes.

use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::marker::PhantomData;
use std::path::PathBuf;
use url::Url;

pub const ANDROID_ASSET_ORIGIN: &str = "file:///android_asset/";

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalOrigin {
    base: Url,
}

impl LocalOrigin {
    pub fn android_asset() -> Self {
        Self {
            base: Url::parse(ANDROID_ASSET_ORIGIN).expect("static origin URL is valid"),
        }
    }

    /// Absolute URI of a bundle-relative path.
    pub fn url_for(&self, path: &str) -> Result<String> {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("Cannot resolve {} against {}", path, self.base))?;
        Ok(url.into())
    }

    /// Bundle-relative path of `uri`, if it lies under this origin.
    ///
    /// Query and fragment are dropped and the path is percent-decoded. Paths
    /// that would escape the bundle are rejected.
    pub fn asset_path(&self, uri: &str) -> Option<String> {
        let url = Url::parse(uri).ok()?;
        if url.scheme() != self.base.scheme()
            || url.host_str() != self.base.host_str()
            || url.port_or_known_default() != self.base.port_or_known_default()
        {
            return None;
        }

        let rest = url.path().strip_prefix(self.base.path())?;
        let decoded = percent_decode_str(rest).decode_utf8().ok()?;
        if decoded.is_empty()
            || decoded.starts_with('/')
            || decoded.split('/').any(|segment| segment == "..")
        {
            return None;
        }
        Some(decoded.into_owned())
    }
}

impl Default for LocalOrigin {
    fn default() -> Self {
        Self::android_asset()
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Read access to the packaged web bundle. Shared with off-thread interceptors.
pub trait AssetSource: Send + Sync {
    /// Bytes of a bundle-relative path, `None` if the bundle has no such file.
    fn read(&self, path: &str) -> Result<Option<Cow<'static, [u8]>>>;

    fn contains(&self, path: &str) -> bool {
        matches!(self.read(path), Ok(Some(_)))
    }
}

/// Bundle compiled into the binary with `rust-embed`.
pub struct EmbeddedAssets<E> {
    _bundle: PhantomData<fn() -> E>,
}

impl<E: RustEmbed> EmbeddedAssets<E> {
    pub fn new() -> Self {
        Self {
            _bundle: PhantomData,
        }
    }
}

impl<E: RustEmbed> Default for EmbeddedAssets<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RustEmbed> AssetSource for EmbeddedAssets<E> {
    fn read(&self, path: &str) -> Result<Option<Cow<'static, [u8]>>> {
        Ok(E::get(path).map(|file| file.data))
    }
}

/// Bundle read from a directory on disk (development builds and tests).
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirAssets {
    fn read(&self, path: &str) -> Result<Option<Cow<'static, [u8]>>> {
        let full = self.root.join(path);
        match std::fs::read(&full) {
            Ok(bytes) => Ok(Some(Cow::Owned(bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) if full.is_dir() => {
                log::debug!("Asset path is a directory: {} ({})", full.display(), e);
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", full.display())),
        }
    }
}
