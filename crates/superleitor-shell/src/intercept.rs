// Request interception for the render surface.
//
// Full-page navigations are never taken over: the surface performs them
// itself. Sub-resource requests under the local-asset origin may be answered
// straight from the packaged bundle; anything declined falls through to the
// surface's default loader.

use std::borrow::Cow;
use std::sync::Arc;

use crate::assets::{AssetSource, LocalOrigin};
use crate::mime;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub uri: String,
    /// True for a top-level document navigation.
    pub is_main_frame: bool,
    pub method: String,
}

impl ResourceRequest {
    pub fn get(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            is_main_frame: false,
            method: "GET".to_string(),
        }
    }

    pub fn navigation(uri: impl Into<String>) -> Self {
        Self {
            is_main_frame: true,
            ..Self::get(uri)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceResponse {
    pub mime_type: &'static str,
    /// Text encoding, set for textual MIME types.
    pub encoding: Option<&'static str>,
    pub data: Cow<'static, [u8]>,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

pub trait NavigationInterceptor: Send + Sync {
    /// Return true to stop the surface from navigating to `uri` itself.
    fn should_override(&self, uri: &str) -> bool;
}

pub trait ResourceInterceptor: Send + Sync {
    /// Answer a request directly, or `None` to use the default loader.
    fn intercept(&self, request: &ResourceRequest) -> Option<ResourceResponse>;
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// Lets the surface perform every navigation on its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughNavigation;

impl NavigationInterceptor for PassThroughNavigation {
    fn should_override(&self, uri: &str) -> bool {
        tracing::debug!("Navigation to {}", uri);
        false
    }
}

/// Serves local sub-resources from an `AssetSource`.
pub struct AssetInterceptor {
    origin: LocalOrigin,
    assets: Arc<dyn AssetSource>,
}

impl AssetInterceptor {
    pub fn new(origin: LocalOrigin, assets: Arc<dyn AssetSource>) -> Self {
        Self { origin, assets }
    }
}

impl ResourceInterceptor for AssetInterceptor {
    fn intercept(&self, request: &ResourceRequest) -> Option<ResourceResponse> {
        if request.is_main_frame || !request.method.eq_ignore_ascii_case("GET") {
            return None;
        }
        let path = self.origin.asset_path(&request.uri)?;

        let data = match self.assets.read(&path) {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!("Asset not in bundle, deferring: {}", path);
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read asset {}: {:?}", path, e);
                return None;
            }
        };

        let mime_type = mime::mime_for_path(&path);
        tracing::debug!("Serving {} ({}, {} bytes)", path, mime_type, data.len());
        Some(ResourceResponse {
            mime_type,
            encoding: mime::is_textual(mime_type).then_some("UTF-8"),
            data,
        })
    }
}
