// Render surface capability: the embeddable browser component the host drives.
//
// Any platform web view that can be configured, load a URI, walk its own
// history and follow the activity lifecycle can back a `ShellHost`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ShellConfig;
use crate::intercept::{NavigationInterceptor, ResourceInterceptor};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Policy for loading insecure sub-resources into a document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum MixedContentMode {
    #[default]
    NeverAllow,
    AlwaysAllow,
    Compatibility,
}

impl MixedContentMode {
    /// `WebSettings.MIXED_CONTENT_*` constant.
    pub fn android_value(self) -> i32 {
        match self {
            MixedContentMode::AlwaysAllow => 0,
            MixedContentMode::NeverAllow => 1,
            MixedContentMode::Compatibility => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CacheMode {
    #[default]
    Default,
    /// Always go back to the source instead of serving from cache.
    Revalidate,
}

impl CacheMode {
    /// `WebSettings.LOAD_*` constant.
    pub fn android_value(self) -> i32 {
        match self {
            CacheMode::Default => -1,
            CacheMode::Revalidate => 2,
        }
    }
}

/// Capability flags applied once, right after the surface is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSettings {
    pub javascript_enabled: bool,
    pub dom_storage_enabled: bool,
    pub file_access_enabled: bool,
    pub content_access_enabled: bool,
    /// Lets a `file://` document load other `file://` resources (relative
    /// scripts and styles of the bundle).
    pub file_access_from_file_urls: bool,
    /// Lets a `file://` document reach any origin. Weakens local-origin
    /// isolation; off unless the config opts in.
    pub universal_access_from_file_urls: bool,
    pub mixed_content: MixedContentMode,
    pub cache_mode: CacheMode,
    /// ARGB.
    pub background_color: Option<u32>,
}

impl SurfaceSettings {
    pub fn from_config(config: &ShellConfig) -> Result<Self> {
        let android = &config.android;
        let mixed_content = if android.allow_mixed_content {
            MixedContentMode::AlwaysAllow
        } else {
            MixedContentMode::NeverAllow
        };

        Ok(Self {
            javascript_enabled: true,
            dom_storage_enabled: true,
            file_access_enabled: true,
            content_access_enabled: true,
            file_access_from_file_urls: true,
            universal_access_from_file_urls: android.allow_universal_access_from_file_urls,
            mixed_content,
            cache_mode: android.cache_mode,
            background_color: config.background_color()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One embedded web view. All methods are called from the UI thread.
pub trait RenderSurface {
    fn configure(&mut self, settings: &SurfaceSettings) -> Result<()>;

    /// Callback deciding whether a full-page navigation is taken over by the host.
    fn set_navigation_interceptor(
        &mut self,
        interceptor: Arc<dyn NavigationInterceptor>,
    ) -> Result<()>;

    /// Callback that may answer sub-resource requests directly. May be invoked
    /// off the UI thread by the platform.
    fn set_resource_interceptor(&mut self, interceptor: Arc<dyn ResourceInterceptor>)
    -> Result<()>;

    fn load(&mut self, uri: &str) -> Result<()>;

    fn can_go_back(&self) -> Result<bool>;
    fn go_back(&mut self) -> Result<()>;

    fn on_start(&mut self) -> Result<()>;
    fn on_resume(&mut self) -> Result<()>;
    fn on_pause(&mut self) -> Result<()>;

    /// Release platform resources. The surface is not used afterwards.
    fn destroy(&mut self) -> Result<()>;

    /// Development-only remote inspection channel.
    fn enable_debug_inspection(&mut self, enabled: bool) -> Result<()>;
}
