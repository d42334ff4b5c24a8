// superleitor-shell: Web shell host for Superleitor
//
// Owns one embedded render surface, forwards OS lifecycle events to it and
// loads a single local root document. Platform adapters (Android via JNI)
// implement `RenderSurface` and drive a `ShellHost` through `HostLifecycle`.

pub mod assets;
pub mod config;
pub mod events;
pub mod host;
pub mod intercept;
pub mod logger;
pub mod mime;
pub mod surface;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use assets::{AssetSource, DirAssets, EmbeddedAssets, LocalOrigin};
pub use config::ShellConfig;
pub use events::{EventQueue, SurfaceEvent};
pub use host::{BackAction, HostLifecycle, ShellHost};
pub use intercept::{
    AssetInterceptor, NavigationInterceptor, PassThroughNavigation, ResourceInterceptor,
    ResourceRequest, ResourceResponse,
};
pub use logger::HostLogger;
pub use surface::{CacheMode, MixedContentMode, RenderSurface, SurfaceSettings};
