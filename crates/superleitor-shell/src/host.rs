/// Shell host: bridges OS lifecycle events to a single render surface
///
/// The platform adapter owns one `ShellHost` on the UI thread and calls the
/// `HostLifecycle` entry points in the order the OS delivers them.
/// Initialization failures are fatal and returned to the adapter; failures
/// while forwarding later transitions are logged and swallowed.
use anyhow::{Context, Result, anyhow, bail};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use crate::assets::{AssetSource, LocalOrigin};
use crate::config::ShellConfig;
use crate::events::{EventQueue, SurfaceEvent};
use crate::intercept::{AssetInterceptor, PassThroughNavigation};
use crate::logger::HostLogger;
use crate::surface::{RenderSurface, SurfaceSettings};

/// Outcome of a back gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    /// The surface stepped back in its own history
    Handled,
    /// Let the OS run its default back behavior (usually closing the host)
    DeferToSystem,
}

/// Entry points the hosting OS drives
pub trait HostLifecycle {
    /// Build the surface and load the root document. An error here is fatal.
    fn on_create(&mut self, saved_state: Option<&[u8]>) -> Result<()>;
    fn on_start(&mut self);
    fn on_resume(&mut self);
    fn on_pause(&mut self);
    /// Forward destruction and release the surface
    fn on_destroy(&mut self);
    fn on_back_gesture(&mut self) -> BackAction;
}

type SurfaceFactory<S> = Box<dyn FnMut() -> Result<S>>;

pub struct ShellHost<S: RenderSurface> {
    config: ShellConfig,
    origin: LocalOrigin,
    assets: Arc<dyn AssetSource>,
    factory: SurfaceFactory<S>,
    logger: HostLogger,
    /// At most one live surface per host
    surface: Option<S>,
    root_uri: Option<String>,
    current_uri: Option<String>,
    loading: bool,
    saved_state: Option<Vec<u8>>,
}

impl<S: RenderSurface> ShellHost<S> {
    pub fn new(
        config: ShellConfig,
        assets: Arc<dyn AssetSource>,
        factory: impl FnMut() -> Result<S> + 'static,
    ) -> Self {
        let logger = HostLogger::global(config.log_tag.clone());
        Self {
            config,
            origin: LocalOrigin::default(),
            assets,
            factory: Box::new(factory),
            logger,
            surface: None,
            root_uri: None,
            current_uri: None,
            loading: false,
            saved_state: None,
        }
    }

    pub fn with_logger(mut self, logger: HostLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn logger(&self) -> &HostLogger {
        &self.logger
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// URI of the root document, once loaded
    pub fn root_uri(&self) -> Option<&str> {
        self.root_uri.as_deref()
    }

    /// URI of the page the surface last reported
    pub fn current_uri(&self) -> Option<&str> {
        self.current_uri.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The opaque state blob handed to `on_create`, unmodified
    pub fn saved_state(&self) -> Option<&[u8]> {
        self.saved_state.as_deref()
    }

    /// Resolve the root document against the local origin.
    ///
    /// Exactly one candidate is considered; a bundle without it is an error.
    pub fn resolve_root_document(&self) -> Result<String> {
        let path = self.config.root_document_path();
        if !self.assets.contains(path) {
            bail!(
                "Root document '{}' is missing from the web bundle ({})",
                path,
                self.config.web_dir
            );
        }
        self.origin.url_for(path)
    }

    fn initialize(&mut self) -> Result<S> {
        let mut surface = (self.factory)().context("Failed to construct render surface")?;
        self.logger.debug(format_args!("Render surface constructed"));

        if let Err(e) = self.prepare(&mut surface) {
            if let Err(destroy_err) = surface.destroy() {
                self.logger.warn(format_args!(
                    "Failed to release surface after init error: {:?}",
                    destroy_err
                ));
            }
            return Err(e);
        }
        Ok(surface)
    }

    fn prepare(&mut self, surface: &mut S) -> Result<()> {
        let settings =
            SurfaceSettings::from_config(&self.config).context("Invalid surface settings")?;
        surface
            .configure(&settings)
            .context("Failed to configure render surface")?;
        self.logger.debug(format_args!("Render surface configured: {:?}", settings));

        surface
            .set_navigation_interceptor(Arc::new(PassThroughNavigation))
            .context("Failed to register navigation interceptor")?;

        if self.config.android.intercept_local_assets {
            let interceptor = AssetInterceptor::new(self.origin.clone(), self.assets.clone());
            surface
                .set_resource_interceptor(Arc::new(interceptor))
                .context("Failed to register resource interceptor")?;
        }

        let root_uri = self.resolve_root_document()?;

        if self.config.android.web_contents_debugging_enabled {
            surface
                .enable_debug_inspection(true)
                .context("Failed to enable debug inspection")?;
            self.logger.info(format_args!("Debug inspection enabled"));
        }

        self.logger.info(format_args!("Loading URL: {}", root_uri));
        surface
            .load(&root_uri)
            .with_context(|| format!("Failed to load {}", root_uri))?;
        self.root_uri = Some(root_uri);
        Ok(())
    }

    /// Run `f` against the live surface behind a failure boundary
    fn forward(&mut self, transition: &str, f: impl FnOnce(&mut S) -> Result<()>) {
        let Some(surface) = self.surface.as_mut() else {
            self.logger.warn(format_args!(
                "Ignoring {}: no live render surface",
                transition
            ));
            return;
        };

        if guarded(&self.logger, transition, || f(surface)).is_some() {
            self.logger.debug(format_args!("Forwarded {}", transition));
        }
    }

    /// Apply a notification reported by the surface
    pub fn handle_surface_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::PageStarted { url } => {
                self.logger.info(format_args!("Page started: {}", url));
                self.current_uri = Some(url);
                self.loading = true;
            }
            SurfaceEvent::PageFinished { url } => {
                self.logger.info(format_args!("Page finished: {}", url));
                if !self.loading {
                    self.logger.debug(format_args!(
                        "Page finished without a matching start: {}",
                        url
                    ));
                }
                self.current_uri = Some(url);
                self.loading = false;
            }
            SurfaceEvent::LoadError {
                code,
                description,
                url,
            } => {
                self.logger.error(format_args!(
                    "Load error: {} ({}) for {}",
                    description, code, url
                ));
            }
        }
    }

    /// Apply every queued surface notification, oldest first
    pub fn drain_events(&mut self, queue: &EventQueue) {
        for event in queue.drain() {
            self.handle_surface_event(event);
        }
    }
}

impl<S: RenderSurface> HostLifecycle for ShellHost<S> {
    fn on_create(&mut self, saved_state: Option<&[u8]>) -> Result<()> {
        if self.surface.is_some() {
            self.logger
                .warn(format_args!("Shell host already created; ignoring on_create"));
            return Ok(());
        }

        let start = Instant::now();
        self.logger.info(format_args!("=== Starting {} ===", self.config.app_name));

        self.saved_state = saved_state.map(<[u8]>::to_vec);
        if let Some(state) = &self.saved_state {
            self.logger
                .debug(format_args!("Saved state present ({} bytes)", state.len()));
        }

        let result = catch_unwind(AssertUnwindSafe(|| self.initialize()))
            .unwrap_or_else(|payload| {
                Err(anyhow!(
                    "Panic during initialization: {}",
                    panic_message(&*payload)
                ))
            });

        match result {
            Ok(surface) => {
                self.surface = Some(surface);
                self.logger.info(format_args!(
                    "=== {} started in {:?} ===",
                    self.config.app_name,
                    start.elapsed()
                ));
                Ok(())
            }
            Err(e) => {
                self.logger
                    .error(format_args!("Shell initialization failed: {:?}", e));
                Err(e)
            }
        }
    }

    fn on_start(&mut self) {
        self.forward("start", |surface| surface.on_start());
    }

    fn on_resume(&mut self) {
        self.forward("resume", |surface| surface.on_resume());
    }

    fn on_pause(&mut self) {
        self.forward("pause", |surface| surface.on_pause());
    }

    fn on_destroy(&mut self) {
        self.forward("destroy", |surface| surface.destroy());
        if self.surface.take().is_some() {
            self.logger.info(format_args!("Render surface released"));
        }
        self.loading = false;
    }

    fn on_back_gesture(&mut self) -> BackAction {
        let Some(surface) = self.surface.as_mut() else {
            return BackAction::DeferToSystem;
        };

        match guarded(&self.logger, "back gesture", || surface.can_go_back()) {
            Some(true) => {}
            Some(false) | None => return BackAction::DeferToSystem,
        }

        match guarded(&self.logger, "go back", || surface.go_back()) {
            Some(()) => {
                self.logger.debug(format_args!("Navigated back in page history"));
                BackAction::Handled
            }
            None => BackAction::DeferToSystem,
        }
    }
}

/// Run `f`, logging and swallowing both errors and panics
fn guarded<T>(logger: &HostLogger, what: &str, f: impl FnOnce() -> Result<T>) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            logger.error(format_args!("Failed to forward {}: {:?}", what, e));
            None
        }
        Err(payload) => {
            logger.error(format_args!(
                "Panic while forwarding {}: {}",
                what,
                panic_message(&*payload)
            ));
            None
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DirAssets;
    use crate::testing::{CapturingLog, Fault, MockSurface, SurfaceCall, SurfaceOp};
    use log::Level;

    fn setup(config: ShellConfig) -> (tempfile::TempDir, MockSurface, ShellHost<MockSurface>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        let surface = MockSurface::new();
        let handle = surface.clone();
        let host = ShellHost::new(config, Arc::new(DirAssets::new(dir.path())), move || {
            Ok(handle.clone())
        })
        .with_logger(HostLogger::new(Arc::new(CapturingLog::default()), "test"));
        (dir, surface, host)
    }

    #[test]
    fn create_runs_init_steps_in_order() {
        let (_dir, surface, mut host) = setup(ShellConfig::default());
        host.on_create(None).unwrap();

        assert_eq!(
            surface.calls(),
            vec![
                SurfaceCall::Configure,
                SurfaceCall::SetNavigationInterceptor,
                SurfaceCall::SetResourceInterceptor,
                SurfaceCall::Load("file:///android_asset/index.html".into()),
            ]
        );
        assert_eq!(host.root_uri(), Some("file:///android_asset/index.html"));
    }

    #[test]
    fn debug_inspection_only_when_configured() {
        let config =
            ShellConfig::from_json(r#"{"android":{"webContentsDebuggingEnabled":true}}"#).unwrap();
        let (_dir, surface, mut host) = setup(config);
        host.on_create(None).unwrap();
        assert_eq!(surface.count(SurfaceOp::EnableDebugInspection), 1);
        assert!(surface.calls().contains(&SurfaceCall::EnableDebugInspection(true)));
    }

    #[test]
    fn resource_interception_can_be_disabled() {
        let config =
            ShellConfig::from_json(r#"{"android":{"interceptLocalAssets":false}}"#).unwrap();
        let (_dir, surface, mut host) = setup(config);
        host.on_create(None).unwrap();
        assert_eq!(surface.count(SurfaceOp::SetResourceInterceptor), 0);
        assert!(surface.resource_interceptor().is_none());
    }

    #[test]
    fn second_create_is_ignored() {
        let (_dir, surface, mut host) = setup(ShellConfig::default());
        host.on_create(None).unwrap();
        host.on_create(None).unwrap();
        assert_eq!(surface.count(SurfaceOp::Configure), 1);
        assert_eq!(surface.count(SurfaceOp::Load), 1);
    }

    #[test]
    fn saved_state_is_kept_unmodified() {
        let (_dir, _surface, mut host) = setup(ShellConfig::default());
        host.on_create(Some(&[1, 2, 3])).unwrap();
        assert_eq!(host.saved_state(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn missing_root_document_is_fatal() {
        let config = ShellConfig::from_json(r#"{"rootDocument":"www/index.html"}"#).unwrap();
        let (_dir, surface, mut host) = setup(config);
        let err = host.on_create(None).unwrap_err();
        assert!(format!("{:#}", err).contains("www/index.html"));
        assert_eq!(surface.count(SurfaceOp::Load), 0);
        assert_eq!(surface.count(SurfaceOp::Destroy), 1);
        assert!(host.surface().is_none());
    }

    #[test]
    fn surface_events_track_current_page() {
        let (_dir, _surface, mut host) = setup(ShellConfig::default());
        host.on_create(None).unwrap();

        let queue = EventQueue::new();
        queue
            .send(SurfaceEvent::PageStarted {
                url: "file:///android_asset/index.html".into(),
            })
            .unwrap();
        host.drain_events(&queue);
        assert!(host.is_loading());

        queue
            .send(SurfaceEvent::PageFinished {
                url: "file:///android_asset/index.html".into(),
            })
            .unwrap();
        queue
            .send(SurfaceEvent::LoadError {
                code: -1,
                description: "net::ERR_FAILED".into(),
                url: "file:///android_asset/missing.js".into(),
            })
            .unwrap();
        host.drain_events(&queue);
        assert!(!host.is_loading());
        assert_eq!(host.current_uri(), Some("file:///android_asset/index.html"));
    }

    #[test]
    fn load_errors_are_logged() {
        let sink = Arc::new(CapturingLog::default());
        let (_dir, _surface, host) = setup(ShellConfig::default());
        let mut host = host.with_logger(HostLogger::new(sink.clone(), "test"));
        host.handle_surface_event(SurfaceEvent::LoadError {
            code: -6,
            description: "net::ERR_CONNECTION_REFUSED".into(),
            url: "https://example.com/".into(),
        });
        assert!(sink.contains(Level::Error, "net::ERR_CONNECTION_REFUSED"));
    }

    #[test]
    fn back_gesture_before_create_defers() {
        let (_dir, surface, mut host) = setup(ShellConfig::default());
        assert_eq!(host.on_back_gesture(), BackAction::DeferToSystem);
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn failing_history_query_defers_to_system() {
        let (_dir, surface, mut host) = setup(ShellConfig::default());
        host.on_create(None).unwrap();
        surface.navigate("file:///android_asset/index.html#/settings");
        surface.fail_on(SurfaceOp::CanGoBack, Fault::Error);
        assert_eq!(host.on_back_gesture(), BackAction::DeferToSystem);
        assert_eq!(surface.count(SurfaceOp::GoBack), 0);
    }

    #[test]
    fn panic_messages() {
        let payload: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(&*payload), "static str");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*payload), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(&*payload), "Unknown panic");
    }
}
