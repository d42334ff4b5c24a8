// End-to-end lifecycle behavior of ShellHost against a mock surface and an
// embedded fixture bundle.

use anyhow::anyhow;
use log::Level;
use rust_embed::RustEmbed;
use std::sync::Arc;

use superleitor_shell::testing::{CapturingLog, Fault, MockSurface, SurfaceCall, SurfaceOp};
use superleitor_shell::{
    BackAction, EmbeddedAssets, HostLifecycle, HostLogger, ResourceRequest, ShellConfig,
    ShellHost,
};

#[derive(RustEmbed)]
#[folder = "tests/fixtures/www/"]
struct Fixtures;

const ROOT_URI: &str = "file:///android_asset/index.html";

struct Harness {
    surface: MockSurface,
    log: Arc<CapturingLog>,
    host: ShellHost<MockSurface>,
}

fn harness() -> Harness {
    harness_with(ShellConfig::default())
}

fn harness_with(config: ShellConfig) -> Harness {
    let surface = MockSurface::new();
    let log = Arc::new(CapturingLog::default());
    let handle = surface.clone();
    let host = ShellHost::new(
        config,
        Arc::new(EmbeddedAssets::<Fixtures>::new()),
        move || Ok(handle.clone()),
    )
    .with_logger(HostLogger::new(log.clone(), "SuperleitorApp"));
    Harness { surface, log, host }
}

fn lifecycle_calls(surface: &MockSurface) -> Vec<SurfaceCall> {
    surface
        .calls()
        .into_iter()
        .filter(|c| {
            matches!(
                c,
                SurfaceCall::Start | SurfaceCall::Resume | SurfaceCall::Pause | SurfaceCall::Destroy
            )
        })
        .collect()
}

#[test]
fn full_lifecycle_forwards_each_transition_once_in_order() {
    let mut h = harness();
    h.host.on_create(None).unwrap();
    h.host.on_start();
    h.host.on_resume();
    h.host.on_pause();
    h.host.on_resume();
    h.host.on_pause();
    h.host.on_destroy();

    assert_eq!(
        lifecycle_calls(&h.surface),
        vec![
            SurfaceCall::Start,
            SurfaceCall::Resume,
            SurfaceCall::Pause,
            SurfaceCall::Resume,
            SurfaceCall::Pause,
            SurfaceCall::Destroy,
        ]
    );
    assert_eq!(h.surface.count(SurfaceOp::Load), 1);
    assert!(h.host.surface().is_none());
}

#[test]
fn loads_single_root_document() {
    let mut h = harness();
    h.host.on_create(None).unwrap();
    assert_eq!(h.surface.history(), vec![ROOT_URI.to_string()]);
    assert!(h.log.contains(Level::Info, ROOT_URI));
}

#[test]
fn back_with_history_pops_one_entry() {
    let mut h = harness();
    h.host.on_create(None).unwrap();
    h.surface.navigate("file:///android_asset/index.html#/story/1");

    assert_eq!(h.host.on_back_gesture(), BackAction::Handled);
    assert_eq!(h.surface.count(SurfaceOp::GoBack), 1);
    assert_eq!(h.surface.history(), vec![ROOT_URI.to_string()]);
}

#[test]
fn back_with_empty_history_defers_without_further_queries() {
    let mut h = harness();
    h.host.on_create(None).unwrap();

    assert_eq!(h.host.on_back_gesture(), BackAction::DeferToSystem);
    assert_eq!(h.surface.count(SurfaceOp::CanGoBack), 1);
    assert_eq!(h.surface.count(SurfaceOp::GoBack), 0);
    assert_eq!(
        h.surface.calls().last(),
        Some(&SurfaceCall::CanGoBack),
        "no surface call after the history query"
    );
}

#[test]
fn registered_interceptor_serves_bundle_sub_resources() {
    let mut h = harness();
    h.host.on_create(None).unwrap();
    let interceptor = h.surface.resource_interceptor().unwrap();

    let css = interceptor
        .intercept(&ResourceRequest::get("file:///android_asset/css/style.css"))
        .unwrap();
    assert_eq!(css.mime_type, "text/css");
    assert_eq!(&*css.data, b"body { margin: 0; }\n");

    let js = interceptor
        .intercept(&ResourceRequest::get("file:///android_asset/js/app.js"))
        .unwrap();
    assert_eq!(js.mime_type, "text/javascript");

    let txt = interceptor
        .intercept(&ResourceRequest::get("file:///android_asset/version.txt"))
        .unwrap();
    assert_eq!(txt.mime_type, "text/plain");
}

#[test]
fn full_page_navigation_is_left_to_the_surface() {
    let mut h = harness();
    h.host.on_create(None).unwrap();

    let navigation = h.surface.navigation_interceptor().unwrap();
    assert!(!navigation.should_override(ROOT_URI));
    assert!(!navigation.should_override("https://example.com/help"));

    let resources = h.surface.resource_interceptor().unwrap();
    assert!(
        resources
            .intercept(&ResourceRequest::navigation(ROOT_URI))
            .is_none()
    );
}

#[test]
fn init_failure_is_logged_and_returned() {
    let mut h = harness();
    h.surface.fail_on(SurfaceOp::Load, Fault::Error);

    let err = h.host.on_create(None).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load"));
    assert!(h.log.contains(Level::Error, "Shell initialization failed"));
    assert!(h.log.contains(Level::Error, "Load failed"));
    assert!(h.host.surface().is_none());
}

#[test]
fn failed_init_step_is_last_call_before_release() {
    let mut h = harness();
    h.surface.fail_on(SurfaceOp::Configure, Fault::Error);

    assert!(h.host.on_create(None).is_err());
    assert_eq!(
        h.surface.calls(),
        vec![SurfaceCall::Configure, SurfaceCall::Destroy]
    );
    assert!(h.log.contains(Level::Error, "Failed to configure render surface"));
}

#[test]
fn lifecycle_before_create_is_ignored() {
    let mut h = harness();
    h.host.on_start();
    h.host.on_resume();
    h.host.on_pause();

    assert!(h.surface.calls().is_empty());
    assert!(h.log.contains(Level::Warn, "Ignoring start"));
    assert!(h.log.contains(Level::Warn, "Ignoring resume"));
    assert!(h.log.contains(Level::Warn, "Ignoring pause"));

    h.host.on_create(None).unwrap();
    h.host.on_start();
    assert_eq!(lifecycle_calls(&h.surface), vec![SurfaceCall::Start]);
}

#[test]
fn factory_error_chain_is_logged() {
    let log = Arc::new(CapturingLog::default());
    let mut host: ShellHost<MockSurface> = ShellHost::new(
        ShellConfig::default(),
        Arc::new(EmbeddedAssets::<Fixtures>::new()),
        || Err(anyhow!("WebView provider missing")),
    )
    .with_logger(HostLogger::new(log.clone(), "SuperleitorApp"));

    assert!(host.on_create(None).is_err());
    assert!(log.contains(Level::Error, "Failed to construct render surface"));
    assert!(log.contains(Level::Error, "WebView provider missing"));
}

#[test]
fn init_panic_becomes_error() {
    let mut h = harness();
    h.surface.fail_on(SurfaceOp::Configure, Fault::Panic);

    let err = h.host.on_create(None).unwrap_err();
    assert!(err.to_string().contains("Panic during initialization"));
    assert!(h.log.contains(Level::Error, "Configure panicked"));
}

#[test]
fn pause_failure_keeps_host_alive() {
    let mut h = harness();
    h.host.on_create(None).unwrap();
    h.host.on_resume();

    h.surface.fail_on(SurfaceOp::Pause, Fault::Error);
    h.host.on_pause();
    assert!(h.log.contains(Level::Error, "Failed to forward pause"));

    h.host.on_resume();
    h.host.on_destroy();
    assert_eq!(h.surface.count(SurfaceOp::Resume), 2);
    assert_eq!(h.surface.count(SurfaceOp::Destroy), 1);
}

#[test]
fn pause_panic_keeps_host_alive() {
    let mut h = harness();
    h.host.on_create(None).unwrap();

    h.surface.fail_on(SurfaceOp::Pause, Fault::Panic);
    h.host.on_pause();
    assert!(h.log.contains(Level::Error, "Panic while forwarding pause"));

    h.surface.clear_faults();
    h.host.on_resume();
    assert_eq!(h.surface.count(SurfaceOp::Resume), 1);
}

#[test]
fn failed_destroy_still_releases_surface() {
    let mut h = harness();
    h.host.on_create(None).unwrap();
    h.surface.fail_on(SurfaceOp::Destroy, Fault::Error);

    h.host.on_destroy();
    assert!(h.host.surface().is_none());
    assert!(h.log.contains(Level::Error, "Failed to forward destroy"));

    // Nothing reaches the released surface afterwards.
    h.host.on_resume();
    assert_eq!(h.surface.count(SurfaceOp::Resume), 0);
    assert_eq!(h.host.on_back_gesture(), BackAction::DeferToSystem);
}

#[test]
fn host_can_be_recreated_after_destroy() {
    let mut h = harness();
    h.host.on_create(None).unwrap();
    h.host.on_destroy();
    h.host.on_create(None).unwrap();

    assert_eq!(h.surface.count(SurfaceOp::Load), 2);
    assert!(h.host.surface().is_some());
}

#[test]
fn universal_file_access_is_opt_in() {
    let mut h = harness();
    h.host.on_create(None).unwrap();
    assert!(!h.surface.settings().unwrap().universal_access_from_file_urls);

    let config = ShellConfig::from_json(
        r#"{"android":{"allowUniversalAccessFromFileUrls":true}}"#,
    )
    .unwrap();
    let mut h = harness_with(config);
    h.host.on_create(None).unwrap();
    assert!(h.surface.settings().unwrap().universal_access_from_file_urls);
}
