/// Android shell host bridge
///
/// Owns the `ShellHost` for the activity. The host lives in a thread-local and
/// is only touched from the main UI thread; WebView client callbacks reach it
/// through the global surface event queue.
use anyhow::Result;
use jni::{JavaVM, objects::GlobalRef};
use once_cell::sync::Lazy;
use std::cell::RefCell;
use std::sync::Arc;
use superleitor_shell::{BackAction, EventQueue, HostLifecycle, ShellHost, SurfaceEvent};

use crate::android_webview::AndroidWebView;
use crate::web_bundle;

/// Surface notifications from any thread, drained on the UI thread
static EVENT_QUEUE: Lazy<EventQueue> = Lazy::new(EventQueue::new);

thread_local! {
    static SHELL_HOST: RefCell<Option<ShellHost<AndroidWebView>>> = const { RefCell::new(None) };
}

/// Queue a surface notification (callable from any thread)
pub fn post_event(event: SurfaceEvent) {
    if let Err(e) = EVENT_QUEUE.send(event) {
        log::error!("Failed to queue surface event: {:?}", e);
    }
}

/// Create the host for a new activity instance and run its initialization
///
/// A host whose surface is still live keeps running; otherwise a fresh host is
/// bound to `activity` (first launch, or re-creation after a configuration
/// change).
pub fn create(vm: JavaVM, activity: GlobalRef, saved_state: Option<Vec<u8>>) -> Result<()> {
    let config = web_bundle::load_config().inspect_err(|e| {
        log::error!("Failed to load shell config: {:?}", e);
    })?;

    SHELL_HOST.with(|cell| {
        let mut slot = cell.borrow_mut();
        let live = slot.as_ref().is_some_and(|host| host.surface().is_some());
        if !live {
            let vm = Arc::new(vm);
            *slot = Some(ShellHost::new(config, web_bundle::assets(), move || {
                AndroidWebView::create(vm.clone(), activity.clone())
            }));
        }

        match slot.as_mut() {
            Some(host) => host.on_create(saved_state.as_deref()),
            None => Ok(()),
        }
    })
}

/// Run `f` against the host after applying pending surface events
///
/// Returns `None` when no host exists or the host is already borrowed
/// (a re-entrant callback from inside a surface call).
fn with_host<R>(f: impl FnOnce(&mut ShellHost<AndroidWebView>) -> R) -> Option<R> {
    SHELL_HOST.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            log::debug!("Shell host busy; deferring");
            return None;
        };
        let host = slot.as_mut()?;
        host.drain_events(&EVENT_QUEUE);
        Some(f(host))
    })
}

pub fn start() {
    with_host(|host| host.on_start());
}

pub fn resume() {
    with_host(|host| host.on_resume());
}

pub fn pause() {
    with_host(|host| host.on_pause());
}

pub fn destroy() {
    with_host(|host| host.on_destroy());
}

/// Returns true when the WebView consumed the gesture
pub fn back_pressed() -> bool {
    matches!(
        with_host(|host| host.on_back_gesture()),
        Some(BackAction::Handled)
    )
}

/// Apply queued surface events now, if the host is free
pub fn process_events() {
    with_host(|_| ());
}
