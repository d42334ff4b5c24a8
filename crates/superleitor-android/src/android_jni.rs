//! JNI entry points
//!
//! Java side (package `com.superleitor.app`, sources under
//! `android/app/src/main/java`), all declared `static native`:
//!
//! - `MainActivity` forwards `onCreate(Bundle)` (with the saved-state bundle
//!   marshalled to `byte[]`, or null), `onStart`, `onResume`, `onPause`,
//!   `onDestroy` and `onBackPressed`, calling `super.onBackPressed()` when
//!   `nativeOnBackPressed` returns false.
//! - `ShellWebViewClient extends WebViewClient` forwards
//!   `shouldOverrideUrlLoading`, `shouldInterceptRequest`, `onPageStarted`,
//!   `onPageFinished` and `onReceivedError`.

use jni::{
    JNIEnv,
    objects::{JByteArray, JClass, JObject, JString, JValue},
    sys::{JNI_FALSE, JNI_TRUE, jboolean, jint, jobject},
};
use std::sync::Once;
use superleitor_shell::{ResourceRequest, ResourceResponse, SurfaceEvent};

use crate::android_app;
use crate::android_webview;
use crate::java_exception::ExceptionSlot;

static INIT: Once = Once::new();

/// Initialize logging and panic hook for Android
fn init_logging() {
    INIT.call_once(|| {
        let level = if cfg!(feature = "debug-logs") {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        let tag = crate::web_bundle::load_config()
            .map(|c| c.log_tag)
            .unwrap_or_else(|_| superleitor_shell::config::DEFAULT_LOG_TAG.to_string());

        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(level)
                .with_tag(tag),
        );

        std::panic::set_hook(Box::new(|info| {
            let payload = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "Unknown panic".to_string());

            let location = info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_else(|| "unknown".to_string());

            log::error!("PANIC at {}: {}", location, payload);
        }));
    });
}

fn get_string(env: &mut JNIEnv, value: &JString) -> Option<String> {
    if value.is_null() {
        return None;
    }
    let result = env.get_string(value).map(String::from);
    match result {
        Ok(s) => Some(s),
        Err(e) => {
            log::error!("Failed to read Java string: {:?}", e);
            clear_pending(env, "get_string");
            None
        }
    }
}

/// Log and clear an exception left pending by a forwarded call
///
/// Lifecycle failures are not fatal, so nothing may be rethrown in the caller.
fn clear_pending(env: &mut JNIEnv, entry: &str) {
    if let Some(exception) = env.take() {
        log::error!("{}: cleared pending Java exception: {}", entry, exception);
    }
}

fn throw_runtime_exception(env: &mut JNIEnv, message: &str) {
    clear_pending(env, "throw_runtime_exception");
    if let Err(e) = env.throw_new("java/lang/RuntimeException", message) {
        log::error!("Failed to throw RuntimeException: {:?}", e);
    }
}

// ---------------------------------------------------------------------------
// MainActivity
// ---------------------------------------------------------------------------

/// Called from MainActivity.onCreate()
///
/// Initialization failures are rethrown as `RuntimeException` so the
/// activity crashes with the cause in logcat.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_superleitor_app_MainActivity_nativeOnCreate(
    mut env: JNIEnv,
    _class: JClass,
    activity: JObject,
    saved_state: JByteArray,
) {
    init_logging();
    log::info!("nativeOnCreate called");

    let vm = match env.get_java_vm() {
        Ok(vm) => vm,
        Err(e) => {
            log::error!("Failed to get JavaVM: {:?}", e);
            throw_runtime_exception(&mut env, &format!("Failed to get JavaVM: {}", e));
            return;
        }
    };

    let activity_ref = match env.new_global_ref(&activity) {
        Ok(r) => r,
        Err(e) => {
            log::error!("Failed to create global ref to activity: {:?}", e);
            throw_runtime_exception(&mut env, &format!("Failed to reference activity: {}", e));
            return;
        }
    };

    let saved_state = if saved_state.is_null() {
        None
    } else {
        match env.convert_byte_array(&saved_state) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("Ignoring unreadable saved state: {:?}", e);
                None
            }
        }
    };

    if let Err(e) = android_app::create(vm, activity_ref, saved_state) {
        throw_runtime_exception(&mut env, &format!("{:#}", e));
        return;
    }

    log::info!("nativeOnCreate completed");
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_superleitor_app_MainActivity_nativeOnStart(
    mut env: JNIEnv,
    _class: JClass,
) {
    log::debug!("nativeOnStart called");
    android_app::start();
    clear_pending(&mut env, "nativeOnStart");
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_superleitor_app_MainActivity_nativeOnResume(
    mut env: JNIEnv,
    _class: JClass,
) {
    log::debug!("nativeOnResume called");
    android_app::resume();
    clear_pending(&mut env, "nativeOnResume");
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_superleitor_app_MainActivity_nativeOnPause(
    mut env: JNIEnv,
    _class: JClass,
) {
    log::debug!("nativeOnPause called");
    android_app::pause();
    clear_pending(&mut env, "nativeOnPause");
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_superleitor_app_MainActivity_nativeOnDestroy(
    mut env: JNIEnv,
    _class: JClass,
) {
    log::info!("nativeOnDestroy called");
    android_app::destroy();
    clear_pending(&mut env, "nativeOnDestroy");
}

/// Returns true when the WebView stepped back in its history
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_superleitor_app_MainActivity_nativeOnBackPressed(
    mut env: JNIEnv,
    _class: JClass,
) -> jboolean {
    let handled = android_app::back_pressed();
    clear_pending(&mut env, "nativeOnBackPressed");
    if handled {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

// ---------------------------------------------------------------------------
// ShellWebViewClient
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_superleitor_app_ShellWebViewClient_nativeShouldOverrideUrlLoading(
    mut env: JNIEnv,
    _class: JClass,
    url: JString,
) -> jboolean {
    let Some(url) = get_string(&mut env, &url) else {
        return JNI_FALSE;
    };
    match android_webview::navigation_interceptor() {
        Some(interceptor) if interceptor.should_override(&url) => JNI_TRUE,
        _ => JNI_FALSE,
    }
}

/// Called on a WebView worker thread. Returns a `WebResourceResponse`, or
/// null to let the WebView load the resource itself.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_superleitor_app_ShellWebViewClient_nativeShouldInterceptRequest(
    mut env: JNIEnv,
    _class: JClass,
    url: JString,
    is_main_frame: jboolean,
    method: JString,
) -> jobject {
    let Some(interceptor) = android_webview::resource_interceptor() else {
        return std::ptr::null_mut();
    };
    let Some(uri) = get_string(&mut env, &url) else {
        return std::ptr::null_mut();
    };
    let request = ResourceRequest {
        uri,
        is_main_frame: is_main_frame == JNI_TRUE,
        method: get_string(&mut env, &method).unwrap_or_else(|| "GET".to_string()),
    };

    let Some(response) = interceptor.intercept(&request) else {
        return std::ptr::null_mut();
    };

    match new_resource_response(&mut env, &response) {
        Ok(obj) => obj.into_raw(),
        Err(e) => {
            tracing::warn!("Failed to build WebResourceResponse for {}: {:?}", request.uri, e);
            clear_pending(&mut env, "nativeShouldInterceptRequest");
            std::ptr::null_mut()
        }
    }
}

fn new_resource_response<'local>(
    env: &mut JNIEnv<'local>,
    response: &ResourceResponse,
) -> jni::errors::Result<JObject<'local>> {
    let bytes = env.byte_array_from_slice(&response.data)?;
    let stream = env.new_object(
        "java/io/ByteArrayInputStream",
        "([B)V",
        &[JValue::Object(&bytes)],
    )?;
    let mime = env.new_string(response.mime_type)?;
    let encoding = match response.encoding {
        Some(encoding) => JObject::from(env.new_string(encoding)?),
        None => JObject::null(),
    };
    env.new_object(
        "android/webkit/WebResourceResponse",
        "(Ljava/lang/String;Ljava/lang/String;Ljava/io/InputStream;)V",
        &[
            JValue::Object(&mime),
            JValue::Object(&encoding),
            JValue::Object(&stream),
        ],
    )
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_superleitor_app_ShellWebViewClient_nativeOnPageStarted(
    mut env: JNIEnv,
    _class: JClass,
    url: JString,
) {
    let url = get_string(&mut env, &url).unwrap_or_default();
    android_app::post_event(SurfaceEvent::PageStarted { url });
    android_app::process_events();
    clear_pending(&mut env, "nativeOnPageStarted");
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_superleitor_app_ShellWebViewClient_nativeOnPageFinished(
    mut env: JNIEnv,
    _class: JClass,
    url: JString,
) {
    let url = get_string(&mut env, &url).unwrap_or_default();
    android_app::post_event(SurfaceEvent::PageFinished { url });
    android_app::process_events();
    clear_pending(&mut env, "nativeOnPageFinished");
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_superleitor_app_ShellWebViewClient_nativeOnReceivedError(
    mut env: JNIEnv,
    _class: JClass,
    error_code: jint,
    description: JString,
    failing_url: JString,
) {
    let description = get_string(&mut env, &description).unwrap_or_default();
    let url = get_string(&mut env, &failing_url).unwrap_or_default();
    android_app::post_event(SurfaceEvent::LoadError {
        code: error_code,
        description,
        url,
    });
    android_app::process_events();
    clear_pending(&mut env, "nativeOnReceivedError");
}
