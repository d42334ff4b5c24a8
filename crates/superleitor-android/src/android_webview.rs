/// `android.webkit.WebView` as a render surface
///
/// Every call goes through JNI on the UI thread. The interceptors are kept
/// process-wide because `ShellWebViewClient` reaches them from static native
/// methods, and `shouldInterceptRequest` runs on a WebView worker thread.
use anyhow::{Context, Result};
use jni::{
    AttachGuard, JNIEnv, JavaVM,
    objects::{GlobalRef, JObject, JString, JValue},
    sys::jboolean,
};
use std::sync::{Arc, RwLock};
use superleitor_shell::{NavigationInterceptor, RenderSurface, ResourceInterceptor, SurfaceSettings};

use crate::java_exception::{ExceptionSlot, JniResultExt};

const WEBVIEW_CLASS: &str = "android/webkit/WebView";
const CLIENT_CLASS: &str = "com/superleitor/app/ShellWebViewClient";

static NAVIGATION_INTERCEPTOR: RwLock<Option<Arc<dyn NavigationInterceptor>>> = RwLock::new(None);
static RESOURCE_INTERCEPTOR: RwLock<Option<Arc<dyn ResourceInterceptor>>> = RwLock::new(None);

/// Interceptor for full-page navigations, if a surface registered one
pub fn navigation_interceptor() -> Option<Arc<dyn NavigationInterceptor>> {
    NAVIGATION_INTERCEPTOR.read().ok()?.clone()
}

/// Interceptor for sub-resource requests, if a surface registered one
pub fn resource_interceptor() -> Option<Arc<dyn ResourceInterceptor>> {
    RESOURCE_INTERCEPTOR.read().ok()?.clone()
}

fn store<T: ?Sized>(slot: &RwLock<Option<Arc<T>>>, value: Option<Arc<T>>) {
    match slot.write() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

impl ExceptionSlot for JNIEnv<'_> {
    fn take(&mut self) -> Option<String> {
        if !self.exception_check().unwrap_or(false) {
            return None;
        }
        let throwable = self.exception_occurred().ok();
        self.exception_describe().ok();
        self.exception_clear().ok();

        let message = throwable.and_then(|t| throwable_message(self, &t));
        // toString() can throw too
        if self.exception_check().unwrap_or(false) {
            self.exception_clear().ok();
        }
        Some(message.unwrap_or_else(|| "<unknown Java exception>".to_string()))
    }
}

fn throwable_message(env: &mut JNIEnv, throwable: &JObject) -> Option<String> {
    let value = env
        .call_method(throwable, "toString", "()Ljava/lang/String;", &[])
        .ok()?
        .l()
        .ok()?;
    let text = JString::from(value);
    env.get_string(&text).ok().map(|s| s.into())
}

pub struct AndroidWebView {
    vm: Arc<JavaVM>,
    webview: GlobalRef,
    client_installed: bool,
}

impl AndroidWebView {
    /// Construct a WebView for `activity` and make it the activity's content view
    pub fn create(vm: Arc<JavaVM>, activity: GlobalRef) -> Result<Self> {
        let webview = {
            let mut env = vm.attach_current_thread()?;
            let local = env
                .new_object(
                    WEBVIEW_CLASS,
                    "(Landroid/content/Context;)V",
                    &[JValue::Object(activity.as_obj())],
                )
                .or_clear(&mut *env, "new WebView(Context)")?;
            env.call_method(
                &activity,
                "setContentView",
                "(Landroid/view/View;)V",
                &[JValue::Object(&local)],
            )
            .or_clear(&mut *env, "Activity.setContentView")?;
            env.new_global_ref(local)
                .or_clear(&mut *env, "NewGlobalRef(WebView)")?
        };

        Ok(Self {
            vm,
            webview,
            client_installed: false,
        })
    }

    fn env(&self) -> Result<AttachGuard<'_>> {
        self.vm
            .attach_current_thread()
            .context("Failed to attach to the JVM")
    }

    fn call_void(&self, name: &str, sig: &str, args: &[JValue]) -> Result<()> {
        let mut env = self.env()?;
        env.call_method(&self.webview, name, sig, args)
            .or_clear(&mut *env, &format!("WebView.{}", name))?;
        Ok(())
    }

    /// Attach the Java `ShellWebViewClient`, which routes callbacks to Rust
    fn ensure_client(&mut self) -> Result<()> {
        if self.client_installed {
            return Ok(());
        }
        let mut env = self.env()?;
        let client = env
            .new_object(CLIENT_CLASS, "()V", &[])
            .or_clear(&mut *env, "new ShellWebViewClient()")?;
        env.call_method(
            &self.webview,
            "setWebViewClient",
            "(Landroid/webkit/WebViewClient;)V",
            &[JValue::Object(&client)],
        )
        .or_clear(&mut *env, "WebView.setWebViewClient")?;
        drop(env);

        self.client_installed = true;
        log::debug!("ShellWebViewClient installed");
        Ok(())
    }
}

fn set_flag(env: &mut JNIEnv, settings: &JObject, name: &str, value: bool) -> Result<()> {
    env.call_method(settings, name, "(Z)V", &[JValue::Bool(value as jboolean)])
        .or_clear(env, &format!("WebSettings.{}", name))?;
    Ok(())
}

fn set_int(env: &mut JNIEnv, settings: &JObject, name: &str, value: i32) -> Result<()> {
    env.call_method(settings, name, "(I)V", &[JValue::Int(value)])
        .or_clear(env, &format!("WebSettings.{}", name))?;
    Ok(())
}

impl RenderSurface for AndroidWebView {
    fn configure(&mut self, s: &SurfaceSettings) -> Result<()> {
        let mut env = self.env()?;
        let settings = env
            .call_method(&self.webview, "getSettings", "()Landroid/webkit/WebSettings;", &[])
            .or_clear(&mut *env, "WebView.getSettings")?
            .l()?;

        set_flag(&mut env, &settings, "setJavaScriptEnabled", s.javascript_enabled)?;
        set_flag(&mut env, &settings, "setDomStorageEnabled", s.dom_storage_enabled)?;
        set_flag(&mut env, &settings, "setAllowFileAccess", s.file_access_enabled)?;
        set_flag(&mut env, &settings, "setAllowContentAccess", s.content_access_enabled)?;
        set_flag(
            &mut env,
            &settings,
            "setAllowFileAccessFromFileURLs",
            s.file_access_from_file_urls,
        )?;
        set_flag(
            &mut env,
            &settings,
            "setAllowUniversalAccessFromFileURLs",
            s.universal_access_from_file_urls,
        )?;
        set_int(&mut env, &settings, "setMixedContentMode", s.mixed_content.android_value())?;
        set_int(&mut env, &settings, "setCacheMode", s.cache_mode.android_value())?;

        if let Some(color) = s.background_color {
            env.call_method(
                &self.webview,
                "setBackgroundColor",
                "(I)V",
                &[JValue::Int(color as i32)],
            )
            .or_clear(&mut *env, "WebView.setBackgroundColor")?;
        }
        Ok(())
    }

    fn set_navigation_interceptor(
        &mut self,
        interceptor: Arc<dyn NavigationInterceptor>,
    ) -> Result<()> {
        store(&NAVIGATION_INTERCEPTOR, Some(interceptor));
        self.ensure_client()
    }

    fn set_resource_interceptor(
        &mut self,
        interceptor: Arc<dyn ResourceInterceptor>,
    ) -> Result<()> {
        store(&RESOURCE_INTERCEPTOR, Some(interceptor));
        self.ensure_client()
    }

    fn load(&mut self, uri: &str) -> Result<()> {
        let mut env = self.env()?;
        let url = env.new_string(uri).or_clear(&mut *env, "NewStringUTF")?;
        env.call_method(
            &self.webview,
            "loadUrl",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&url)],
        )
        .or_clear(&mut *env, "WebView.loadUrl")?;
        Ok(())
    }

    fn can_go_back(&self) -> Result<bool> {
        let mut env = self.env()?;
        let can = env
            .call_method(&self.webview, "canGoBack", "()Z", &[])
            .or_clear(&mut *env, "WebView.canGoBack")?
            .z()?;
        Ok(can)
    }

    fn go_back(&mut self) -> Result<()> {
        self.call_void("goBack", "()V", &[])
    }

    fn on_start(&mut self) -> Result<()> {
        // WebView has no start hook; rendering resumes in on_resume.
        Ok(())
    }

    fn on_resume(&mut self) -> Result<()> {
        self.call_void("onResume", "()V", &[])
    }

    fn on_pause(&mut self) -> Result<()> {
        self.call_void("onPause", "()V", &[])
    }

    fn destroy(&mut self) -> Result<()> {
        store(&NAVIGATION_INTERCEPTOR, None);
        store(&RESOURCE_INTERCEPTOR, None);
        self.call_void("destroy", "()V", &[])
    }

    fn enable_debug_inspection(&mut self, enabled: bool) -> Result<()> {
        let mut env = self.env()?;
        env.call_static_method(
            WEBVIEW_CLASS,
            "setWebContentsDebuggingEnabled",
            "(Z)V",
            &[JValue::Bool(enabled as jboolean)],
        )
        .or_clear(&mut *env, "WebView.setWebContentsDebuggingEnabled")?;
        Ok(())
    }
}
