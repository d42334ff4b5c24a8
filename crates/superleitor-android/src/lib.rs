// Superleitor Android shell - a WebView host driven from Rust over JNI

// Packaged web bundle and shell configuration
pub mod web_bundle;

// Clearing pending Java exceptions after failed JNI calls
pub mod java_exception;

// WebView-backed render surface
#[cfg(target_os = "android")]
pub mod android_webview;

// Main-thread host instance and surface event queue
#[cfg(target_os = "android")]
pub mod android_app;

// JNI entry points for MainActivity and ShellWebViewClient
#[cfg(target_os = "android")]
pub mod android_jni;
