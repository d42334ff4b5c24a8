use std::env;
use std::path::PathBuf;

// The web bundle is embedded from this directory (see src/web_bundle.rs).
const EMBEDDED_WEB_DIR: &str = "dist";

fn main() {
    let target = env::var("TARGET").unwrap();

    if target.contains("android") {
        // android_logger writes through liblog
        println!("cargo:rustc-link-lib=log");
    }

    check_web_bundle();
}

/// Resolve the root document once, at packaging time, and fail the build if
/// the bundle does not contain it.
fn check_web_bundle() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let config_path = manifest_dir.join("shell.config.json");
    println!("cargo:rerun-if-changed={}", config_path.display());

    let raw = std::fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Cannot read {}: {}", config_path.display(), e));
    let config: serde_json::Value = serde_json::from_str(&raw)
        .unwrap_or_else(|e| panic!("Invalid {}: {}", config_path.display(), e));

    let web_dir = config["webDir"].as_str().unwrap_or(EMBEDDED_WEB_DIR);
    if web_dir != EMBEDDED_WEB_DIR {
        panic!(
            "webDir is '{}' but the bundle is embedded from '{}'",
            web_dir, EMBEDDED_WEB_DIR
        );
    }
    let root_document = config["rootDocument"]
        .as_str()
        .unwrap_or("index.html")
        .trim_start_matches('/');

    let bundle_dir = manifest_dir.join("../..").join(EMBEDDED_WEB_DIR);
    println!("cargo:rerun-if-changed={}", bundle_dir.display());

    let root = bundle_dir.join(root_document);
    if !root.is_file() {
        panic!(
            "Root document {} not found; build the web bundle first",
            root.display()
        );
    }
}
