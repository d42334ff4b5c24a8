// MIME types for locally served sub-resources.
//
// Covers the file types the packaged web bundle ships. Anything unknown is
// served as text/plain.

use std::path::Path;

pub const DEFAULT_MIME: &str = "text/plain";

/// Map a request path to the MIME type it is served with.
pub fn mime_for_path(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html") => "text/html",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => DEFAULT_MIME,
    }
}

/// Whether a response body of this type should carry a text encoding.
pub fn is_textual(mime: &str) -> bool {
    mime.starts_with("text/") || mime == "image/svg+xml"
}
