//! Object key and content-type helpers.

use uuid::Uuid;

/// Content type used when the extension is unknown or missing.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Lowercased extension of `name`, without the dot.
fn extension(name: &str) -> Option<String> {
    let file = name.rsplit('/').next().unwrap_or(name);
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Build a collision-free key `{prefix}/{uuid}.{ext}` for an uploaded file,
/// keeping the extension of the client-supplied file name.
pub fn object_key(prefix: &str, original_name: &str) -> String {
    match extension(original_name) {
        Some(ext) => format!("{prefix}/{}.{ext}", Uuid::new_v4()),
        None => format!("{prefix}/{}", Uuid::new_v4()),
    }
}

/// Guess the content type of `name` from its extension.
pub fn content_type_for(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("epub") => "application/epub+zip",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("txt") => "text/plain; charset=utf-8",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
