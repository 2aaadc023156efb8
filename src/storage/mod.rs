pub mod local;
pub mod naming;

pub use local::{ImageEntry, ImageStore, StoredFile};
pub use naming::{extension_for_upload, unique_filename};

pub fn get_extension_from_mime_type(mime_type: &str) -> Option<&'static str> {
    match mime_type.to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/bmp" => Some("bmp"),
        "image/svg+xml" => Some("svg"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}
