use chrono::Local;

use super::get_extension_from_mime_type;

const DEFAULT_EXTENSION: &str = ".png";

/// `<prefix>_<YYYYMMDD-HHMMSS>_<8 hex chars><ext>`. The random suffix keeps
/// names unique when several requests land in the same second.
pub fn unique_filename(prefix: &str, ext: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let suffix = hex::encode(rand::random::<[u8; 4]>());
    format!("{prefix}_{timestamp}_{suffix}{ext}")
}

fn extension_from_filename(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = base.rsplit_once('.')?;
    let ext = ext.trim();
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

/// Extension (with leading dot) for a stored upload: the client filename's
/// extension, else one derived from the content type, else `.png`.
pub fn extension_for_upload(file_name: &str, content_type: Option<&str>) -> String {
    if let Some(ext) = extension_from_filename(file_name) {
        return ext;
    }
    content_type
        .and_then(get_extension_from_mime_type)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
