//! Filename and size rules shared by uploads and listings.

use unicode_normalization::UnicodeNormalization;

/// Extensions accepted for upload and shown in the gallery.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Upload ceiling: 16 MiB.
pub const MAX_FILE_SIZE: usize = 16 * 1024 * 1024;

pub const fn max_file_size_mb() -> usize {
    MAX_FILE_SIZE / (1024 * 1024)
}

/// Lowercased extension of `filename` if it is on the allow-list.
///
/// Only the last dot-segment counts, so `photo.tar.png` is accepted and
/// `archive.png.exe` is not. Names without a dot are rejected.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, extension) = filename.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    ALLOWED_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

/// Whether a stored key should be displayed as an image.
pub fn is_image_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
}

pub fn content_type_for(extension: &str) -> String {
    format!("image/{}", extension.to_ascii_lowercase())
}

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// The name is NFKD-normalized first so accented letters keep their base
/// character (`café` becomes `cafe`). Path separators become word breaks,
/// whitespace runs become `_`, anything outside `[A-Za-z0-9_.-]` is dropped
/// and leading/trailing `.` and `_` are trimmed. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}
