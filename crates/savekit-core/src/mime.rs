//! File name to content type resolution.
//!
//! Resolution is a pure, total function: unknown or missing extensions
//! degrade to [`OCTET_STREAM`] instead of failing.

/// Generic fallback content type for unrecognized files.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extract the extension of a file name.
///
/// Only the final path segment is considered, so `backup.d/notes` has no
/// extension. Returns `None` when there is no `.` or nothing follows the last one.
pub fn extension_of(file_name: &str) -> Option<&str> {
    let segment = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    match segment.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Resolve the content type for a file name.
///
/// The extension lookup is case-insensitive (`A.PNG` and `a.png` resolve
/// identically).
///
/// # Examples
///
/// ```
/// use savekit_core::resolve_mime;
///
/// assert_eq!(resolve_mime("report.pdf"), "application/pdf");
/// assert_eq!(resolve_mime("README"), "application/octet-stream");
/// ```
pub fn resolve_mime(file_name: &str) -> &'static str {
    extension_of(file_name)
        .and_then(|ext| mime_guess::from_ext(&ext.to_ascii_lowercase()).first_raw())
        .unwrap_or(OCTET_STREAM)
}
