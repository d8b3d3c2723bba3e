//! Filename and extension extraction from URL path.

/// Longest extension (including the dot) kept in a member name.
const MAX_EXTENSION_LEN: usize = 16;

/// Extracts the last path segment from a URL for use as a filename hint.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let path = parsed.path();
    let segment = path.split('/').filter(|s| !s.is_empty()).last()?;
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Extension of the URL's last path segment, with its leading dot (".pdf").
///
/// Query and fragment are ignored. Returns `None` when there is no extension
/// or it contains anything but ASCII alphanumerics.
pub fn extension_from_url(url: &str) -> Option<String> {
    let name = filename_from_url_path(url)?;
    let dot = name.rfind('.')?;
    let ext = &name[dot..];
    if ext.len() < 2 || ext.len() > MAX_EXTENSION_LEN {
        return None;
    }
    if !ext[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_string())
}
