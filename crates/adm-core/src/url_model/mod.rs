//! URL modeling and archive member naming.
//!
//! Member names are derived from the URL's position in the task, not from its
//! basename, so two URLs ending in the same file name never collide.

mod path;

pub use path::{extension_from_url, filename_from_url_path};

/// Prefix shared by every member name.
const MEMBER_PREFIX: &str = "file";

/// Name of the archive member holding the body of the `index`-th URL.
///
/// # Examples
///
/// - `member_name(0, "https://example.com/report.pdf")` → `"file0.pdf"`
/// - `member_name(12, "https://example.com/download")` → `"file12"`
pub fn member_name(index: usize, url: &str) -> String {
    let ext = extension_from_url(url).unwrap_or_default();
    format!("{}{}{}", MEMBER_PREFIX, index, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_name_uses_index_and_extension() {
        assert_eq!(member_name(0, "https://example.com/a/report.pdf"), "file0.pdf");
        assert_eq!(member_name(2, "https://cdn.example.com/photo.jpeg"), "file2.jpeg");
    }

    #[test]
    fn same_basename_yields_distinct_members() {
        let a = member_name(0, "https://one.example.com/scan.jpg");
        let b = member_name(1, "https://two.example.com/scan.jpg");
        assert_ne!(a, b);
    }

    #[test]
    fn indexes_past_nine_stay_numeric() {
        assert_eq!(member_name(10, "https://example.com/x.pdf"), "file10.pdf");
    }

    #[test]
    fn member_without_extension() {
        assert_eq!(member_name(3, "https://example.com/download"), "file3");
    }
}
