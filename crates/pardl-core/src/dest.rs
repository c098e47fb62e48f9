//! Output file naming: `<index>.<ext>` inside the output folder.

use std::path::{Path, PathBuf};

/// Builds the destination path for item `index`.
///
/// Extension precedence: the explicit override, then the extension of the
/// source URL's last path segment, then `bin`.
pub fn destination_for(
    output_dir: &Path,
    index: u32,
    source_url: &str,
    ext_override: Option<&str>,
) -> PathBuf {
    let ext = match ext_override {
        Some(e) => e.trim_start_matches('.').to_string(),
        None => extension_from_url(source_url).unwrap_or_else(|| "bin".to_string()),
    };
    output_dir.join(format!("{}.{}", index, ext))
}

/// Extracts a file extension from the URL's last path segment.
///
/// Returns `None` when the URL cannot be parsed or the segment carries no
/// usable extension.
fn extension_from_url(source_url: &str) -> Option<String> {
    let parsed = url::Url::parse(source_url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins() {
        let path = destination_for(Path::new("out"), 3, "https://example.com/a.jpg", Some("png"));
        assert_eq!(path, Path::new("out").join("3.png"));
    }

    #[test]
    fn override_leading_dot_is_trimmed() {
        let path = destination_for(Path::new("out"), 1, "https://example.com/a", Some(".png"));
        assert_eq!(path, Path::new("out").join("1.png"));
    }

    #[test]
    fn extension_from_url_path() {
        let path = destination_for(Path::new("out"), 1, "https://example.com/p/photo.JPG", None);
        assert_eq!(path, Path::new("out").join("1.jpg"));
    }

    #[test]
    fn query_string_is_ignored() {
        let path = destination_for(
            Path::new("out"),
            2,
            "https://example.com/file.zip?token=abc",
            None,
        );
        assert_eq!(path, Path::new("out").join("2.zip"));
    }

    #[test]
    fn no_extension_falls_back_to_bin() {
        let path = destination_for(Path::new("out"), 7, "https://picsum.photos/200/300", None);
        assert_eq!(path, Path::new("out").join("7.bin"));
    }

    #[test]
    fn hidden_segment_is_not_an_extension() {
        assert_eq!(extension_from_url("https://example.com/.hidden"), None);
        assert_eq!(extension_from_url("not a url"), None);
    }
}
