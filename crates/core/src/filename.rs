//! Image filename rules: allow-list, upload name cleanup, marked-name
//! derivation and public URL construction.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Extensions (lowercase, without dot) served and synced from the image store.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Suffix inserted before the extension of a marked image.
pub const MARKED_SUFFIX: &str = "_marked";

/// Characters escaped when a filename becomes a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Split a filename into stem and extension (extension keeps its dot).
///
/// Leading dots belong to the stem, so `.hidden` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(idx) => name.split_at(leading + idx),
        None => (name, ""),
    }
}

/// Lowercased extension without the dot, if any.
pub fn extension_of(name: &str) -> Option<String> {
    let (_, ext) = split_extension(name);
    ext.strip_prefix('.')
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether a stored file should be listed and synced.
pub fn is_allowed_image(name: &str) -> bool {
    extension_of(name)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied upload name to its final path component.
///
/// Browsers may send full paths (`C:\Users\me\cat.png`); only `cat.png` is kept.
pub fn sanitize_upload_name(raw: &str) -> crate::Result<String> {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        return Err(crate::Error::InvalidFilename(format!(
            "upload name has no usable file component: {raw:?}"
        )));
    }
    if base.chars().any(|c| c.is_control()) {
        return Err(crate::Error::InvalidFilename(format!(
            "upload name contains control characters: {raw:?}"
        )));
    }

    Ok(base.to_string())
}

/// Derive the stored name for a marked image: `cat.png` -> `cat_marked.png`.
pub fn marked_filename(name: &str) -> String {
    let (stem, ext) = split_extension(name);
    format!("{stem}{MARKED_SUFFIX}{ext}")
}

/// Join the public base URL and a stored filename.
pub fn public_url(base_url: &str, filename: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        utf8_percent_encode(filename, PATH_SEGMENT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("red.png"), ("red", ".png"));
        assert_eq!(split_extension("a.b.jpg"), ("a.b", ".jpg"));
        assert_eq!(split_extension("scan"), ("scan", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("..png"), ("..png", ""));
        assert_eq!(split_extension("trailing."), ("trailing", "."));
    }

    #[test]
    fn test_marked_filename() {
        assert_eq!(marked_filename("red.png"), "red_marked.png");
        assert_eq!(marked_filename("a.b.JPG"), "a.b_marked.JPG");
        assert_eq!(marked_filename("scan"), "scan_marked");
    }

    #[test]
    fn test_allow_list_is_case_insensitive() {
        assert!(is_allowed_image("cat.PNG"));
        assert!(is_allowed_image("cat.Jpeg"));
        assert!(is_allowed_image("anim.gif"));
        assert!(!is_allowed_image("notes.txt"));
        assert!(!is_allowed_image("photo.bmp"));
        assert!(!is_allowed_image("png"));
        assert!(!is_allowed_image(".png"));
    }

    #[test]
    fn test_sanitize_upload_name() {
        assert_eq!(sanitize_upload_name("cat.png").unwrap(), "cat.png");
        assert_eq!(sanitize_upload_name("dir/sub/cat.png").unwrap(), "cat.png");
        assert_eq!(
            sanitize_upload_name(r"C:\Users\me\cat.png").unwrap(),
            "cat.png"
        );
        assert!(sanitize_upload_name("").is_err());
        assert!(sanitize_upload_name("dir/").is_err());
        assert!(sanitize_upload_name("..").is_err());
        assert!(sanitize_upload_name("bad\nname.png").is_err());
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            public_url("http://127.0.0.1:8000/marked_images", "red_marked.png"),
            "http://127.0.0.1:8000/marked_images/red_marked.png"
        );
        assert_eq!(
            public_url("http://host/marked_images/", "my cat.png"),
            "http://host/marked_images/my%20cat.png"
        );
    }
}
