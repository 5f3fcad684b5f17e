//! Content-Type for files served from the output directory.

use std::path::Path;

pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";
    pub const RSS: &str = "application/rss+xml";
    pub const ATOM: &str = "application/atom+xml";
    pub const OCTET_STREAM: &str = "application/octet-stream";

    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";

    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
}

/// Guess MIME type from a file name.
///
/// Feeds are matched by file name since both `rss.xml` and `atom.xml` share
/// the `.xml` extension.
pub fn from_path(path: &Path) -> &'static str {
    match path.file_name().and_then(|n| n.to_str()) {
        Some("rss.xml") => return types::RSS,
        Some("atom.xml") => return types::ATOM,
        _ => {}
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("html" | "htm") => types::HTML,
        Some("css") => types::CSS,
        Some("js" | "mjs") => types::JAVASCRIPT,
        Some("json") => types::JSON,
        Some("xml") => types::XML,
        Some("txt") => types::PLAIN,
        Some("png") => types::PNG,
        Some("jpg" | "jpeg") => types::JPEG,
        Some("gif") => types::GIF,
        Some("webp") => types::WEBP,
        Some("svg") => types::SVG,
        Some("ico") => types::ICO,
        Some("woff") => types::WOFF,
        Some("woff2") => types::WOFF2,
        Some("ttf") => types::TTF,
        _ => types::OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(from_path(Path::new("index.html")), types::HTML);
        assert_eq!(from_path(Path::new("assets/css/style.min.css")), types::CSS);
        assert_eq!(from_path(Path::new("assets/js/all.min.js")), types::JAVASCRIPT);
        assert_eq!(from_path(Path::new("search.json")), types::JSON);
        assert_eq!(from_path(Path::new("sitemap.xml")), types::XML);
        assert_eq!(from_path(Path::new("blog/categories/rust/rss.xml")), types::RSS);
        assert_eq!(from_path(Path::new("atom.xml")), types::ATOM);
        assert_eq!(from_path(Path::new("LOGO.PNG")), types::PNG);
        assert_eq!(from_path(Path::new("CNAME")), types::OCTET_STREAM);
    }
}
