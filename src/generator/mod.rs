//! Files generated from the rendered site rather than from templates:
//!
//! - **Feed**: RSS 2.0 and Atom 1.0, site-wide and per category
//! - **Sitemap**: `sitemap.xml` for search engines
//! - **Robots**: `robots.txt`, rendered from `templates/robots.txt`
//!
//! Feed and sitemap read the [`RenderedSite`](crate::content::RenderedSite)
//! published by the content task; nothing is re-parsed.

pub mod feed;
pub mod robots;
pub mod sitemap;

use std::borrow::Cow;

/// Collapse indentation and line breaks between XML elements.
pub fn minify_xml(content: &str, enabled: bool) -> Cow<'_, str> {
    if !enabled {
        return Cow::Borrowed(content);
    }
    Cow::Owned(
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect(),
    )
}

/// Parse `xml` to the end, failing on the first malformed event.
#[cfg(test)]
pub fn assert_well_formed(xml: &str) {
    use quick_xml::{Reader, events::Event};

    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("malformed XML at {}: {e}\n{xml}", reader.buffer_position()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_xml() {
        let xml = "<?xml version=\"1.0\"?>\n<root>\n\n  <item>Hello</item>\n</root>";
        assert_eq!(
            minify_xml(xml, true),
            "<?xml version=\"1.0\"?><root><item>Hello</item></root>"
        );
        assert_eq!(minify_xml(xml, false), xml);
    }
}
