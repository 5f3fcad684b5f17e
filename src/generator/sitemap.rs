//! Sitemap generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2013-03-14</lastmod>
//!   </url>
//! </urlset>
//! ```

use anyhow::Result;
use quick_xml::escape::escape;

use super::minify_xml;
use crate::config::SiteConfig;
use crate::content::RenderedSite;
use crate::task::{BuildContext, TaskOutput};
use crate::utils::{date::DateTimeUtc, path::write_file};
use crate::debug;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// The `sitemap` task.
pub fn run(ctx: &BuildContext) -> Result<TaskOutput> {
    let config = ctx.config();
    if !config.build.sitemap.enable {
        return Ok(TaskOutput::default());
    }

    let site = ctx.site()?;
    let xml = Sitemap::build(&config, &site).into_xml();
    let path = config.output_dir().join(&config.build.sitemap.path);
    write_file(&path, minify_xml(&xml, config.build.minify).as_bytes())?;

    debug!("sitemap"; "{}", config.build.sitemap.path.display());
    Ok(TaskOutput::with_written(vec![path]))
}

struct Sitemap {
    urls: Vec<UrlEntry>,
}

struct UrlEntry {
    loc: String,
    lastmod: Option<DateTimeUtc>,
}

impl Sitemap {
    /// Listing pages first (home page leads), then posts and pages.
    fn build(config: &SiteConfig, site: &RenderedSite) -> Self {
        let listings = site.listings.iter().map(|l| (l.url.as_str(), l.lastmod));
        let documents = site.documents().map(|d| (d.url.as_str(), d.last_modified()));

        let urls = listings
            .chain(documents)
            .map(|(url, lastmod)| UrlEntry {
                loc: config.site.absolute(url),
                lastmod,
            })
            .collect();
        Self { urls }
    }

    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(128 + self.urls.len() * 96);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape(&entry.loc));
            xml.push_str("</loc>\n");
            if let Some(lastmod) = entry.lastmod {
                xml.push_str("    <lastmod>");
                xml.push_str(&lastmod.ymd());
                xml.push_str("</lastmod>\n");
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::assert_well_formed;

    fn entry(loc: &str, lastmod: Option<DateTimeUtc>) -> UrlEntry {
        UrlEntry {
            loc: loc.to_string(),
            lastmod,
        }
    }

    #[test]
    fn test_sitemap_empty() {
        let xml = Sitemap { urls: vec![] }.into_xml();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#)));
        assert!(!xml.contains("<url>"));
        assert_well_formed(&xml);
    }

    #[test]
    fn test_sitemap_entries() {
        let xml = Sitemap {
            urls: vec![
                entry("https://example.com/", Some(DateTimeUtc::from_ymd(2014, 1, 1))),
                entry("https://example.com/about/", None),
            ],
        }
        .into_xml();

        assert!(xml.contains("<loc>https://example.com/</loc>\n    <lastmod>2014-01-01</lastmod>"));
        assert!(xml.contains("<loc>https://example.com/about/</loc>\n  </url>"));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert_well_formed(&xml);
    }

    #[test]
    fn test_sitemap_escapes_special_chars() {
        let xml = Sitemap {
            urls: vec![entry("https://example.com/?q=a&b=c", None)],
        }
        .into_xml();

        assert!(xml.contains("<loc>https://example.com/?q=a&amp;b=c</loc>"));
        assert_well_formed(&xml);
    }

    #[test]
    fn test_lastmod_is_date_only() {
        let xml = Sitemap {
            urls: vec![entry(
                "https://example.com/x/",
                Some(DateTimeUtc::new(2013, 3, 14, 8, 30, 0)),
            )],
        }
        .into_xml();
        assert!(xml.contains("<lastmod>2013-03-14</lastmod>"));
    }
}
