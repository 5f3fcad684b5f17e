//! Browser scripts compiled into the binary.
//!
//! Both scripts are minified by `build.rs` into `OUT_DIR`. Placeholders are
//! free identifiers, which the mangler leaves alone, and are replaced with
//! JSON literals at render time.
//!
//! ```ignore
//! let js = embed::serve::HOTRELOAD_JS.render(&HotreloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

/// Encode a value as a JavaScript literal.
fn js_literal<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".into())
}

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for hotreload.js.
    pub struct HotreloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for HotreloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__KILN_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Live reload client injected into served HTML pages.
    pub const HOTRELOAD_JS: Template<HotreloadVars> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/hotreload.min.js")));

    /// Insert `<script>` before the last `</body>`, or append when absent.
    pub fn inject(html: &str, script: &str) -> String {
        let tag = format!("<script>{script}</script>");
        match html.rfind("</body>") {
            Some(pos) => format!("{}{tag}{}", &html[..pos], &html[pos..]),
            None => format!("{html}{tag}"),
        }
    }
}

pub mod search {
    use super::{Template, TemplateVars, js_literal};
    use crate::search::STOP_WORDS;

    /// Variables for search.js.
    pub struct SearchVars<'a> {
        /// Site-relative path of the index artifact
        pub index_url: &'a str,
    }

    impl TemplateVars for SearchVars<'_> {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__KILN_INDEX_URL__", &js_literal(self.index_url))
                .replace("__KILN_STOP_WORDS__", &js_literal(STOP_WORDS))
        }
    }

    /// Search client script written next to the index.
    pub const SEARCH_JS: Template<SearchVars<'static>> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/search.min.js")));
}

#[cfg(test)]
mod tests {
    use super::search::{SEARCH_JS, SearchVars};
    use super::serve::{HOTRELOAD_JS, HotreloadVars, inject};

    #[test]
    fn test_hotreload_port_injected() {
        let js = HOTRELOAD_JS.render(&HotreloadVars { ws_port: 35729 });
        assert!(js.contains("35729"));
        assert!(!js.contains("__KILN_WS_PORT__"));
    }

    #[test]
    fn test_search_vars_injected() {
        let js = SEARCH_JS.render(&SearchVars { index_url: "/search.json" });
        assert!(js.contains("\"/search.json\""));
        assert!(js.contains("\"because\""));
        assert!(!js.contains("__KILN_"));
    }

    #[test]
    fn test_inject_before_body_close() {
        assert_eq!(
            inject("<html><body><p>x</p></body></html>", "r()"),
            "<html><body><p>x</p><script>r()</script></body></html>"
        );
        assert_eq!(inject("<p>frag</p>", "r()"), "<p>frag</p><script>r()</script>");
    }
}
