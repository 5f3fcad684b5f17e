//! `robots.txt`, rendered from `templates/robots.txt` with the `site` global
//! and the absolute `sitemap_url`. Without the template nothing is written.

use anyhow::{Context, Result, anyhow};
use minijinja::context;

use crate::content::template::{Templates, describe};
use crate::task::{BuildContext, TaskOutput};
use crate::utils::path::write_file;
use crate::debug;

pub const TEMPLATE: &str = "robots.txt";

/// The `robots` task.
pub fn run(ctx: &BuildContext) -> Result<TaskOutput> {
    let config = ctx.config();
    let templates = Templates::open(&config.templates_dir(), &config.site);
    if !templates.has(TEMPLATE) {
        debug!("robots"; "no {TEMPLATE} template, skipping");
        return Ok(TaskOutput::default());
    }

    let sitemap = config.build.sitemap.path.to_string_lossy().replace('\\', "/");
    let sitemap_url = config.site.absolute(&format!("/{sitemap}"));
    let text = templates
        .render(TEMPLATE, context! { sitemap_url })
        .map_err(|e| anyhow!("{}", describe(&e)))
        .with_context(|| format!("failed to render {TEMPLATE}"))?;

    let path = config.output_dir().join(TEMPLATE);
    write_file(&path, text)?;
    Ok(TaskOutput::with_written(vec![path]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site_config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_renders_template() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("templates")).unwrap();
        fs::write(
            dir.path().join("templates/robots.txt"),
            "User-agent: *\nSitemap: {{ sitemap_url }}\n# {{ site.title }}",
        )
        .unwrap();

        let ctx = BuildContext::for_config(test_site_config(dir.path(), ""));
        let output = run(&ctx).unwrap();

        assert_eq!(output.written.len(), 1);
        let text = fs::read_to_string(&output.written[0]).unwrap();
        assert_eq!(text, "User-agent: *\nSitemap: https://example.com/sitemap.xml\n# Test");
    }

    #[test]
    fn test_missing_template_is_skipped() {
        let dir = TempDir::new().unwrap();
        let ctx = BuildContext::for_config(test_site_config(dir.path(), ""));
        let output = run(&ctx).unwrap();
        assert!(output.written.is_empty());
        assert!(!dir.path().join("public/robots.txt").exists());
    }
}
