//! SCSS compilation through grass.

use std::path::Path;

use anyhow::Result;

use super::{AssetError, minify::minify_css};
use crate::task::{BuildContext, TaskOutput};
use crate::utils::path::{relative_slash, write_file};
use crate::debug;

/// Compile an SCSS file; `@use`/`@import` resolve relative to its directory.
pub fn compile(path: &Path) -> Result<String, AssetError> {
    let mut options = grass::Options::default();
    if let Some(dir) = path.parent() {
        options = options.load_path(dir);
    }
    grass::from_path(path, &options).map_err(|e| AssetError::Style {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// The `styles` task.
pub fn run(ctx: &BuildContext) -> Result<TaskOutput> {
    let config = ctx.config();
    let styles = &config.build.styles;
    if !styles.enable {
        return Ok(TaskOutput::default());
    }
    let entry = config.root_join(&styles.entry);
    if !entry.is_file() {
        debug!("styles"; "no entry at {}, skipping", styles.entry.display());
        return Ok(TaskOutput::default());
    }

    let css = compile(&entry).map_err(|e| match e {
        AssetError::Style { message, .. } => AssetError::Style {
            path: relative_slash(&entry, &config.root).map_or(entry.clone(), Into::into),
            message,
        },
        other => other,
    })?;
    let css = if config.build.minify {
        minify_css(&styles.output, &css)?
    } else {
        css
    };

    let path = config.output_dir().join(&styles.output);
    write_file(&path, css)?;
    Ok(TaskOutput::with_written(vec![path]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site_config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_compile_with_partial() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_colors.scss"), "$accent: #336699;").unwrap();
        fs::write(
            dir.path().join("style.scss"),
            "@import 'colors';\nnav { a { color: $accent; } }",
        )
        .unwrap();

        let css = compile(&dir.path().join("style.scss")).unwrap();
        assert!(css.contains("nav a"));
        assert!(css.contains("#336699"));
    }

    #[test]
    fn test_compile_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("style.scss");
        fs::write(&path, "a { color: $undefined; }").unwrap();
        assert!(matches!(compile(&path), Err(AssetError::Style { .. })));
    }

    #[test]
    fn test_run_minifies() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("assets/scss")).unwrap();
        fs::write(root.join("assets/scss/style.scss"), "body {\n  p { color: #ff0000; }\n}\n").unwrap();

        let ctx = BuildContext::for_config(test_site_config(root, ""));
        let output = run(&ctx).unwrap();

        let css = fs::read_to_string(root.join("public/assets/css/style.min.css")).unwrap();
        assert_eq!(output.written.len(), 1);
        assert_eq!(css, "body p{color:red}");
    }

    #[test]
    fn test_run_error_names_entry() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("assets/scss")).unwrap();
        fs::write(root.join("assets/scss/style.scss"), "a { b: }").unwrap();

        let ctx = BuildContext::for_config(test_site_config(root, ""));
        let err = run(&ctx).unwrap_err();
        assert!(err.to_string().contains("assets/scss/style.scss"));
    }
}
