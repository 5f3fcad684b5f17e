//! Minification: oxc for JavaScript, lightningcss for CSS, minify-html for
//! rendered pages.
//!
//! Both are pure functions of their input, so minified output is as
//! reproducible as the source.

use std::path::Path;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::AssetError;

/// Minify a script. Bundles are parsed as modules, which implies strict mode.
pub fn minify_js(path: &Path, source: &str) -> Result<String, AssetError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(error) = ret.errors.first() {
        return Err(AssetError::Minify {
            path: path.to_path_buf(),
            message: error.to_string(),
        });
    }

    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

pub fn minify_css(path: &Path, source: &str) -> Result<String, AssetError> {
    let error = |message: String| AssetError::Minify {
        path: path.to_path_buf(),
        message,
    };

    let stylesheet =
        StyleSheet::parse(source, ParserOptions::default()).map_err(|e| error(e.to_string()))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| error(e.to_string()))?;
    Ok(result.code)
}

/// Minify a rendered page: comments dropped, whitespace collapsed, inline
/// styles minified. Closing tags and `<html>`/`<head>` stay.
pub fn minify_html(source: &str) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    minify_html::minify(source.as_bytes(), &cfg)
}
