//! ES module bundler for the site's scripts.
//!
//! Starting from one entry, relative imports are followed depth-first and
//! every module is emitted once, dependencies before dependents (the order
//! a browser would evaluate them). Import statements are dropped and
//! `export` keywords stripped, so modules share one scope inside a single
//! IIFE:
//!
//! ```text
//! main.js ─import─► util.js ─import─► dom.js        (function () {
//!    └─────import─► search.js                         // dom.js, util.js,
//!                                                     // search.js, main.js
//!                                                   })();
//! ```
//!
//! Bindings are shared by name, so only named imports without renaming
//! (`import { a, b } from './x.js'`) and side-effect imports are accepted.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use oxc::allocator::Allocator;
use oxc::ast::ast::{
    ExportDefaultDeclarationKind, ExportSpecifier, ImportDeclarationSpecifier, Statement,
};
use oxc::parser::Parser;
use oxc::span::{GetSpan, SourceType, Span};

use super::{AssetError, minify::minify_js};
use crate::task::{BuildContext, TaskOutput};
use crate::utils::path::{normalize_path, relative_slash, write_file};
use crate::debug;

/// A bundled script.
#[derive(Debug)]
pub struct Bundle {
    pub code: String,
    /// Modules in emission order, relative to the site root
    pub modules: Vec<String>,
}

/// Bundle the module graph reachable from `entry`.
///
/// `root` only shortens the paths shown in errors and module comments.
pub fn bundle(entry: &Path, root: &Path) -> Result<Bundle, AssetError> {
    let root = normalize_path(root);
    let entry = fs::canonicalize(entry).map_err(|source| AssetError::Io {
        path: entry.to_path_buf(),
        source,
    })?;

    let mut bundler = Bundler {
        root: &root,
        marks: HashMap::new(),
        stack: Vec::new(),
        emitted: Vec::new(),
    };
    bundler.visit(entry)?;

    let mut code = String::from("(function () {\n'use strict';\n");
    let mut modules = Vec::with_capacity(bundler.emitted.len());
    for (name, body) in bundler.emitted {
        code.push_str("// ");
        code.push_str(&name);
        code.push('\n');
        code.push_str(body.trim_end());
        code.push('\n');
        modules.push(name);
    }
    code.push_str("})();\n");

    // Module syntax left behind is an error in a classic script
    let name = modules.last().map_or("bundle", String::as_str);
    check_syntax(&code, name, SourceType::script())?;

    Ok(Bundle { code, modules })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

struct Bundler<'a> {
    root: &'a Path,
    marks: HashMap<PathBuf, Mark>,
    /// Modules on the current DFS path
    stack: Vec<PathBuf>,
    emitted: Vec<(String, String)>,
}

impl Bundler<'_> {
    fn display(&self, path: &Path) -> String {
        relative_slash(path, self.root).unwrap_or_else(|| path.display().to_string())
    }

    fn visit(&mut self, path: PathBuf) -> Result<(), AssetError> {
        match self.marks.get(&path) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = self.stack.iter().position(|p| *p == path).unwrap_or(0);
                let cycle = self.stack[start..]
                    .iter()
                    .chain([&path])
                    .map(|p| PathBuf::from(self.display(p)))
                    .collect();
                return Err(AssetError::Cycle(cycle));
            }
            None => {}
        }

        self.marks.insert(path.clone(), Mark::Visiting);
        self.stack.push(path.clone());

        let name = self.display(&path);
        let module = Module::load(&path, &name)?;
        for dependency in &module.dependencies {
            let resolved = resolve(&path, dependency, &name)?;
            self.visit(resolved)?;
        }

        self.stack.pop();
        self.marks.insert(path, Mark::Done);
        self.emitted.push((name, module.body));
        Ok(())
    }
}

/// One source module: its relative imports and its body with module syntax
/// removed.
struct Module {
    dependencies: Vec<String>,
    body: String,
}

impl Module {
    fn load(path: &Path, name: &str) -> Result<Self, AssetError> {
        let source = fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: PathBuf::from(name),
            source,
        })?;

        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, &source, SourceType::mjs()).parse();
        if let Some(error) = ret.errors.first() {
            return Err(syntax_error(name, error.to_string()));
        }

        let unsupported = |span: Span| AssetError::Unsupported {
            path: PathBuf::from(name),
            statement: source[span.start as usize..span.end as usize].trim().to_string(),
        };

        let mut dependencies = Vec::new();
        // Byte ranges of module syntax, in source order
        let mut cuts = Vec::new();

        for statement in &ret.program.body {
            match statement {
                Statement::ImportDeclaration(decl) => {
                    let plain = decl.specifiers.as_ref().is_none_or(|specifiers| {
                        specifiers.iter().all(|specifier| match specifier {
                            ImportDeclarationSpecifier::ImportSpecifier(s) => {
                                s.imported.name().as_str() == s.local.name.as_str()
                            }
                            _ => false,
                        })
                    });
                    if !plain {
                        return Err(unsupported(decl.span));
                    }
                    dependencies.push(decl.source.value.to_string());
                    cuts.push((decl.span.start, decl.span.end));
                }
                Statement::ExportAllDeclaration(decl) => {
                    if decl.exported.is_some() {
                        return Err(unsupported(decl.span));
                    }
                    dependencies.push(decl.source.value.to_string());
                    cuts.push((decl.span.start, decl.span.end));
                }
                Statement::ExportNamedDeclaration(decl) => {
                    if let Some(declaration) = &decl.declaration {
                        // Keep the declaration, drop the keyword
                        cuts.push((decl.span.start, declaration.span().start));
                        continue;
                    }
                    if !decl.specifiers.iter().all(is_unrenamed) {
                        return Err(unsupported(decl.span));
                    }
                    if let Some(source) = &decl.source {
                        dependencies.push(source.value.to_string());
                    }
                    cuts.push((decl.span.start, decl.span.end));
                }
                Statement::ExportDefaultDeclaration(decl) => {
                    let named = match &decl.declaration {
                        ExportDefaultDeclarationKind::FunctionDeclaration(f) => f.id.is_some(),
                        ExportDefaultDeclarationKind::ClassDeclaration(c) => c.id.is_some(),
                        _ => false,
                    };
                    if !named {
                        return Err(unsupported(decl.span));
                    }
                    cuts.push((decl.span.start, decl.declaration.span().start));
                }
                _ => {}
            }
        }

        Ok(Self {
            dependencies,
            body: cut(&source, &cuts),
        })
    }
}

/// `export { a }` or `export { a } from`, without `as` renames.
fn is_unrenamed(specifier: &ExportSpecifier<'_>) -> bool {
    specifier.local.name().as_str() == specifier.exported.name().as_str()
}

/// `source` without the given byte ranges.
fn cut(source: &str, ranges: &[(u32, u32)]) -> String {
    let mut body = String::with_capacity(source.len());
    let mut at = 0;
    for &(start, end) in ranges {
        body.push_str(&source[at..start as usize]);
        at = end as usize;
    }
    body.push_str(&source[at..]);
    body
}

fn syntax_error(name: &str, message: String) -> AssetError {
    AssetError::Syntax {
        path: PathBuf::from(name),
        message,
    }
}

fn check_syntax(source: &str, name: &str, source_type: SourceType) -> Result<(), AssetError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    match ret.errors.first() {
        Some(error) => Err(syntax_error(name, error.to_string())),
        None => Ok(()),
    }
}

/// Resolve a relative specifier: exact file, then `.js`, then `/index.js`.
fn resolve(importer: &Path, specifier: &str, importer_name: &str) -> Result<PathBuf, AssetError> {
    if !specifier.starts_with("./") && !specifier.starts_with("../") {
        return Err(AssetError::BareSpecifier {
            specifier: specifier.to_string(),
            importer: PathBuf::from(importer_name),
        });
    }

    let base = importer.parent().unwrap_or(importer).join(specifier);
    let candidates = [
        base.clone(),
        PathBuf::from(format!("{}.js", base.display())),
        base.join("index.js"),
    ];

    candidates
        .into_iter()
        .find(|candidate| candidate.is_file())
        .and_then(|found| fs::canonicalize(found).ok())
        .ok_or_else(|| AssetError::Unresolved {
            specifier: specifier.to_string(),
            importer: PathBuf::from(importer_name),
        })
}

/// The `scripts` task.
///
/// A site without a script entry has nothing to bundle.
pub fn run(ctx: &BuildContext) -> Result<TaskOutput> {
    let config = ctx.config();
    let scripts = &config.build.scripts;
    let entry = config.root_join(&scripts.entry);
    if !scripts.enable {
        return Ok(TaskOutput::default());
    }
    if !entry.is_file() {
        debug!("scripts"; "no entry at {}, skipping", scripts.entry.display());
        return Ok(TaskOutput::default());
    }

    let bundle = bundle(&entry, &config.root)?;
    let code = if config.build.minify {
        minify_js(&scripts.output, &bundle.code)?
    } else {
        bundle.code
    };

    let path = config.output_dir().join(&scripts.output);
    write_file(&path, code)?;
    debug!("scripts"; "bundled {} modules", bundle.modules.len());
    Ok(TaskOutput::with_written(vec![path]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn bundle_at(root: &Path) -> Result<Bundle, AssetError> {
        bundle(&root.join("js/main.js"), root)
    }

    #[test]
    fn test_dependencies_first_in_import_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "js/main.js", "import { a } from './a.js';\nimport './b.js';\nconsole.log(a);\n");
        write(root, "js/a.js", "import { c } from './c';\nexport const a = c + 1;\n");
        write(root, "js/b.js", "window.b = true;\n");
        write(root, "js/c.js", "export function c() { return 1; }\n");

        let bundle = bundle_at(root).unwrap();
        assert_eq!(bundle.modules, ["js/c.js", "js/a.js", "js/b.js", "js/main.js"]);
        assert!(bundle.code.starts_with("(function () {"));
        assert!(bundle.code.ends_with("})();\n"));
        assert!(bundle.code.contains("const a = c + 1;"));
        assert!(bundle.code.contains("function c()"));
        assert!(!bundle.code.contains("import"));
        assert!(!bundle.code.contains("export"));
        check_syntax(&bundle.code, "bundle", SourceType::script()).unwrap();
    }

    #[test]
    fn test_shared_module_emitted_once() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "js/main.js", "import './a.js';\nimport './b.js';\n");
        write(root, "js/a.js", "import './shared.js';\n");
        write(root, "js/b.js", "import './shared.js';\n");
        write(root, "js/shared.js", "var shared = 1;\n");

        let bundle = bundle_at(root).unwrap();
        assert_eq!(bundle.modules, ["js/shared.js", "js/a.js", "js/b.js", "js/main.js"]);
        assert_eq!(bundle.code.matches("var shared").count(), 1);
    }

    #[test]
    fn test_index_fallback_and_reexport() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "js/main.js", "export * from './lib';\nexport { x } from './lib/x.js';\n");
        write(root, "js/lib/index.js", "export default function lib() {}\n");
        write(root, "js/lib/x.js", "const x = 1;\nexport { x };\n");

        let bundle = bundle_at(root).unwrap();
        assert_eq!(bundle.modules, ["js/lib/index.js", "js/lib/x.js", "js/main.js"]);
        assert!(bundle.code.contains("function lib() {}"));
        assert!(!bundle.code.contains("export"));
    }

    #[test]
    fn test_cycle() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "js/main.js", "import './a.js';\n");
        write(root, "js/a.js", "import './b.js';\n");
        write(root, "js/b.js", "import './a.js';\n");

        let err = bundle_at(root).unwrap_err();
        assert_eq!(err.to_string(), "module cycle: js/a.js -> js/b.js -> js/a.js");
    }

    #[test]
    fn test_unresolved() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "js/main.js", "import './missing.js';\n");

        let err = bundle_at(root).unwrap_err();
        assert!(
            matches!(err, AssetError::Unresolved { ref specifier, ref importer }
                if specifier == "./missing.js" && importer == Path::new("js/main.js"))
        );
    }

    #[test]
    fn test_bare_specifier() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "js/main.js", "import { h } from 'preact';\n");
        assert!(matches!(bundle_at(root).unwrap_err(), AssetError::BareSpecifier { .. }));
    }

    #[test]
    fn test_syntax_error_names_module() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "js/main.js", "import './bad.js';\n");
        write(root, "js/bad.js", "function (\n");

        let err = bundle_at(root).unwrap_err();
        assert!(matches!(err, AssetError::Syntax { ref path, .. } if path == Path::new("js/bad.js")));
    }

    #[test]
    fn test_renamed_import_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "js/main.js", "import { a as b } from './a.js';\n");
        write(root, "js/a.js", "export const a = 1;\n");
        assert!(matches!(bundle_at(root).unwrap_err(), AssetError::Unsupported { .. }));

        write(root, "js/main.js", "import a from './a.js';\n");
        assert!(matches!(bundle_at(root).unwrap_err(), AssetError::Unsupported { .. }));

        write(root, "js/main.js", "import * as ns from './a.js';\n");
        assert!(matches!(bundle_at(root).unwrap_err(), AssetError::Unsupported { .. }));

        write(root, "js/main.js", "const b = 1;\nexport { b as c };\n");
        assert!(matches!(bundle_at(root).unwrap_err(), AssetError::Unsupported { .. }));
    }

    #[test]
    fn test_import_with_trailing_comment() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "js/main.js", "import { a } from './a.js'; // helper\nconsole.log(a);\n");
        write(root, "js/a.js", "export const a = 1;\n");

        let bundle = bundle_at(root).unwrap();
        assert_eq!(bundle.modules, ["js/a.js", "js/main.js"]);
        assert!(bundle.code.contains("// helper"));
        assert!(!bundle.code.contains("import"));
    }

    #[test]
    fn test_compact_import() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "js/main.js", "import{a}from'./a.js';console.log(a);\n");
        write(root, "js/a.js", "export function a() {}\n");

        let bundle = bundle_at(root).unwrap();
        assert_eq!(bundle.modules, ["js/a.js", "js/main.js"]);
        assert!(bundle.code.contains("console.log(a);"));
        assert!(!bundle.code.contains("import"));
    }

    #[test]
    fn test_module_syntax_in_bundle_is_an_error() {
        let code = "(function () {\nimport { a } from './a.js';\n})();\n";
        assert!(matches!(
            check_syntax(code, "js/main.js", SourceType::script()),
            Err(AssetError::Syntax { .. })
        ));
    }

    #[test]
    fn test_cut() {
        assert_eq!(cut("export const a = 1;", &[(0, 7)]), "const a = 1;");
        assert_eq!(cut("abc", &[]), "abc");
    }

    #[test]
    fn test_run_writes_minified_bundle() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "assets/js/main.js", "import { greet } from './greet.js';\ngreet('hi');\n");
        write(root, "assets/js/greet.js", "export function greet(message) {\n  console.log(message);\n}\n");

        let config = crate::config::test_site_config(root, "");
        let ctx = BuildContext::for_config(config);
        let output = run(&ctx).unwrap();

        assert_eq!(output.written, [root.join("public/assets/js/all.min.js")]);
        let code = fs::read_to_string(&output.written[0]).unwrap();
        assert!(code.contains("console.log"));
        assert!(!code.contains("export"));
    }

    #[test]
    fn test_run_without_entry() {
        let dir = TempDir::new().unwrap();
        let ctx = BuildContext::for_config(crate::config::test_site_config(dir.path(), ""));
        assert!(run(&ctx).unwrap().written.is_empty());
    }
}
