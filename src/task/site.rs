//! The site's task graph.
//!
//! ```text
//! content ──┬──► feeds
//!           ├──► sitemap
//!           └──► search
//! robots   scripts   styles   static
//! ```
//!
//! Input patterns come from the config the graph is built with; a change to
//! a directory setting takes effect on the next process start.

use std::path::Path;

use super::{GraphError, Task, TaskGraph, TaskName, TaskRegistry};
use crate::config::SiteConfig;
use crate::{asset, content, generator, search};

pub const CONTENT: &str = "content";
pub const FEEDS: &str = "feeds";
pub const SITEMAP: &str = "sitemap";
pub const SEARCH: &str = "search";
pub const ROBOTS: &str = "robots";
pub const SCRIPTS: &str = "scripts";
pub const STYLES: &str = "styles";
pub const STATIC: &str = "static";

/// Declare every task for `config`.
pub fn registry(config: &SiteConfig) -> TaskRegistry {
    let build = &config.build;
    let templates = glob_dir(&build.templates);
    let assets = glob_dir(&build.assets);

    let mut render = Task::new(CONTENT, content::run);
    for dir in [build.posts_dir(), build.pages_dir()] {
        for ext in content::source::EXTENSIONS {
            render = render.input(format!("{}/**/*.{ext}", glob_dir(&dir)));
        }
    }
    let render = render
        .input(format!("{templates}/**/*.html"))
        .output("**/index.html")
        .output("404.html");

    let mut registry = TaskRegistry::new();
    registry
        .register(render)
        .register(
            Task::new(FEEDS, generator::feed::run)
                .after(CONTENT)
                .output(glob_file(&build.feed.rss))
                .output(glob_file(&build.feed.atom))
                .output(format!("**/{}", glob_file(&build.feed.rss)))
                .output(format!("**/{}", glob_file(&build.feed.atom))),
        )
        .register(
            Task::new(SITEMAP, generator::sitemap::run)
                .after(CONTENT)
                .output(glob_file(&build.sitemap.path)),
        )
        .register(
            Task::new(SEARCH, search::run)
                .after(CONTENT)
                .output(glob_file(&build.search.path))
                .output(glob_file(&build.search.script)),
        )
        .register(
            Task::new(ROBOTS, generator::robots::run)
                .input(format!("{templates}/{}", generator::robots::TEMPLATE))
                .output(generator::robots::TEMPLATE),
        )
        .register(
            Task::new(SCRIPTS, asset::bundle::run)
                .input(format!("{assets}/**/*.js"))
                .input(format!("{assets}/**/*.mjs"))
                .output(glob_file(&build.scripts.output)),
        )
        .register(
            Task::new(STYLES, asset::style::run)
                .input(format!("{assets}/**/*.scss"))
                .input(format!("{assets}/**/*.sass"))
                .input(format!("{assets}/**/*.css"))
                .output(glob_file(&build.styles.output)),
        );

    let mut copy = Task::new(STATIC, asset::copy::run)
        .input(format!("{}/**", glob_dir(&build.static_dir)))
        .output(format!("{}/**", glob_dir(&build.static_dir)));
    for file in &build.root_files {
        copy = copy.input(glob_file(file)).output(glob_file(file));
    }
    registry.register(copy);

    registry
}

/// Output patterns written by every task except `content`, with their owner.
pub fn reserved_outputs(config: &SiteConfig) -> Vec<(TaskName, String)> {
    registry(config)
        .tasks
        .into_iter()
        .filter(|task| task.name.as_str() != CONTENT)
        .flat_map(|task| {
            let owner = task.name;
            task.outputs.into_iter().map(move |p| (owner.clone(), p))
        })
        .collect()
}

/// Build the validated graph for `config`.
pub fn graph(config: &SiteConfig) -> Result<TaskGraph, GraphError> {
    TaskGraph::build(registry(config))
}

/// Relative directory as a glob prefix with `/` separators.
fn glob_dir(dir: &Path) -> String {
    let dir = glob_file(dir);
    match dir.trim_end_matches('/') {
        "" | "." => "**".to_string(),
        trimmed => trimmed.trim_start_matches("./").to_string(),
    }
}

fn glob_file(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_default_graph_builds() {
        let config = test_parse_config("");
        let graph = graph(&config).unwrap();
        let order: Vec<_> = graph.topo_order().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            order,
            [CONTENT, FEEDS, SITEMAP, SEARCH, ROBOTS, SCRIPTS, STYLES, STATIC]
        );
    }

    #[test]
    fn test_dependents_of_content() {
        let graph = graph(&test_parse_config("")).unwrap();
        let dependents: Vec<_> = graph
            .dependents(CONTENT)
            .into_iter()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(dependents, [FEEDS, SITEMAP, SEARCH]);
    }

    #[test]
    fn test_inputs_follow_config() {
        let config = test_parse_config("[build]\ncontent = \"src\"\nassets = \"./web\"");
        let graph = graph(&config).unwrap();
        let content = graph.get(CONTENT).unwrap();
        assert_eq!(content.inputs[0], "src/posts/**/*.md");
        assert_eq!(content.inputs[1], "src/posts/**/*.markdown");
        assert_eq!(content.inputs[2], "src/pages/**/*.md");
        assert_eq!(graph.get(SCRIPTS).unwrap().inputs[0], "web/**/*.js");
    }

    #[test]
    fn test_root_files_are_static_outputs() {
        let config = test_parse_config("[build]\nroot_files = [\"CNAME\"]");
        let graph = graph(&config).unwrap();
        let copy = graph.get(STATIC).unwrap();
        assert_eq!(copy.outputs, ["static/**", "CNAME"]);
    }

    #[test]
    fn test_output_collision_rejected() {
        let config = test_parse_config("[build.sitemap]\npath = \"search.json\"");
        assert!(matches!(graph(&config), Err(GraphError::OutputConflict { .. })));
    }

    #[test]
    fn test_static_dir_over_bundles_rejected() {
        let config = test_parse_config("[build]\nstatic_dir = \"assets\"");
        assert!(matches!(
            graph(&config),
            Err(GraphError::OutputConflict { second, .. }) if second.as_str() == STATIC
        ));
    }

    #[test]
    fn test_reserved_outputs_exclude_content() {
        let config = test_parse_config("");
        let reserved = reserved_outputs(&config);
        assert!(reserved.iter().all(|(owner, _)| owner.as_str() != CONTENT));
        assert!(reserved.contains(&(STATIC.into(), "static/**".to_string())));
        assert!(reserved.contains(&(SITEMAP.into(), "sitemap.xml".to_string())));
    }

    #[test]
    fn test_glob_dir() {
        assert_eq!(glob_dir(Path::new("content/posts")), "content/posts");
        assert_eq!(glob_dir(Path::new("./assets/")), "assets");
        assert_eq!(glob_dir(Path::new(".")), "**");
    }
}
