//! Verbatim copies: `static/` mirrored under `<output>/static/`, and the
//! configured root files (`CNAME`, `favicon.ico`, ...) at the output root.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use jwalk::WalkDir;

use crate::task::{BuildContext, TaskOutput};
use crate::debug;

/// The `static` task.
pub fn run(ctx: &BuildContext) -> Result<TaskOutput> {
    let config = ctx.config();
    let output = config.output_dir();
    let mut written = Vec::new();

    let static_dir = config.root_join(&config.build.static_dir);
    if static_dir.is_dir() {
        let target = output.join(&config.build.static_dir);
        for entry in WalkDir::new(&static_dir).sort(true) {
            let entry = entry.with_context(|| format!("failed to walk {}", static_dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let source = entry.path();
            let rel = source.strip_prefix(&static_dir)?;
            let dest = target.join(rel);
            copy_file(&source, &dest)?;
            written.push(dest);
        }
    }

    for file in &config.build.root_files {
        let source = config.root_join(file);
        if !source.is_file() {
            debug!("static"; "root file {} not found, skipping", file.display());
            continue;
        }
        let Some(name) = source.file_name() else {
            continue;
        };
        let dest = output.join(name);
        copy_file(&source, &dest)?;
        written.push(dest);
    }

    Ok(TaskOutput::with_written(written))
}

fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::copy(source, dest)
        .with_context(|| format!("failed to copy {} to {}", source.display(), dest.display()))?;
    Ok(())
}
