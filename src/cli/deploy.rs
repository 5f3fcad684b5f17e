//! `kiln deploy`: hand the built output to rsync or a pages branch.
//!
//! Both transports shell out; the build itself is done by the caller.

use std::path::Path;

use anyhow::Result;

use super::DeployTarget;
use crate::config::section::{PagesConfig, RsyncConfig};
use crate::config::{ConfigDiagnostics, SiteConfig};
use crate::log;
use crate::utils::exec::Cmd;

pub fn deploy(config: &SiteConfig, target: DeployTarget) -> Result<()> {
    let output = config.output_dir();
    match target {
        DeployTarget::Rsync => {
            let rsync = &config.deploy.rsync;
            let mut diag = ConfigDiagnostics::new();
            rsync.validate(&mut diag);
            diag.into_result()?;

            let cmd = rsync_command(rsync, &output);
            log!("deploy"; "{}", cmd);
            cmd.run()?;
            log!("deploy"; "synced to {}", rsync.target());
        }
        DeployTarget::Pages => {
            let pages = &config.deploy.pages;
            let mut diag = ConfigDiagnostics::new();
            pages.validate(&mut diag);
            diag.into_result()?;

            let remote = resolve_remote(&pages.remote, &config.root)?;
            for cmd in pages_commands(pages, &remote, &output) {
                crate::debug!("deploy"; "{}", cmd);
                cmd.run()?;
            }
            log!("deploy"; "pushed to {} ({})", pages.branch, remote);
        }
    }
    Ok(())
}

/// `rsync -a [--delete] <args> --exclude=<pattern>... <output>/ <target>`
fn rsync_command(rsync: &RsyncConfig, output: &Path) -> Cmd {
    // Trailing slash: sync the directory's contents, not the directory
    let source = format!("{}/", output.display());
    Cmd::new("rsync")
        .arg("-a")
        .arg(if rsync.delete { "--delete" } else { "" })
        .args(&rsync.args)
        .args(rsync.exclude.iter().map(|pattern| format!("--exclude={pattern}")))
        .arg(source)
        .arg(rsync.target())
}

/// A remote name is looked up in the site's repository; URLs and paths are
/// used as given.
fn resolve_remote(remote: &str, root: &Path) -> Result<String> {
    if remote.contains([':', '/']) {
        return Ok(remote.to_string());
    }
    Cmd::new("git")
        .args(["remote", "get-url", remote])
        .cwd(root)
        .stdout()
}

/// Commit the output as a fresh single-commit history and force-push it.
fn pages_commands(pages: &PagesConfig, remote: &str, output: &Path) -> Vec<Cmd> {
    let branch_ref = format!("refs/heads/{}", pages.branch);
    let refspec = format!("HEAD:{branch_ref}");
    let git = || Cmd::new("git").cwd(output);
    vec![
        git().args(["init", "--quiet"]),
        git().args(["symbolic-ref", "HEAD", branch_ref.as_str()]),
        git().args(["add", "--all"]),
        git().args(["commit", "--quiet", "--message", pages.message.as_str()]),
        git().args(["push", "--force", remote, refspec.as_str()]),
    ]
}
