//! Git access for the stack cache.
//!
//! Operations that touch the network or mutate a checkout run the `git` binary with
//! inherited stdio so progress streams to the user. Read-only questions about a
//! checkout (is it a repository, which ref is checked out, is the tree clean) are
//! answered with `git2`, re-opening the repository for every query.

use crate::error::{Error, Result};
use git2::{Repository, StatusOptions};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Runs `git` subcommands.
#[derive(Debug, Clone)]
pub struct Git {
    program: PathBuf,
}

impl Git {
    /// Locates `git` on PATH.
    pub fn locate() -> Result<Self> {
        let program = which::which("git")
            .map_err(|_| Error::BinaryNotFound { binary: "git".to_string() })?;
        Ok(Self { program })
    }

    fn run(&self, args: &[&str], cwd: Option<&Path>, stream: bool) -> Result<String> {
        let rendered = args.join(" ");
        debug!("Running git {rendered}");

        let mut command = Command::new(&self.program);
        if let Some(dir) = cwd {
            command.arg("-C").arg(dir);
        }
        command.args(args);

        if stream {
            // git writes progress to stderr; send both streams there so stdout stays clean.
            command.stdout(Stdio::from(std::io::stderr())).stderr(Stdio::inherit());
            let status = command.status().map_err(|e| Error::GitError {
                command: rendered.clone(),
                details: e.to_string(),
            })?;
            if !status.success() {
                return Err(Error::GitError { command: rendered, details: status.to_string() });
            }
            return Ok(String::new());
        }

        let output = command.output().map_err(|e| Error::GitError {
            command: rendered.clone(),
            details: e.to_string(),
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::GitError {
                command: rendered,
                details: if stderr.is_empty() { output.status.to_string() } else { stderr },
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Shallow clone of `reference` (branch or tag) into `dest`.
    pub fn clone_shallow(&self, source: &str, reference: &str, dest: &Path) -> Result<()> {
        let dest = dest.to_string_lossy();
        self.run(&["clone", "--depth", "1", "--branch", reference, source, &dest], None, true)
            .map(|_| ())
    }

    pub fn fetch(&self, repo: &Path) -> Result<()> {
        self.run(&["fetch", "origin"], Some(repo), true).map(|_| ())
    }

    pub fn checkout(&self, repo: &Path, reference: &str) -> Result<()> {
        self.run(&["checkout", reference], Some(repo), true).map(|_| ())
    }

    /// Fast-forward pull; fails on detached heads.
    pub fn pull_ff_only(&self, repo: &Path) -> Result<()> {
        self.run(&["pull", "--ff-only"], Some(repo), true).map(|_| ())
    }

    pub fn reset_hard(&self, repo: &Path) -> Result<()> {
        self.run(&["reset", "--hard", "HEAD"], Some(repo), false).map(|_| ())
    }

    /// Removes untracked files and directories.
    pub fn clean(&self, repo: &Path) -> Result<()> {
        self.run(&["clean", "-fd"], Some(repo), false).map(|_| ())
    }
}

/// Returns true when `dir` holds a git working copy.
pub fn is_repository(dir: &Path) -> bool {
    dir.join(".git").exists() && Repository::open(dir).is_ok()
}

/// Branch name, or short commit id when HEAD is detached.
pub fn current_ref(dir: &Path) -> Result<String> {
    let repo = Repository::open(dir)?;
    let head = repo.head()?;
    if !repo.head_detached()? {
        if let Some(name) = head.shorthand() {
            return Ok(name.to_string());
        }
    }
    let commit = head.peel_to_commit()?;
    let short = commit.as_object().short_id()?;
    Ok(short.as_str().unwrap_or_default().to_string())
}

/// True when HEAD is detached on the commit `reference` resolves to (tag or commit).
pub fn detached_at(dir: &Path, reference: &str) -> Result<bool> {
    let repo = Repository::open(dir)?;
    if !repo.head_detached()? {
        return Ok(false);
    }
    let head = repo.head()?.peel_to_commit()?.id();
    let matched = match repo.revparse_single(reference) {
        Ok(object) => object.peel_to_commit()?.id() == head,
        Err(_) => false,
    };
    Ok(matched)
}

/// Paths with uncommitted changes, untracked files included and ignored files excluded.
pub fn dirty_paths(dir: &Path) -> Result<Vec<String>> {
    let repo = Repository::open(dir)?;
    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false)
        .exclude_submodules(true);
    let statuses = repo.statuses(Some(&mut options))?;
    Ok(statuses
        .iter()
        .filter(|entry| !entry.status().is_ignored())
        .map(|entry| entry.path().unwrap_or("<non-utf8 path>").to_string())
        .collect())
}
