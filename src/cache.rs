//! Stack cache synchronization.
//!
//! A stack ref is cached as a git working copy under `.klabctl/cache/stack/<ref>`.
//! [`StackCache::ensure_available`] observes the on-disk state, plans one action with
//! [`plan`] and carries it out. Any corruption that cannot be repaired in place degrades
//! to deleting the directory and cloning again, at most once per call.

use crate::error::{Error, Result};
use crate::git::{self, Git};
use crate::workspace::{StackLayout, Workspace};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Observed state of a cache directory relative to a requested ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    /// The directory does not exist.
    Missing,
    /// The directory exists but holds no git repository.
    NotARepository,
    /// The checked-out ref could not be determined.
    UnknownRef(String),
    /// The requested ref is checked out.
    OnRequestedRef { valid: bool },
    /// Another ref is checked out.
    OnOtherRef { current: String },
}

/// What to do about an observed [`CacheState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheAction {
    Clone,
    Reclone(String),
    Use,
    Repair,
    Switch { from: String },
}

/// Chooses the action for a state. Pure, so every transition is testable without git.
pub fn plan(state: &CacheState) -> CacheAction {
    match state {
        CacheState::Missing => CacheAction::Clone,
        CacheState::NotARepository => {
            CacheAction::Reclone("cache is not a git repository".to_string())
        }
        CacheState::UnknownRef(reason) => {
            CacheAction::Reclone(format!("cannot determine cache ref: {reason}"))
        }
        CacheState::OnRequestedRef { valid: true } => CacheAction::Use,
        CacheState::OnRequestedRef { valid: false } => CacheAction::Repair,
        CacheState::OnOtherRef { current } => CacheAction::Switch { from: current.clone() },
    }
}

/// Outcome of [`StackCache::ensure_available`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The cache was already valid; nothing was changed.
    Reused,
    Cloned,
    Repaired,
    Switched,
    /// The cache was deleted and cloned again.
    Recloned,
}

/// A stack repository cached at one ref.
#[derive(Debug, Clone)]
pub struct StackCache {
    git: Git,
    workspace: Workspace,
    source: String,
    r#ref: String,
}

impl StackCache {
    pub fn new(git: Git, workspace: Workspace, source: &str, r#ref: &str) -> Self {
        Self { git, workspace, source: source.to_string(), r#ref: r#ref.to_string() }
    }

    pub fn dir(&self) -> PathBuf {
        self.workspace.stack_cache_dir(&self.r#ref)
    }

    pub fn layout(&self) -> StackLayout {
        StackLayout::new(self.dir())
    }

    /// Clean working tree and all required stack directories present.
    pub fn is_valid(&self) -> bool {
        let dir = self.dir();
        if !git::is_repository(&dir) {
            return false;
        }
        match git::dirty_paths(&dir) {
            Ok(dirty) if dirty.is_empty() => {}
            Ok(dirty) => {
                debug!("Cache has {} modified path(s): {}", dirty.len(), dirty.join(", "));
                return false;
            }
            Err(e) => {
                debug!("Cache status check failed: {e}");
                return false;
            }
        }
        self.layout().required_dirs().iter().all(|p| p.is_dir())
    }

    /// Looks at the cache directory without changing it.
    pub fn inspect(&self) -> CacheState {
        let dir = self.dir();
        if !dir.exists() {
            return CacheState::Missing;
        }
        if !git::is_repository(&dir) {
            return CacheState::NotARepository;
        }
        let current = match git::current_ref(&dir) {
            Ok(current) => current,
            Err(e) => return CacheState::UnknownRef(e.to_string()),
        };
        if self.is_requested(&dir, &current) {
            CacheState::OnRequestedRef { valid: self.is_valid() }
        } else {
            CacheState::OnOtherRef { current }
        }
    }

    fn is_requested(&self, dir: &Path, current: &str) -> bool {
        if current == self.r#ref {
            return true;
        }
        // A tag or commit checkout leaves HEAD detached on the resolved commit.
        matches!(git::detached_at(dir, &self.r#ref), Ok(true))
    }

    /// Makes sure the requested ref is cached, valid and checked out.
    pub fn ensure_available(&self, force: bool) -> Result<Outcome> {
        self.workspace.ensure_klabctl_dir()?;
        let dir = self.dir();

        if force && dir.exists() {
            info!("Force re-pulling stack...");
            if let Err(e) = fs::remove_dir_all(&dir) {
                warn!("failed to remove cache: {e}");
            }
        }

        let state = self.inspect();
        debug!("Cache {} is {:?}", dir.display(), state);

        match plan(&state) {
            CacheAction::Clone => {
                self.clone_fresh()?;
                Ok(Outcome::Cloned)
            }
            CacheAction::Reclone(reason) => self.reclone(&reason),
            CacheAction::Use => {
                info!("✓ Using cached stack {}", self.r#ref);
                Ok(Outcome::Reused)
            }
            CacheAction::Repair => {
                warn!("Cache is corrupted or has modifications");
                self.repair_or_reclone(Outcome::Repaired)
            }
            CacheAction::Switch { from } => {
                info!("Switching cache from {} to {}...", from, self.r#ref);
                if let Err(e) = self.switch() {
                    return self.reclone(&format!("version switch failed: {e}"));
                }
                if self.is_valid() {
                    info!("✓ Cache switched and validated");
                    return Ok(Outcome::Switched);
                }
                warn!("Cache invalid after version switch");
                self.repair_or_reclone(Outcome::Switched)
            }
        }
    }

    fn repair_or_reclone(&self, outcome: Outcome) -> Result<Outcome> {
        match self.repair() {
            Ok(()) if self.is_valid() => {
                info!("✓ Using cached stack {}", self.r#ref);
                Ok(outcome)
            }
            Ok(()) => self.reclone("cache still invalid after repair"),
            Err(e) => self.reclone(&format!("repair failed: {e}")),
        }
    }

    fn repair(&self) -> Result<()> {
        info!("🔧 Repairing cache...");
        let dir = self.dir();
        self.git.reset_hard(&dir)?;
        self.git.clean(&dir)?;
        info!("✓ Cache repaired");
        Ok(())
    }

    fn switch(&self) -> Result<()> {
        let dir = self.dir();
        info!("Fetching updates...");
        self.git.fetch(&dir)?;
        self.git.checkout(&dir, &self.r#ref)?;
        // Tags and commits leave a detached HEAD, which cannot be pulled.
        if let Err(e) = self.git.pull_ff_only(&dir) {
            debug!("Ignoring pull failure: {e}");
        }
        Ok(())
    }

    fn reclone(&self, reason: &str) -> Result<Outcome> {
        warn!("{reason}");
        warn!("Re-pulling stack...");
        let dir = self.dir();
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| {
                Error::CacheError(format!("failed to remove invalid cache: {e}"))
            })?;
        }
        self.clone_fresh()?;
        Ok(Outcome::Recloned)
    }

    fn clone_fresh(&self) -> Result<()> {
        let dir = self.dir();
        info!("📦 Pulling stack {}@{}...", self.source, self.r#ref);
        if let Some(parent) = dir.parent() {
            fs::create_dir_all(parent)?;
        }
        self.git.clone_shallow(&self.source, &self.r#ref, &dir).map_err(|e| {
            Error::CacheError(format!("failed to pull stack {}@{}: {e}", self.source, self.r#ref))
        })?;
        info!("✓ Stack pulled successfully");
        Ok(())
    }
}

/// Ensures `source@ref` is cached in `workspace` and returns the cache.
pub fn ensure_stack_available(
    workspace: &Workspace,
    source: &str,
    r#ref: &str,
    force: bool,
) -> Result<StackCache> {
    crate::config::validate_stack_ref(r#ref)?;
    let cache = StackCache::new(Git::locate()?, workspace.clone(), source, r#ref);
    cache.ensure_available(force)?;
    Ok(cache)
}
