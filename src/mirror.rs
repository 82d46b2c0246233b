//! Local git mirrors of gists.
//!
//! Every item is cloned into its own `path`. Cloning an item whose directory
//! and files are all present is a no-op. [`Mirror::clone_all`] clones a batch
//! concurrently and reports one [`CloneOutcome`] per input item.

use crate::error::GistError;
use crate::types::{File, Item};
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

impl File {
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Item {
    /// True when the mirror directory and every file in it are present.
    pub fn exists(&self) -> bool {
        self.path.is_dir() && self.files.iter().all(File::exists)
    }
}

/// Fetches a remote gist into `<workdir>/<name>`.
///
/// Implementations receive the working directory explicitly and must not
/// change the process's current directory.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str, workdir: &Path, name: &str) -> Result<(), GistError>;
}

/// Runs `git clone` in the directory that will hold the mirror.
#[derive(Debug, Clone, Default)]
pub struct GitFetcher;

impl Fetcher for GitFetcher {
    fn fetch(&self, url: &str, workdir: &Path, name: &str) -> Result<(), GistError> {
        let output = Command::new("git")
            .arg("clone")
            .arg("--quiet")
            .arg(url)
            .arg(name)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| GistError::spawn("git", e))?;
        if !output.status.success() {
            #[cfg(feature = "logging")]
            tracing::debug!(
                "git clone {} failed: {}",
                url,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        GistError::check_status("git clone", output.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneStatus {
    /// The mirror was already complete.
    Present,
    Cloned,
}

#[derive(Debug)]
pub struct CloneOutcome {
    pub id: String,
    pub result: Result<CloneStatus, GistError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorOptions {
    /// Upper bound on concurrent clones. `None` runs one clone per item.
    pub max_jobs: Option<usize>,
    /// Show a spinner on stderr while a batch runs.
    pub progress: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            max_jobs: None,
            progress: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mirror<F = GitFetcher> {
    fetcher: F,
    options: MirrorOptions,
}

impl Default for Mirror<GitFetcher> {
    fn default() -> Self {
        Self::new()
    }
}

impl Mirror<GitFetcher> {
    pub fn new() -> Self {
        Self::with_fetcher(GitFetcher)
    }
}

impl<F: Fetcher> Mirror<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self {
            fetcher,
            options: MirrorOptions::default(),
        }
    }

    pub fn options(mut self, options: MirrorOptions) -> Self {
        self.options = options;
        self
    }

    /// Makes sure `item` has a complete local mirror.
    ///
    /// A partial mirror is removed and cloned again from `item.url`.
    pub fn clone_item(&self, item: &Item) -> Result<CloneStatus, GistError> {
        if item.exists() {
            #[cfg(feature = "logging")]
            tracing::debug!("Mirror of {} is complete", item.id);
            return Ok(CloneStatus::Present);
        }
        if item.path.exists() {
            fs::remove_dir_all(&item.path).map_err(|e| GistError::io(&item.path, e))?;
        }
        let (workdir, name) = clone_target(&item.path)?;
        fs::create_dir_all(workdir).map_err(|e| GistError::io(workdir, e))?;
        #[cfg(feature = "logging")]
        tracing::debug!("Cloning {} into {}", item.url, item.path.display());
        self.fetcher.fetch(&item.url, workdir, name)?;
        Ok(CloneStatus::Cloned)
    }

    /// Clones every item and waits for all of them.
    ///
    /// Outcomes are returned in input order; a failure of one item does not
    /// stop the others.
    pub fn clone_all(&self, items: &[Item]) -> Vec<CloneOutcome> {
        if items.is_empty() {
            return Vec::new();
        }
        let spinner = self.options.progress.then(|| spinner("Cloning..."));
        #[cfg(feature = "parallel")]
        let outcomes = self.clone_parallel(items);
        #[cfg(not(feature = "parallel"))]
        let outcomes = self.clone_sequential(items);
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        outcomes
    }

    fn outcome(&self, item: &Item) -> CloneOutcome {
        CloneOutcome {
            id: item.id.clone(),
            result: self.clone_item(item),
        }
    }

    fn clone_sequential(&self, items: &[Item]) -> Vec<CloneOutcome> {
        items.iter().map(|item| self.outcome(item)).collect()
    }

    #[cfg(feature = "parallel")]
    fn clone_parallel(&self, items: &[Item]) -> Vec<CloneOutcome> {
        let jobs = self.options.max_jobs.unwrap_or(items.len()).max(1);
        match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => pool.install(|| items.par_iter().map(|item| self.outcome(item)).collect()),
            Err(_e) => {
                #[cfg(feature = "logging")]
                tracing::debug!("Falling back to sequential clones: {}", _e);
                self.clone_sequential(items)
            }
        }
    }
}

/// Splits a mirror path into the directory git runs in and the name it
/// clones to.
fn clone_target(path: &Path) -> Result<(&Path, &str), GistError> {
    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        GistError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "mirror path has no name"),
        )
    })?;
    let workdir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((workdir, name))
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
