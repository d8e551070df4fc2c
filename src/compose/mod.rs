//! Materializes a resolved store on disk.
//!
//! Every step is idempotent: an entry whose target path already exists is
//! counted as already ok and never rewritten.
mod processing;

pub use processing::{ProcessOpts, StepStats, process_resources};

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::logging::{Log, StepStatus};
use crate::resources::chmod::PermissionResource;
use crate::resources::checksum::ChecksumResource;
use crate::resources::directory::DirectoryResource;
use crate::resources::fs::is_contained;
use crate::resources::file::FileResource;
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Applicable as _, Resource as _, ResourceChange, ResourceState};
use crate::tree::{Entry, EntryKind, EntryStore};

/// Which entry types a compose run creates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    /// Directories, then files, then symlinks.
    #[default]
    All,
    /// Directories only.
    DirectoriesOnly,
    /// Files and symlinks only; missing parents are still created.
    FilesOnly,
}

/// Options for a full compose run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeOpts {
    /// Entry types to create.
    pub scope: Scope,
    /// Log intended changes without touching the filesystem.
    pub dry_run: bool,
    /// Apply each entry's permission string after creating the tree.
    pub apply_permissions: bool,
    /// Compare recorded checksums against the files on disk.
    pub verify_checksums: bool,
}

/// Turns store entries into filesystem side effects below a base path.
pub struct Composer<'a> {
    store: &'a EntryStore,
    base: &'a Path,
    log: &'a dyn Log,
    dry_run: bool,
}

impl std::fmt::Debug for Composer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("entries", &self.store.len())
            .field("base", &self.base)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl<'a> Composer<'a> {
    /// Create a composer writing below `base`.
    #[must_use]
    pub const fn new(store: &'a EntryStore, base: &'a Path, log: &'a dyn Log) -> Self {
        Self {
            store,
            base,
            log,
            dry_run: false,
        }
    }

    /// Toggle dry-run mode.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Target path of `entry`: the base joined with the names of its
    /// ancestors and itself.
    ///
    /// # Errors
    ///
    /// Fails if the entry is not in the store, or if any name on its path
    /// would lead out of the base (`..`, `.`, an absolute name).
    pub fn target_path(&self, entry: &Entry) -> Result<PathBuf> {
        let Some(rel) = self.store.relative_path(entry.id) else {
            bail!("entry '{}' is not in the store", entry.name);
        };
        if !is_contained(&rel) {
            bail!(
                "refusing to compose '{}': it leads out of {}",
                rel.display(),
                self.base.display()
            );
        }
        Ok(self.base.join(rel))
    }

    /// Run every step selected by `opts`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is inconsistent or any step fails.
    pub fn run(&self, opts: &ComposeOpts) -> Result<StepStats> {
        let mut total = self.make_tree(opts.scope)?;
        if opts.apply_permissions {
            total += self.step("Ensure permissions", || self.ensure_permissions())?;
        }
        if opts.verify_checksums {
            total += self.step("Verify checksums", || self.ensure_checksums())?;
        }
        Ok(total)
    }

    /// Create directories, then files, then symlinks, as limited by `scope`.
    ///
    /// # Errors
    ///
    /// Refuses to run while the store has unresolved types, duplicate
    /// identities or dangling parents; otherwise fails on the first entry
    /// that cannot be created.
    pub fn make_tree(&self, scope: Scope) -> Result<StepStats> {
        self.store.check_consistency()?;

        let mut total = StepStats::new();
        if scope != Scope::FilesOnly {
            total += self.step("Make directories", || self.make_directories())?;
        }
        if scope != Scope::DirectoriesOnly {
            total += self.step("Make files", || self.make_files())?;
            total += self.step("Make symlinks", || self.make_symlinks())?;
        }
        Ok(total)
    }

    /// Create every directory entry that does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first directory that cannot be created.
    pub fn make_directories(&self) -> Result<StepStats> {
        let resources = self
            .targets(EntryKind::Directory)?
            .into_iter()
            .map(|(_, path)| DirectoryResource::new(path));
        process_resources(self.log, self.dry_run, resources, &ProcessOpts::create_missing("create"))
    }

    /// Create every file entry that does not exist yet, as an empty file.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first file that cannot be created.
    pub fn make_files(&self) -> Result<StepStats> {
        let resources = self
            .targets(EntryKind::File)?
            .into_iter()
            .map(|(_, path)| FileResource::new(path));
        process_resources(self.log, self.dry_run, resources, &ProcessOpts::create_missing("create"))
    }

    /// Create every symlink entry that does not exist yet, using the
    /// entry's origin line as link text.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first link that cannot be created.
    pub fn make_symlinks(&self) -> Result<StepStats> {
        let resources = self
            .targets(EntryKind::Symlink)?
            .into_iter()
            .map(|(entry, path)| SymlinkResource::new(PathBuf::from(&entry.origin_name), path));
        process_resources(self.log, self.dry_run, resources, &ProcessOpts::create_missing("link"))
    }

    /// Apply each entry's permission string to its existing target.
    ///
    /// Symlinks and entries whose target is missing are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable permission string or a failed
    /// chmod.
    pub fn ensure_permissions(&self) -> Result<StepStats> {
        let resources = self
            .store
            .entries()
            .iter()
            .filter(|e| e.kind != EntryKind::Symlink)
            .map(|e| {
                self.target_path(e)
                    .map(|path| PermissionResource::new(path, e.permissions.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        process_resources(self.log, self.dry_run, resources, &ProcessOpts::apply_all("chmod"))
    }

    /// Compare each recorded file checksum with the file on disk.
    ///
    /// Entries without a recorded checksum are ignored; missing files are
    /// skipped.
    ///
    /// # Errors
    ///
    /// A mismatch is an error, in dry-run mode too.
    pub fn ensure_checksums(&self) -> Result<StepStats> {
        let mut stats = StepStats::new();
        for (entry, path) in self.targets(EntryKind::File)? {
            if !entry.has_checksum() {
                continue;
            }
            let resource = ChecksumResource::new(path, entry.checksum.clone());
            match resource.current_state()? {
                ResourceState::Correct => stats.already_ok += 1,
                ResourceState::Incorrect { current } => bail!(
                    "checksum mismatch for {}: expected {}, found {current}",
                    resource.description(),
                    entry.checksum
                ),
                ResourceState::Missing | ResourceState::Invalid { .. } => {
                    self.log
                        .debug(&format!("skipping {}: nothing to verify", resource.description()));
                    stats.skipped += 1;
                }
            }
        }
        Ok(stats)
    }

    /// Entries of `kind` in store order, paired with their target path.
    fn targets(&self, kind: EntryKind) -> Result<Vec<(&'a Entry, PathBuf)>> {
        self.store
            .entries()
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| self.target_path(e).map(|path| (e, path)))
            .collect()
    }

    /// Run one named step, logging and recording its outcome.
    fn step(&self, name: &str, f: impl FnOnce() -> Result<StepStats>) -> Result<StepStats> {
        self.log.stage(name);
        match f() {
            Ok(stats) => {
                let summary = stats.summary(self.dry_run);
                self.log.info(&summary);
                let status = if self.dry_run {
                    StepStatus::DryRun
                } else {
                    StepStatus::Ok
                };
                self.log.record_step(name, status, Some(&summary));
                Ok(stats)
            }
            Err(e) => {
                self.log
                    .record_step(name, StepStatus::Failed, Some(&format!("{e:#}")));
                Err(e)
            }
        }
    }
}

/// Apply a permission string (`rwxr-xr-x` or octal `755`) to `path`.
///
/// # Errors
///
/// Returns an error for an unparsable permission string or a failed chmod.
pub fn set_permissions(path: &Path, permissions: &str) -> Result<ResourceChange> {
    PermissionResource::new(path.to_path_buf(), permissions.to_string()).apply()
}
