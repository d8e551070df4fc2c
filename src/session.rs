//! One command invocation: configuration, logger and the entry store.
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;

use crate::compose::{ComposeOpts, Composer, StepStats};
use crate::config::Config;
use crate::error::{InputError, TreeError};
use crate::logging::Log;
use crate::resources::checksum::sha256_file;
use crate::resources::fs::is_contained;
use crate::tree::{self, EntryKind, EntryStore, SanitizeReport, Sanitizer, SnapshotCodec};

/// Name written into `modifiedBy` when a session updates an entry.
const MODIFIER: &str = "arbor";

/// Shared state for a single command run.
pub struct Session {
    /// Validated configuration.
    pub config: Config,
    /// Logger for output and step recording.
    pub log: Arc<dyn Log>,
    /// The entry store. Use [`Session::store_read`] and
    /// [`Session::store_write`] for access.
    store: Arc<RwLock<EntryStore>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("log", &"<dyn Log>")
            .field("entries", &self.store_read().len())
            .finish()
    }
}

impl Session {
    /// Create a session with an empty store.
    #[must_use]
    pub fn new(config: Config, log: Arc<dyn Log>) -> Self {
        let store = EntryStore::new(config.glyphs.clone());
        Self {
            config,
            log,
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Acquire a shared read lock on the store.
    ///
    /// Recovers from a poisoned lock by taking the inner value.
    pub fn store_read(&self) -> RwLockReadGuard<'_, EntryStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire an exclusive write lock on the store.
    pub fn store_write(&self) -> RwLockWriteGuard<'_, EntryStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parse the configured source and resolve it, replacing the store.
    ///
    /// Returns the number of entries read.
    ///
    /// # Errors
    ///
    /// Returns an input error for a missing source or a bad line, and a
    /// structure error when the tree has no directory to act as root.
    pub fn parse(&self) -> Result<usize, TreeError> {
        let mut store = self.store_write();
        let mut parsed = tree::parse_source(&self.config.source, &self.config.glyphs, self.log.as_ref())?;
        tree::resolve(&mut parsed, self.log.as_ref())?;
        self.log.info(&format!(
            "parsed {} entries, max depth {}",
            parsed.len(),
            parsed.max_depth()
        ));
        *store = parsed;
        Ok(store.len())
    }

    /// Replace the store with the configured snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if no snapshot is configured or it cannot be
    /// decoded.
    pub fn load_snapshot(&self) -> Result<usize, TreeError> {
        let codec = SnapshotCodec::new(self.snapshot_path()?);
        let mut store = self.store_write();
        *store = codec.load(self.config.glyphs.clone())?;
        self.log.info(&format!(
            "loaded {} entries from {}",
            store.len(),
            codec.path().display()
        ));
        Ok(store.len())
    }

    /// Write the store to the configured snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if no snapshot is configured or it cannot be
    /// written.
    pub fn save_snapshot(&self) -> Result<PathBuf, TreeError> {
        let codec = SnapshotCodec::new(self.snapshot_path()?);
        if self.config.dry_run {
            self.log
                .dry_run(&format!("would write snapshot: {}", codec.path().display()));
            return Ok(codec.path().to_path_buf());
        }
        codec.save(&self.store_read())?;
        self.log
            .info(&format!("snapshot written: {}", codec.path().display()));
        Ok(codec.path().to_path_buf())
    }

    /// Write the outcome of [`sanitize`](Self::sanitize) back to the
    /// snapshot.
    ///
    /// Nothing is written when the run repaired nothing. After a
    /// replacement, the repaired store overwrites the snapshot in place so
    /// the `.bak` keeps the pre-replacement contents. Returns the path
    /// written, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if no snapshot is configured or it cannot be
    /// written.
    pub fn save_repairs(&self, report: &SanitizeReport) -> Result<Option<PathBuf>, TreeError> {
        let repaired = SanitizeReport {
            reloaded: false,
            ..*report
        };
        if repaired.is_clean() {
            return Ok(None);
        }
        if !report.reloaded {
            return self.save_snapshot().map(Some);
        }

        let codec = SnapshotCodec::new(self.snapshot_path()?);
        if self.config.dry_run {
            self.log
                .dry_run(&format!("would rewrite snapshot: {}", codec.path().display()));
            return Ok(Some(codec.path().to_path_buf()));
        }
        codec.write_in_place(&self.store_read())?;
        self.log.info(&format!(
            "snapshot rewritten: {} (previous contents kept in {})",
            codec.path().display(),
            codec.backup_path().display()
        ));
        Ok(Some(codec.path().to_path_buf()))
    }

    /// Repair the store, optionally replacing the snapshot with `raw` first.
    ///
    /// # Errors
    ///
    /// Returns an error if the replacement fails or no root can be chosen.
    pub fn sanitize(&self, raw: Option<&[u8]>) -> Result<SanitizeReport, TreeError> {
        let mut sanitizer = Sanitizer::new(self.log.as_ref());
        if let Some(path) = self.config.snapshot.as_deref() {
            sanitizer = sanitizer.with_backing(path);
        }
        let mut store = self.store_write();
        let report = sanitizer.run(&mut store, raw)?;
        if report.is_clean() {
            self.log.debug("sanitize: nothing to repair");
        } else {
            self.log.info(&format!(
                "sanitize: {} dropped, {} inferred, {} reparented{}",
                report.dropped,
                report.inferred,
                report.reparented,
                if report.root_reassigned {
                    ", root reassigned"
                } else {
                    ""
                }
            ));
        }
        Ok(report)
    }

    /// Sanitize, then materialize the store below the configured target.
    ///
    /// # Errors
    ///
    /// Returns an error if no target is configured, sanitizing fails, or
    /// any compose step fails.
    pub fn compose(&self, opts: &ComposeOpts) -> Result<StepStats> {
        let target = self.target_path()?;
        self.sanitize(None)?;
        let store = self.store_read();
        Composer::new(&store, target, self.log.as_ref())
            .dry_run(opts.dry_run || self.config.dry_run)
            .run(opts)
    }

    /// Render the store as a normalized tree diagram.
    #[must_use]
    pub fn render(&self) -> String {
        tree::render(&self.store_read())
    }

    /// Hash every file that exists below the target and store the digest
    /// in its entry.
    ///
    /// Returns the number of entries updated.
    ///
    /// # Errors
    ///
    /// Returns an error if no target is configured or a file cannot be
    /// read.
    pub fn record_checksums(&self) -> Result<usize> {
        let target = self.target_path()?;
        let mut store = self.store_write();
        let files: Vec<_> = store
            .entries()
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .filter_map(|e| store.relative_path(e.id).map(|rel| (e.id, rel)))
            .filter(|(_, rel)| is_contained(rel))
            .map(|(id, rel)| (id, target.join(rel)))
            .filter(|(_, path)| path.is_file())
            .collect();

        let mut updated = 0;
        for (id, path) in files {
            let digest = sha256_file(&path)?;
            if let Some(entry) = store.entry_mut(id)
                && entry.checksum != digest
            {
                entry.checksum = digest;
                entry.touch(MODIFIER);
                updated += 1;
            }
        }
        self.log.info(&format!("recorded {updated} checksums"));
        Ok(updated)
    }

    fn target_path(&self) -> Result<&Path, TreeError> {
        self.config
            .target
            .as_deref()
            .ok_or_else(|| InputError::EmptyPath("target").into())
    }

    fn snapshot_path(&self) -> Result<&Path, TreeError> {
        self.config
            .snapshot
            .as_deref()
            .ok_or_else(|| InputError::EmptyPath("snapshot").into())
    }
}
