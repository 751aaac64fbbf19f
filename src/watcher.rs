//! Incremental watch mode.
//!
//! Watches the shader source root and re-applies the minimal projection per
//! modified file: world files go through their startup `WorldFolder`
//! assignments, the properties file is rewritten in full, anything else is
//! copied verbatim to the same relative path. The allocation tables are
//! never re-scanned while watching; a file created after startup falls back
//! to pass-through naming until the next full build.

use crate::pass::WorldFolder;
use crate::{copy, properties};
use anyhow::Context;
use log::{error, info};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, channel};

/// Classification of a modified path, decided before any filesystem work so
/// the dispatch logic stays testable without a running watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchedPath {
    /// A file inside a configured world directory; the index points into the
    /// world list the handler was built with.
    World { world: usize, path: PathBuf },
    /// The properties file, anywhere under the source root.
    Properties(PathBuf),
    /// Anything else: copied verbatim, preserving the relative path.
    Passthrough(PathBuf),
}

/// Picks the handling branch for a modified path. The first configured world
/// whose directory name appears as a path component wins.
pub fn classify(path: &Path, properties_file: &str, worlds: &[WorldFolder]) -> WatchedPath {
    for (index, world) in worlds.iter().enumerate() {
        if path
            .components()
            .any(|c| c.as_os_str() == world.world_dir.as_str())
        {
            return WatchedPath::World {
                world: index,
                path: path.to_path_buf(),
            };
        }
    }
    if path.file_name().is_some_and(|name| name == properties_file) {
        WatchedPath::Properties(path.to_path_buf())
    } else {
        WatchedPath::Passthrough(path.to_path_buf())
    }
}

/// Applies the per-file projection for watch events. Holds read-only world
/// tables; all mutation goes to the destination tree.
pub struct WatchHandler {
    src_root: PathBuf,
    dest_root: PathBuf,
    properties_file: String,
    worlds: Arc<Vec<WorldFolder>>,
}

impl WatchHandler {
    pub fn new(
        src_root: PathBuf,
        dest_root: PathBuf,
        properties_file: String,
        worlds: Arc<Vec<WorldFolder>>,
    ) -> Self {
        Self {
            src_root,
            dest_root,
            properties_file,
            worlds,
        }
    }

    /// Handles one modified file.
    ///
    /// A failed world-file copy is logged and swallowed so one bad file never
    /// ends the session. Properties and pass-through failures return an
    /// error: they indicate a structural problem (unreadable source,
    /// missing destination directory) the operator has to fix.
    pub fn handle_modified(&self, path: &Path) -> anyhow::Result<()> {
        match classify(path, &self.properties_file, &self.worlds) {
            WatchedPath::World { world, path } => {
                let world = &self.worlds[world];
                let dest_dir = self.dest_root.join(&world.world_dir);
                if let Err(err) = copy::copy_file(&path, &dest_dir, world) {
                    error!("failed to copy {}: {err:#}", path.display());
                }
                Ok(())
            }
            WatchedPath::Properties(path) => {
                properties::rewrite_properties(&path, &self.dest_root, &self.worlds)
            }
            WatchedPath::Passthrough(path) => {
                let rel = path.strip_prefix(&self.src_root).with_context(|| {
                    format!(
                        "{} is outside the watched root {}",
                        path.display(),
                        self.src_root.display()
                    )
                })?;
                let dest = self.dest_root.join(rel);
                fs::copy(&path, &dest)
                    .with_context(|| format!("copying {} to {}", path.display(), dest.display()))?;
                Ok(())
            }
        }
    }
}

/// A live watch session over the shader source root.
///
/// The underlying OS watch handle is owned here and released on drop, on
/// every exit path. Events are delivered serially on the watcher's thread
/// and each is handled to completion before the next.
pub struct PackWatcher {
    _watcher: RecommendedWatcher,
    errors: Mutex<Receiver<anyhow::Error>>,
}

impl PackWatcher {
    /// Starts watching `shaders_src` recursively, mirroring changes into
    /// `dest_root` (the destination shaders directory).
    pub fn start(
        shaders_src: &Path,
        dest_root: &Path,
        worlds: Arc<Vec<WorldFolder>>,
        properties_file: String,
    ) -> anyhow::Result<Self> {
        // Canonicalize so event paths and the relative-path computation for
        // pass-through copies agree.
        let src_root = fs::canonicalize(shaders_src)
            .with_context(|| format!("resolving shader source root {}", shaders_src.display()))?;
        let handler = WatchHandler::new(
            src_root.clone(),
            dest_root.to_path_buf(),
            properties_file,
            worlds,
        );

        let (error_tx, error_rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(event) => event,
                    Err(err) => {
                        let _ = error_tx.send(anyhow::Error::new(err).context("watch backend"));
                        return;
                    }
                };
                if !matches!(event.kind, EventKind::Modify(_)) {
                    return;
                }
                for path in &event.paths {
                    if !path.is_file() {
                        continue;
                    }
                    info!("{} modified", path.display());
                    if let Err(err) = handler.handle_modified(path) {
                        let _ = error_tx.send(err);
                    }
                }
            },
            Config::default(),
        )?;
        watcher.watch(&src_root, RecursiveMode::Recursive)?;
        info!("watching {}", src_root.display());

        Ok(Self {
            _watcher: watcher,
            errors: Mutex::new(error_rx),
        })
    }

    /// Blocks until the session fails with a non-isolated error. Returns
    /// that error; per-file world copy failures never surface here.
    pub fn wait(&self) -> anyhow::Result<()> {
        match self.errors.lock().recv() {
            Ok(err) => Err(err),
            // Sender gone means the watcher backend shut down.
            Err(_) => Ok(()),
        }
    }

    /// Ends the session and releases the OS watch handle.
    pub fn stop(self) {
        drop(self);
    }
}
