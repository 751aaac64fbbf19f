//! Projection-driven file copying for world directories.

use crate::pass::WorldFolder;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Copies one world file to `dest_dir` under its assigned destination name.
/// Unknown files keep their own name, so the call stays safe for files that
/// appeared after the startup scan. Overwrites unconditionally.
pub fn copy_file(src: &Path, dest_dir: &Path, world: &WorldFolder) -> anyhow::Result<()> {
    let assigned = match world.assignment(src) {
        Some(assigned) => assigned.to_string(),
        None => src
            .file_name()
            .with_context(|| format!("source path {} has no file name", src.display()))?
            .to_string_lossy()
            .into_owned(),
    };
    let dest = dest_dir.join(&assigned);
    fs::copy(src, &dest)
        .with_context(|| format!("copying {} to {}", src.display(), dest.display()))?;
    Ok(())
}

/// Copies every assigned file of a world into `dest_root/<world dir>`,
/// creating the directory first.
pub fn copy_world(dest_root: &Path, world: &WorldFolder) -> anyhow::Result<()> {
    let dest_dir = dest_root.join(&world.world_dir);
    fs::create_dir_all(&dest_dir)
        .with_context(|| format!("creating {}", dest_dir.display()))?;
    for src in world.file_assignments.keys() {
        copy_file(src, &dest_dir, world)?;
    }
    Ok(())
}
