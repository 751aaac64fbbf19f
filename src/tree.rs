//! Full pack tree build.

use crate::manifest::PackManifest;
use crate::pass::WorldFolder;
use crate::{WORLD_DIR_PREFIX, copy, properties};
use anyhow::Context;
use log::debug;
use std::fs;
use std::path::Path;

/// Builds the complete pack under `dest_root`.
///
/// Project files are copied verbatim except the manifest itself; project
/// directories are copied recursively except the shader source directory and
/// the manifest's exclusion list. The shader source directory is then
/// projected: world directories go through their `WorldFolder` assignments,
/// the properties file is rewritten, everything else is copied as-is.
///
/// Re-running against an unchanged source tree is idempotent; destination
/// files are always overwritten, never merged.
pub fn build_tree(
    dest_root: &Path,
    manifest: &PackManifest,
    worlds: &[WorldFolder],
) -> anyhow::Result<()> {
    fs::create_dir_all(dest_root)
        .with_context(|| format!("creating output directory {}", dest_root.display()))?;

    copy_project_root(dest_root, manifest)?;

    let shaders_src = manifest.shaders_source_root();
    let shaders_dest = dest_root.join(&manifest.shaders_dir);
    fs::create_dir_all(&shaders_dest)
        .with_context(|| format!("creating {}", shaders_dest.display()))?;

    for entry in fs::read_dir(&shaders_src)
        .with_context(|| format!("listing shader source root {}", shaders_src.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if path.is_file() {
            if name == manifest.properties_file {
                properties::rewrite_properties(&path, &shaders_dest, worlds)?;
            } else {
                fs::copy(&path, shaders_dest.join(&*name))
                    .with_context(|| format!("copying {}", path.display()))?;
            }
        } else if path.is_dir() {
            if !name.starts_with(WORLD_DIR_PREFIX) {
                copy_dir_recursive(&path, &shaders_dest.join(&*name))?;
            } else if let Some(world) = worlds.iter().find(|w| w.world_dir == name) {
                copy::copy_world(&shaders_dest, world)?;
            } else {
                // World-prefixed but unconfigured: left out of the pack.
                debug!("skipping unconfigured world directory {}", path.display());
            }
        }
    }

    Ok(())
}

fn copy_project_root(dest_root: &Path, manifest: &PackManifest) -> anyhow::Result<()> {
    let project_root = &manifest.project_root;
    for entry in fs::read_dir(project_root)
        .with_context(|| format!("listing project root {}", project_root.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        if path.is_file() {
            if Some(name.as_os_str()) == manifest.manifest_file_name() {
                continue;
            }
            fs::copy(&path, dest_root.join(&name))
                .with_context(|| format!("copying {}", path.display()))?;
        } else if path.is_dir() {
            let name = name.to_string_lossy();
            let excluded = name == manifest.shaders_dir
                || manifest.exclude_dirs.iter().any(|d| *d == name);
            if !excluded {
                copy_dir_recursive(&path, &dest_root.join(&*name))?;
            }
        }
    }
    Ok(())
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("creating {}", dest.display()))?;
    for entry in
        fs::read_dir(src).with_context(|| format!("listing {}", src.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let dest = dest.join(entry.file_name());
        if path.is_dir() {
            copy_dir_recursive(&path, &dest)?;
        } else {
            fs::copy(&path, &dest)
                .with_context(|| format!("copying {}", path.display()))?;
        }
    }
    Ok(())
}
