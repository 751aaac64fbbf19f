//! Shader pack assembly with deterministic render pass slot allocation.
//!
//! A shader pack source tree names its pass files after what they do
//! ("Atmosphere", "BloomDownsample"), but the renderer only loads files
//! following its fixed naming convention ("deferred", "deferred1",
//! "composite", ...). This crate builds the distributable pack tree from the
//! source tree: ordinary files are copied verbatim, world directories have
//! their pass files renamed according to the configured pass order, and the
//! `shaders.properties` file has its `world/PassName` references rewritten to
//! the allocated names. A watch mode keeps a built tree in sync as individual
//! source files change.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use shaderpack_build::{PackManifest, PackWatcher, WorldFolder, build_tree};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! fn main() -> anyhow::Result<()> {
//!     let manifest = PackManifest::load("shaderpack.toml")?;
//!     let shaders_root = manifest.shaders_source_root();
//!
//!     let worlds: Vec<WorldFolder> = manifest
//!         .worlds
//!         .iter()
//!         .map(|world| WorldFolder::scan(&shaders_root, world))
//!         .collect::<anyhow::Result<_>>()?;
//!
//!     let out = Path::new("../pack-build");
//!     build_tree(out, &manifest, &worlds)?;
//!
//!     // Optional: keep the output in sync until the session fails or the
//!     // process is interrupted.
//!     let watcher = PackWatcher::start(
//!         &shaders_root,
//!         &out.join(&manifest.shaders_dir),
//!         Arc::new(worlds),
//!         manifest.properties_file.clone(),
//!     )?;
//!     watcher.wait()
//! }
//! ```

pub mod copy;
pub mod manifest;
pub mod pass;
pub mod properties;
pub mod tree;
pub mod watcher;

pub use copy::{copy_file, copy_world};
pub use manifest::{PackManifest, WorldManifest};
pub use pass::{PassCategory, PassSlot, WorldFolder};
pub use properties::{ChainedLiteralSubstitution, PassNameSubstitution, rewrite_properties};
pub use tree::build_tree;
pub use watcher::{PackWatcher, WatchHandler, WatchedPath};

/// File name of the properties file rewritten during a build, unless the
/// manifest overrides it.
pub const DEFAULT_PROPERTIES_FILE: &str = "shaders.properties";

/// Prefix identifying world directories under the shader source root.
pub const WORLD_DIR_PREFIX: &str = "world";

/// Extensions of files the pass allocator considers. Anything else is copied
/// opaquely by the tree build.
pub const STAGE_EXTENSIONS: [&str; 4] = ["csh", "gsh", "vsh", "fsh"];
