//! Pack manifest loading and validation.
//!
//! The manifest (`shaderpack.toml` by convention) names the project layout
//! and, per world directory, the ordered deferred and composite pass lists
//! that drive slot allocation:
//!
//! ```toml
//! [[world]]
//! dir = "world0"
//! deferred = ["Atmosphere", "Lighting"]
//! composite = ["Combine", "Temporal", "BloomDownsample", "BlurH", "BlurV", "Grade"]
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("duplicate world directory {0:?}")]
    DuplicateWorld(String),
    #[error("duplicate pass name {name:?} in world {world:?}")]
    DuplicatePassName { world: String, name: String },
}

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_shaders_dir() -> String {
    "shaders".to_string()
}

fn default_properties_file() -> String {
    crate::DEFAULT_PROPERTIES_FILE.to_string()
}

fn default_exclude_dirs() -> Vec<String> {
    [".git", ".vscode", "target"].map(str::to_string).to_vec()
}

/// Top-level manifest contents.
#[derive(Debug, Clone, Deserialize)]
pub struct PackManifest {
    /// Where the manifest was loaded from. Its file name is excluded from the
    /// project copy.
    #[serde(skip)]
    pub manifest_path: PathBuf,
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,
    #[serde(default = "default_shaders_dir")]
    pub shaders_dir: String,
    #[serde(default = "default_properties_file")]
    pub properties_file: String,
    /// Top-level directories never copied into the pack, in addition to the
    /// shader source directory itself.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    #[serde(rename = "world", default)]
    pub worlds: Vec<WorldManifest>,
}

/// One configured world directory with its ordered pass name lists.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldManifest {
    pub dir: String,
    #[serde(default)]
    pub deferred: Vec<String>,
    #[serde(default)]
    pub composite: Vec<String>,
}

impl PackManifest {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        fn load_inner(path: &Path) -> anyhow::Result<PackManifest> {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading manifest {}", path.display()))?;
            let mut manifest = PackManifest::parse(&text)?;
            manifest.manifest_path = path.to_path_buf();
            Ok(manifest)
        }
        load_inner(path.as_ref())
    }

    /// Parses and validates manifest text.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let manifest: PackManifest = toml::from_str(text).context("invalid manifest TOML")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Shader source root: `project_root/shaders_dir`.
    pub fn shaders_source_root(&self) -> PathBuf {
        self.project_root.join(&self.shaders_dir)
    }

    /// File name of the manifest itself, for exclusion from the project copy.
    pub fn manifest_file_name(&self) -> Option<&std::ffi::OsStr> {
        self.manifest_path.file_name()
    }

    fn validate(&self) -> Result<(), Error> {
        let mut dirs = HashSet::new();
        for world in &self.worlds {
            if !dirs.insert(world.dir.as_str()) {
                return Err(Error::DuplicateWorld(world.dir.clone()));
            }
            // Logical names share one namespace across both categories.
            let mut seen = HashSet::new();
            for name in world.deferred.iter().chain(&world.composite) {
                if !seen.insert(name.as_str()) {
                    return Err(Error::DuplicatePassName {
                        world: world.dir.clone(),
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
