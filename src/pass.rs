//! Render pass slot allocation.
//!
//! Each world configures an ordered list of logical pass names per category.
//! The position in that list decides the renderer-facing file name: index 0
//! maps to the bare category prefix (`deferred`), every later index appends
//! its ordinal (`deferred1`, `deferred2`, ...). Scanning a world directory
//! assigns every shader stage file either to its slot's allocated name or,
//! when the parsed pass name matches no configured slot, to its own original
//! name (pass-through).

use crate::STAGE_EXTENSIONS;
use crate::manifest::WorldManifest;
use anyhow::Context;
use log::info;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// The two renderer pass categories a slot can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassCategory {
    Deferred,
    Composite,
}

impl PassCategory {
    /// Renderer naming prefix for this category.
    pub fn prefix(self) -> &'static str {
        match self {
            PassCategory::Deferred => "deferred",
            PassCategory::Composite => "composite",
        }
    }

    /// Allocated base name for the slot at `ordinal` in this category's
    /// configured list. Index 0 is the canonical unsuffixed slot.
    pub fn allocated_base(self, ordinal: usize) -> String {
        if ordinal == 0 {
            self.prefix().to_string()
        } else {
            format!("{}{}", self.prefix(), ordinal)
        }
    }
}

/// One configured logical render pass and the file names allocated to it.
#[derive(Debug, Clone)]
pub struct PassSlot {
    pub logical_name: String,
    pub category: PassCategory,
    pub ordinal: usize,
    pub allocated_base: String,
    /// Stage suffix (e.g. `.fsh`, `_1.csh`) to the final allocated file name.
    /// Filled in during the directory scan, read-only afterwards.
    pub suffix_allocations: BTreeMap<String, String>,
}

impl PassSlot {
    fn new(logical_name: &str, category: PassCategory, ordinal: usize) -> Self {
        Self {
            logical_name: logical_name.to_string(),
            category,
            ordinal,
            allocated_base: category.allocated_base(ordinal),
            suffix_allocations: BTreeMap::new(),
        }
    }

    fn allocate(&mut self, suffix: &str) -> String {
        let allocated = format!("{}{}", self.allocated_base, suffix);
        self.suffix_allocations
            .insert(suffix.to_string(), allocated.clone());
        allocated
    }
}

/// Splits a shader file into its candidate logical pass name and stage
/// suffix. Returns `None` for files the allocator does not consider.
///
/// Compute stages carry an optional workgroup tag after the first underscore
/// (`Blur_1.csh` is pass `Blur`, suffix `_1.csh`); for every other stage the
/// whole stem is the candidate name and the suffix is the extension.
pub(crate) fn parse_stage(path: &Path) -> Option<(String, String)> {
    let ext = path.extension()?.to_str()?;
    if !STAGE_EXTENSIONS.contains(&ext) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if ext == "csh" {
        let parts: Vec<&str> = stem.split('_').collect();
        let suffix = match parts.get(1) {
            Some(tag) => format!("_{tag}.csh"),
            None => ".csh".to_string(),
        };
        Some((parts[0].to_string(), suffix))
    } else {
        Some((stem.to_string(), format!(".{ext}")))
    }
}

/// One world directory's projection table: its pass slots in configuration
/// order plus the source file to destination name assignments produced by
/// scanning the directory. Immutable once built; watch mode only reads it.
#[derive(Debug, Clone)]
pub struct WorldFolder {
    pub world_dir: String,
    pub deferred_slots: Vec<PassSlot>,
    pub composite_slots: Vec<PassSlot>,
    name_index: HashMap<String, (PassCategory, usize)>,
    pub file_assignments: BTreeMap<PathBuf, String>,
}

impl WorldFolder {
    /// Builds the projection table for `world_dir` from an explicit source
    /// listing. Files with an unrecognized extension are not registered.
    pub fn build(
        world_dir: &str,
        deferred_names: &[String],
        composite_names: &[String],
        listing: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        let deferred_slots = deferred_names
            .iter()
            .enumerate()
            .map(|(i, name)| PassSlot::new(name, PassCategory::Deferred, i))
            .collect::<Vec<_>>();
        let composite_slots = composite_names
            .iter()
            .enumerate()
            .map(|(i, name)| PassSlot::new(name, PassCategory::Composite, i))
            .collect::<Vec<_>>();

        let mut name_index = HashMap::new();
        for slot in deferred_slots.iter().chain(&composite_slots) {
            name_index.insert(slot.logical_name.clone(), (slot.category, slot.ordinal));
        }

        let mut world = Self {
            world_dir: world_dir.to_string(),
            deferred_slots,
            composite_slots,
            name_index,
            file_assignments: BTreeMap::new(),
        };

        for file in listing {
            let Some((candidate, suffix)) = parse_stage(&file) else {
                continue;
            };
            let assigned = match world.name_index.get(&candidate).copied() {
                Some((category, ordinal)) => world.slot_mut(category, ordinal).allocate(&suffix),
                None => match file.file_name() {
                    Some(name) => name.to_string_lossy().into_owned(),
                    None => continue,
                },
            };
            world.file_assignments.insert(file, assigned);
        }

        for slot in world.slots() {
            info!("{}: {} -> {}", world.world_dir, slot.logical_name, slot.allocated_base);
        }

        world
    }

    /// Builds the projection table by listing `shaders_root/<world dir>`.
    /// A missing world directory is a configuration error.
    pub fn scan(shaders_root: &Path, manifest: &WorldManifest) -> anyhow::Result<Self> {
        let dir = shaders_root.join(&manifest.dir);
        let mut listing = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("listing world directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() {
                listing.push(path);
            }
        }
        Ok(Self::build(
            &manifest.dir,
            &manifest.deferred,
            &manifest.composite,
            listing,
        ))
    }

    /// All slots, deferred before composite, in configuration order.
    pub fn slots(&self) -> impl Iterator<Item = &PassSlot> {
        self.deferred_slots.iter().chain(&self.composite_slots)
    }

    pub fn slot_by_name(&self, logical_name: &str) -> Option<&PassSlot> {
        let (category, ordinal) = self.name_index.get(logical_name).copied()?;
        Some(self.slot(category, ordinal))
    }

    /// Destination file name for a source path. Exact path match first; the
    /// watch loop delivers absolute paths while the scan may have recorded
    /// relative ones, so a file name match against the scanned listing is
    /// accepted too. `None` means the file was unknown at scan time.
    pub fn assignment(&self, src: &Path) -> Option<&str> {
        if let Some(assigned) = self.file_assignments.get(src) {
            return Some(assigned);
        }
        let file_name = src.file_name()?;
        self.file_assignments
            .iter()
            .find(|(scanned, _)| scanned.file_name() == Some(file_name))
            .map(|(_, assigned)| assigned.as_str())
    }

    fn slot(&self, category: PassCategory, ordinal: usize) -> &PassSlot {
        match category {
            PassCategory::Deferred => &self.deferred_slots[ordinal],
            PassCategory::Composite => &self.composite_slots[ordinal],
        }
    }

    fn slot_mut(&mut self, category: PassCategory, ordinal: usize) -> &mut PassSlot {
        match category {
            PassCategory::Deferred => &mut self.deferred_slots[ordinal],
            PassCategory::Composite => &mut self.composite_slots[ordinal],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn paths(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn allocated_bases_are_prefix_then_numbered() {
        let world = WorldFolder::build(
            "world0",
            &names(&["A", "B", "C"]),
            &names(&["D", "E"]),
            Vec::new(),
        );
        let deferred: Vec<&str> = world
            .deferred_slots
            .iter()
            .map(|s| s.allocated_base.as_str())
            .collect();
        assert_eq!(deferred, ["deferred", "deferred1", "deferred2"]);
        let composite: Vec<&str> = world
            .composite_slots
            .iter()
            .map(|s| s.allocated_base.as_str())
            .collect();
        assert_eq!(composite, ["composite", "composite1"]);
    }

    #[test]
    fn scenario_world0() {
        let world = WorldFolder::build(
            "world0",
            &names(&["Atmosphere", "Lighting"]),
            &names(&["Combine", "Temporal"]),
            paths(&[
                "world0/Atmosphere.fsh",
                "world0/Lighting.vsh",
                "world0/Combine.csh",
                "world0/unused.csh",
            ]),
        );
        let assigned = |p: &str| world.assignment(Path::new(p)).unwrap();
        assert_eq!(assigned("world0/Atmosphere.fsh"), "deferred.fsh");
        assert_eq!(assigned("world0/Lighting.vsh"), "deferred1.vsh");
        assert_eq!(assigned("world0/Combine.csh"), "composite.csh");
        assert_eq!(assigned("world0/unused.csh"), "unused.csh");
    }

    #[test]
    fn workgroup_tags_stay_distinct() {
        let world = WorldFolder::build(
            "world0",
            &names(&["foo"]),
            &[],
            paths(&["foo_1.csh", "foo_2.csh", "foo.csh"]),
        );
        assert_eq!(world.assignment(Path::new("foo_1.csh")), Some("deferred_1.csh"));
        assert_eq!(world.assignment(Path::new("foo_2.csh")), Some("deferred_2.csh"));
        assert_eq!(world.assignment(Path::new("foo.csh")), Some("deferred.csh"));
        let slot = world.slot_by_name("foo").unwrap();
        assert_eq!(slot.suffix_allocations.len(), 3);
    }

    #[test]
    fn compute_suffix_keeps_only_second_segment() {
        // "Blur_1_hi.csh" parses as pass "Blur" with suffix "_1.csh"; the
        // trailing segment is dropped by the split rule.
        let (candidate, suffix) = parse_stage(Path::new("Blur_1_hi.csh")).unwrap();
        assert_eq!(candidate, "Blur");
        assert_eq!(suffix, "_1.csh");
    }

    #[test]
    fn unrecognized_extensions_are_not_registered() {
        let world = WorldFolder::build(
            "world0",
            &names(&["A"]),
            &[],
            paths(&["A.fsh", "readme.txt", "A.glsl"]),
        );
        assert_eq!(world.file_assignments.len(), 1);
        assert_eq!(world.assignment(Path::new("A.fsh")), Some("deferred.fsh"));
    }

    #[test]
    fn unmatched_names_pass_through() {
        let world = WorldFolder::build(
            "world0",
            &names(&["A"]),
            &names(&["B"]),
            paths(&["world0/Other.fsh", "world0/Other_3.csh"]),
        );
        assert_eq!(world.assignment(Path::new("world0/Other.fsh")), Some("Other.fsh"));
        assert_eq!(
            world.assignment(Path::new("world0/Other_3.csh")),
            Some("Other_3.csh")
        );
    }

    #[test]
    fn assignment_falls_back_to_file_name_match() {
        let world = WorldFolder::build(
            "world0",
            &names(&["A"]),
            &[],
            paths(&["shaders/world0/A.fsh"]),
        );
        // Absolute path from a watch event still resolves to the slot.
        assert_eq!(
            world.assignment(Path::new("/abs/project/shaders/world0/A.fsh")),
            Some("deferred.fsh")
        );
        assert_eq!(world.assignment(Path::new("/abs/project/shaders/world0/new.fsh")), None);
    }
}
