//! Rewriting of `world/PassName` references in the properties file.

use crate::pass::WorldFolder;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Maps logical pass references in one line of properties text to their
/// allocated names. A seam for swapping in stricter matching (e.g. whole
/// path segments) without touching the rewrite plumbing.
pub trait PassNameSubstitution {
    fn apply(&self, line: &mut String, worlds: &[WorldFolder]);
}

/// The shipped substitution: chained literal find-and-replace over the same
/// buffer, world by world, slot by slot (deferred then composite, in
/// configuration order). Order matters: when one logical name is a textual
/// prefix of another, an earlier replacement can eat a later match. That
/// cumulative behavior is kept as-is rather than second-guessed here; see
/// `prefix_collisions_follow_slot_order` below for what it does.
pub struct ChainedLiteralSubstitution;

impl PassNameSubstitution for ChainedLiteralSubstitution {
    fn apply(&self, line: &mut String, worlds: &[WorldFolder]) {
        for world in worlds {
            for slot in world.slots() {
                let from = format!("{}/{}", world.world_dir, slot.logical_name);
                if line.contains(&from) {
                    let to = format!("{}/{}", world.world_dir, slot.allocated_base);
                    *line = line.replace(&from, &to);
                }
            }
        }
    }
}

/// Rewrites `src` into `dest_dir` under the same file name using the default
/// chained substitution.
pub fn rewrite_properties(
    src: &Path,
    dest_dir: &Path,
    worlds: &[WorldFolder],
) -> anyhow::Result<()> {
    rewrite_properties_with(&ChainedLiteralSubstitution, src, dest_dir, worlds)
}

pub fn rewrite_properties_with(
    substitution: &dyn PassNameSubstitution,
    src: &Path,
    dest_dir: &Path,
    worlds: &[WorldFolder],
) -> anyhow::Result<()> {
    let text = fs::read_to_string(src)
        .with_context(|| format!("reading properties file {}", src.display()))?;
    let file_name = src
        .file_name()
        .with_context(|| format!("properties path {} has no file name", src.display()))?;

    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let mut line = line.to_string();
        substitution.apply(&mut line, worlds);
        out.push_str(&line);
    }

    let dest = dest_dir.join(file_name);
    fs::write(&dest, out)
        .with_context(|| format!("writing properties file {}", dest.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::WorldFolder;
    use std::path::PathBuf;
    use tempdir::TempDir;

    fn world(dir: &str, deferred: &[&str], composite: &[&str]) -> WorldFolder {
        WorldFolder::build(
            dir,
            &deferred.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            &composite.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            Vec::<PathBuf>::new(),
        )
    }

    fn substitute(line: &str, worlds: &[WorldFolder]) -> String {
        let mut line = line.to_string();
        ChainedLiteralSubstitution.apply(&mut line, worlds);
        line
    }

    #[test]
    fn rewrites_references_to_allocated_names() {
        let worlds = [world("world0", &["Atmosphere", "Lighting"], &["Combine"])];
        assert_eq!(
            substitute("program.world0/Atmosphere.enabled = true", &worlds),
            "program.world0/deferred.enabled = true"
        );
        assert_eq!(
            substitute("world0/Lighting world0/Combine", &worlds),
            "world0/deferred1 world0/composite"
        );
    }

    #[test]
    fn untouched_text_passes_through() {
        let worlds = [world("world0", &["Atmosphere"], &[])];
        assert_eq!(
            substitute("world1/Atmosphere # other world", &worlds),
            "world1/Atmosphere # other world"
        );
        assert_eq!(substitute("plain line", &worlds), "plain line");
    }

    #[test]
    fn prefix_collisions_follow_slot_order() {
        // "Combine" is replaced before "CombineFinal" is ever looked up, so
        // the longer name is clobbered by the shorter one's allocation. This
        // pins the chained semantics; changing them means swapping in another
        // PassNameSubstitution, not editing this behavior.
        let worlds = [world("world0", &[], &["Combine", "CombineFinal"])];
        assert_eq!(
            substitute("world0/CombineFinal", &worlds),
            "world0/compositeFinal"
        );
    }

    #[test]
    fn round_trips_through_the_filesystem() {
        let tmp = TempDir::new("properties").unwrap();
        let src = tmp.path().join("shaders.properties");
        fs::write(&src, "a = world0/Atmosphere\nkeep = me\n").unwrap();
        let dest_dir = tmp.path().join("out");
        fs::create_dir_all(&dest_dir).unwrap();

        let worlds = [world("world0", &["Atmosphere"], &[])];
        rewrite_properties(&src, &dest_dir, &worlds).unwrap();

        let out = fs::read_to_string(dest_dir.join("shaders.properties")).unwrap();
        assert_eq!(out, "a = world0/deferred\nkeep = me\n");
        assert!(!out.contains("world0/Atmosphere"));
    }
}
