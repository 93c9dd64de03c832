//! Test-only helpers: seeded random trees and a tree-equality oracle.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use walkdir::WalkDir;

/// Shape knobs for [`generate_random_tree`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpecRandomTree {
    pub(crate) seed: u64,
    pub(crate) n_files_max: usize,
    pub(crate) n_dirs_max: usize,
    pub(crate) depth_max: usize,
}

impl Default for SpecRandomTree {
    fn default() -> Self {
        Self {
            seed: 0,
            n_files_max: 4,
            n_dirs_max: 3,
            depth_max: 3,
        }
    }
}

/// Populate `path_root` with a deterministic pseudo-random tree.
///
/// Returns the number of files written.
pub(crate) fn generate_random_tree(path_root: &Path, spec_tree: SpecRandomTree) -> usize {
    let mut rng = StdRng::seed_from_u64(spec_tree.seed);
    fs::create_dir_all(path_root).expect("create random tree root");

    let mut n_files = 0;
    let mut l_pending: Vec<(PathBuf, usize)> = vec![(path_root.to_path_buf(), 0)];
    while let Some((path_dir, n_depth)) = l_pending.pop() {
        for n_idx in 0..rng.gen_range(0..=spec_tree.n_files_max) {
            let name = format!("f{n_idx}_{:06x}.bin", rng.gen_range(0..0x0100_0000_u32));
            let mut raw_content = vec![0_u8; rng.gen_range(0..2048)];
            rng.fill(&mut raw_content[..]);
            fs::write(path_dir.join(name), raw_content).expect("write random file");
            n_files += 1;
        }

        if n_depth >= spec_tree.depth_max {
            continue;
        }
        for n_idx in 0..rng.gen_range(0..=spec_tree.n_dirs_max) {
            let name = format!("d{n_idx}_{:06x}", rng.gen_range(0..0x0100_0000_u32));
            let path_sub = path_dir.join(name);
            fs::create_dir(&path_sub).expect("create random dir");
            l_pending.push((path_sub, n_depth + 1));
        }
    }
    n_files
}

fn collect_entries(path_root: &Path) -> BTreeMap<PathBuf, bool> {
    WalkDir::new(path_root)
        .min_depth(1)
        .into_iter()
        .map(|entry_res| {
            let entry = entry_res.expect("walk tree");
            let path_rel = entry
                .path()
                .strip_prefix(path_root)
                .expect("entry under root")
                .to_path_buf();
            (path_rel, entry.file_type().is_dir())
        })
        .collect()
}

/// True when both trees hold the same relative names at every level, every
/// pair of same-named files has identical bytes, and no entry is one-sided
/// or a file/directory mismatch.
pub(crate) fn are_dir_trees_equal(path_left: &Path, path_right: &Path) -> bool {
    let dict_left = collect_entries(path_left);
    let dict_right = collect_entries(path_right);
    if dict_left != dict_right {
        return false;
    }

    dict_left
        .iter()
        .filter(|(_, if_is_dir)| !**if_is_dir)
        .all(|(path_rel, _)| {
            let raw_left = fs::read(path_left.join(path_rel));
            let raw_right = fs::read(path_right.join(path_rel));
            matches!((raw_left, raw_right), (Ok(l), Ok(r)) if l == r)
        })
}

#[cfg(test)]
mod tests {
    use super::{SpecRandomTree, are_dir_trees_equal, generate_random_tree};

    #[test]
    fn random_tree_is_deterministic_per_seed() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let spec_tree = SpecRandomTree {
            seed: 7,
            ..SpecRandomTree::default()
        };
        let n_left = generate_random_tree(&tmp.path().join("left"), spec_tree);
        let n_right = generate_random_tree(&tmp.path().join("right"), spec_tree);

        assert_eq!(n_left, n_right);
        assert!(are_dir_trees_equal(
            &tmp.path().join("left"),
            &tmp.path().join("right")
        ));
    }

    #[test]
    fn tree_equals_itself() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_root = tmp.path().join("tree");
        generate_random_tree(&path_root, SpecRandomTree::default());
        assert!(are_dir_trees_equal(&path_root, &path_root));
    }

    #[test]
    fn one_sided_entry_breaks_equality() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_left = tmp.path().join("left");
        let path_right = tmp.path().join("right");
        std::fs::create_dir_all(path_left.join("sub")).expect("mkdir left");
        std::fs::create_dir_all(path_right.join("sub")).expect("mkdir right");
        std::fs::write(path_left.join("sub/a.txt"), "a").expect("write left");
        std::fs::write(path_right.join("sub/a.txt"), "a").expect("write right");
        assert!(are_dir_trees_equal(&path_left, &path_right));

        std::fs::write(path_right.join("sub/extra.txt"), "x").expect("write extra");
        assert!(!are_dir_trees_equal(&path_left, &path_right));
        assert!(!are_dir_trees_equal(&path_right, &path_left));
    }

    #[test]
    fn content_or_type_mismatch_breaks_equality() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_left = tmp.path().join("left");
        let path_right = tmp.path().join("right");
        std::fs::create_dir_all(&path_left).expect("mkdir left");
        std::fs::create_dir_all(&path_right).expect("mkdir right");

        std::fs::write(path_left.join("a.txt"), "same size 1").expect("write left");
        std::fs::write(path_right.join("a.txt"), "same size 2").expect("write right");
        assert!(!are_dir_trees_equal(&path_left, &path_right));

        std::fs::write(path_right.join("a.txt"), "same size 1").expect("rewrite right");
        std::fs::write(path_left.join("b"), "file").expect("write left b");
        std::fs::create_dir(path_right.join("b")).expect("mkdir right b");
        assert!(!are_dir_trees_equal(&path_left, &path_right));
    }
}
