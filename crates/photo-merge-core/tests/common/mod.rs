#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use photo_merge_core::Config;
use tempfile::TempDir;

/// Two source roots and a destination inside one scratch directory
pub struct Fixture {
    pub dir: TempDir,
    pub root_a: PathBuf,
    pub root_b: PathBuf,
    pub dest: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root_a = dir.path().join("20190927");
        let root_b = dir.path().join("20240825");
        let dest = dir.path().join("merged");
        fs::create_dir_all(&root_a).unwrap();
        fs::create_dir_all(&root_b).unwrap();

        Self {
            dir,
            root_a,
            root_b,
            dest,
        }
    }

    pub fn config(&self) -> Config {
        Config {
            source_roots: vec![self.root_a.clone(), self.root_b.clone()],
            destination_root: self.dest.clone(),
            ..Default::default()
        }
    }

    /// Names of the files in the destination, sorted
    pub fn dest_names(&self) -> Vec<String> {
        if !self.dest.exists() {
            return Vec::new();
        }
        let mut names: Vec<String> = fs::read_dir(&self.dest)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn read_dest(&self, name: &str) -> Vec<u8> {
        fs::read(self.dest.join(name)).unwrap()
    }
}

/// Write `content` to `root/rel`, creating parent directories
pub fn write_file(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

pub fn blake3_hex(content: &[u8]) -> String {
    blake3::hash(content).to_hex().to_string()
}
