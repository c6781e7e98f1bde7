use serde::{Deserialize, Serialize, Serializer};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Hex-encoded digest of a file's full content.
///
/// Ordering is lexicographic on the hex string, which is what decides the
/// ordinal of each content variant sharing a name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<blake3::Hash> for ContentHash {
    fn from(hash: blake3::Hash) -> Self {
        Self(hash.to_hex().to_string())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file found under a source root whose extension is one of the targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,

    /// File name without its extension, raw bytes preserved
    pub stem: OsString,

    /// Lowercased extension including the leading dot, e.g. `.jpg`
    pub extension: String,
}

/// A discovered file together with its content hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub stem: OsString,
    pub extension: String,
    pub content_hash: ContentHash,
}

impl SourceFile {
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            stem: self.stem.clone(),
            extension: self.extension.clone(),
        }
    }
}

/// Files sharing a stem and (lowercased) extension are candidate duplicates
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub stem: OsString,
    pub extension: String,
}

impl GroupKey {
    /// Destination file name for the hash group at `ordinal`
    pub fn destination_name(&self, ordinal: usize) -> OsString {
        let mut name = self.stem.clone();
        if ordinal > 0 {
            name.push(format!("_{}", ordinal));
        }
        name.push(&self.extension);
        name
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem.to_string_lossy(), self.extension)
    }
}

/// Files under one group key with identical content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashGroup {
    pub content_hash: ContentHash,

    /// First file encountered with this content; the only one ever copied
    pub representative: PathBuf,

    /// Later files with the same content, never copied
    pub duplicates: Vec<PathBuf>,
}

/// A file name to create in the destination and the file that supplies it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationEntry {
    pub name: OsString,
    pub source: PathBuf,
    pub content_hash: ContentHash,
    pub ordinal: usize,
}

/// Types of actions that can be performed during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    /// Representative copied into the destination
    Copy,

    /// Destination name already taken, nothing written
    SkipExisting,

    /// Name produced twice within one run, only the first is copied
    NameConflict,
}

/// Result of a single filesystem action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Type of action performed (or planned, in a dry run)
    pub action_type: ActionType,

    /// File the action was taken on
    #[serde(serialize_with = "serialize_path_lossy")]
    pub source_path: PathBuf,

    /// Destination path, for copies and skips
    #[serde(serialize_with = "serialize_opt_path_lossy")]
    pub destination_path: Option<PathBuf>,
}

/// Summary of everything a run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Whether the run was a dry run
    pub dry_run: bool,

    /// Excluded files deleted (or that would be deleted)
    #[serde(serialize_with = "serialize_paths_lossy")]
    pub purged: Vec<PathBuf>,

    /// Copies written (or that would be written)
    pub copied: Vec<ActionResult>,

    /// Destination names that already existed
    pub skipped_existing: Vec<ActionResult>,

    /// Representatives not copied because another group key produced the same name
    pub name_conflicts: Vec<ActionResult>,

    /// Number of discovered files collapsed into another file's copy
    pub duplicates: usize,

    /// Number of destination entries in the plan
    pub planned: usize,
}

// Paths in reports are for people; non-UTF-8 bytes become U+FFFD instead of failing.

fn serialize_path_lossy<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

fn serialize_opt_path_lossy<S: Serializer>(
    path: &Option<PathBuf>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match path {
        Some(path) => serialize_path_lossy(path, serializer),
        None => serializer.serialize_none(),
    }
}

fn serialize_paths_lossy<S: Serializer>(
    paths: &[PathBuf],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(paths.iter().map(|p| p.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(stem: &str, extension: &str) -> GroupKey {
        GroupKey {
            stem: OsString::from(stem),
            extension: extension.to_string(),
        }
    }

    #[test]
    fn test_destination_names() {
        let key = key("IMG_1", ".jpg");
        assert_eq!(key.destination_name(0), "IMG_1.jpg");
        assert_eq!(key.destination_name(1), "IMG_1_1.jpg");
        assert_eq!(key.destination_name(12), "IMG_1_12.jpg");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_destination_name_keeps_raw_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let key = GroupKey {
            stem: OsStr::from_bytes(b"caf\xe9").to_os_string(),
            extension: ".jpg".to_string(),
        };
        assert_eq!(key.destination_name(1).as_bytes(), b"caf\xe9_1.jpg");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_report_with_non_utf8_path_serializes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = PathBuf::from(OsStr::from_bytes(b"/photos/caf\xe9.jpg"));
        let report = RunReport {
            purged: vec![path.clone()],
            copied: vec![ActionResult {
                action_type: ActionType::Copy,
                source_path: path.clone(),
                destination_path: Some(path),
            }],
            ..Default::default()
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["copied"][0]["source_path"], "/photos/caf\u{fffd}.jpg");
        assert_eq!(json["purged"][0], "/photos/caf\u{fffd}.jpg");
    }
}
