use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::DiscoveredFile;

/// Check that every source root exists and is a directory
pub fn check_source_roots<P: AsRef<Path>>(directories: &[P]) -> Result<()> {
    for dir in directories {
        let dir = dir.as_ref();
        let metadata = std::fs::metadata(dir).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(dir.to_path_buf()),
            _ => Error::Discovery {
                path: dir.to_path_buf(),
                source: e,
            },
        })?;

        if !metadata.is_dir() {
            return Err(Error::NotADirectory(dir.to_path_buf()));
        }
    }

    Ok(())
}

/// Walk a directory tree and return every regular file, in file-name order.
///
/// Symlinks to regular files are returned as the link path; dangling links
/// and links to directories are skipped. Any traversal error aborts the walk.
pub fn walk_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::from_walk(directory, e))?;
        if entry.file_type().is_file() || is_link_to_file(entry.path(), entry.path_is_symlink()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn is_link_to_file(path: &Path, is_symlink: bool) -> bool {
    if !is_symlink {
        return false;
    }
    match std::fs::metadata(path) {
        Ok(metadata) => metadata.is_file(),
        Err(e) => {
            debug!("Skipping dangling link {}: {}", path.display(), e);
            false
        }
    }
}

/// Discover files with one of the target extensions under all source roots.
///
/// Roots are scanned in the given order. Extensions match regardless of case,
/// so `IMG_0001.JPG` is found by a `jpg` target. Callers check the roots with
/// [`check_source_roots`] first; a missing root surfaces here as a walk error.
pub fn discover_sources<P: AsRef<Path>>(
    directories: &[P],
    extensions: &[String],
) -> Result<Vec<DiscoveredFile>> {
    let mut discovered = Vec::new();
    for dir in directories {
        discovered.extend(discover_in_directory(dir.as_ref(), extensions)?);
    }

    Ok(discovered)
}

/// Discover target files in a single directory
fn discover_in_directory(directory: &Path, extensions: &[String]) -> Result<Vec<DiscoveredFile>> {
    let mut found = Vec::new();

    for path in walk_files(directory)? {
        if !has_target_extension(&path, extensions) {
            continue;
        }

        // Stems keep their raw bytes, names need not be UTF-8
        let stem = path
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(OsString::new);
        let extension = lowercase_extension(&path).unwrap_or_default();

        found.push(DiscoveredFile {
            path,
            stem,
            extension,
        });
    }

    Ok(found)
}

/// Lowercased extension with its leading dot, e.g. `.heic`
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
}

/// Returns if the given path has one of the target extensions, ignoring case
pub fn has_target_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => extensions.iter().any(|t| t.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

// -- Tests --

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    fn targets() -> Vec<String> {
        vec!["jpg".to_string(), "heic".to_string()]
    }

    fn create_test_image(dir: &Path, name: &str, ext: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let file_path = dir.join(format!("{}.{}", name, ext));
        let mut file = File::create(&file_path).unwrap();
        // Write some dummy data to simulate an image
        file.write_all(b"DUMMY IMAGE DATA").unwrap();
        file_path
    }

    fn setup_test_directory() -> (tempfile::TempDir, Vec<PathBuf>) {
        let dir = tempdir().unwrap();
        let subdir_path = dir.path().join("subdir");

        let files = vec![
            create_test_image(dir.path(), "IMG_0001", "jpg"),
            create_test_image(dir.path(), "IMG_0002", "heic"),
            create_test_image(&subdir_path, "IMG_0003", "jpg"),
        ];

        // Files that must not be discovered
        create_test_image(dir.path(), "clip", "mov");
        create_test_image(dir.path(), "notes", "txt");
        create_test_image(&subdir_path, "scan", "png");

        (dir, files)
    }

    #[test]
    fn test_has_target_extension() {
        let targets = targets();
        assert!(has_target_extension(Path::new("a.jpg"), &targets));
        assert!(has_target_extension(Path::new("a.JPG"), &targets));
        assert!(has_target_extension(Path::new("a.Heic"), &targets));
        assert!(!has_target_extension(Path::new("a.jpeg"), &targets));
        assert!(!has_target_extension(Path::new("a.mov"), &targets));
        assert!(!has_target_extension(Path::new("jpg"), &targets));
    }

    #[test]
    fn test_lowercase_extension() {
        assert_eq!(
            lowercase_extension(Path::new("IMG.JPG")).as_deref(),
            Some(".jpg")
        );
        assert_eq!(
            lowercase_extension(Path::new("archive.tar.HEIC")).as_deref(),
            Some(".heic")
        );
        assert_eq!(lowercase_extension(Path::new("README")), None);
    }

    #[test]
    fn test_discover_in_directory() {
        let (dir, files) = setup_test_directory();

        let discovered = discover_in_directory(dir.path(), &targets()).unwrap();
        assert_eq!(discovered.len(), 3);

        let paths: Vec<PathBuf> = discovered.iter().map(|f| f.path.clone()).collect();
        for file_path in &files {
            assert!(paths.contains(file_path));
        }
    }

    #[test]
    fn test_discovered_attributes() {
        let dir = tempdir().unwrap();
        create_test_image(dir.path(), "IMG_0042", "JPG");

        let discovered = discover_in_directory(dir.path(), &targets()).unwrap();
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].stem, "IMG_0042");
        assert_eq!(discovered[0].extension, ".jpg");
    }

    #[test]
    fn test_discovery_order_is_sorted() {
        let dir = tempdir().unwrap();
        create_test_image(dir.path(), "c", "jpg");
        create_test_image(dir.path(), "a", "jpg");
        create_test_image(dir.path(), "b", "jpg");

        let discovered = discover_in_directory(dir.path(), &targets()).unwrap();
        let stems: Vec<&str> = discovered.iter().map(|f| f.stem.to_str().unwrap()).collect();
        assert_eq!(stems, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        let discovered = discover_sources(&[dir.path()], &targets()).unwrap();
        assert!(discovered.is_empty());
    }

    #[test]
    fn test_discover_nonexistent_directory() {
        let result = discover_sources(&[Path::new("/path/that/does/not/exist")], &targets());
        assert!(matches!(result, Err(Error::Discovery { .. })));
    }

    #[test]
    fn test_check_nonexistent_root() {
        let result = check_source_roots(&[Path::new("/path/that/does/not/exist")]);
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_stem_is_kept() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"caf\xe9.jpg"));
        fs::write(&path, b"photo").unwrap();

        let discovered = discover_in_directory(dir.path(), &targets()).unwrap();
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].stem.as_bytes(), b"caf\xe9");
        assert_eq!(discovered[0].extension, ".jpg");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_walked() {
        use std::os::unix::fs::symlink;

        let outside = tempdir().unwrap();
        let target = create_test_image(outside.path(), "IMG_0001", "jpg");
        let other_dir = outside.path().join("album");
        fs::create_dir(&other_dir).unwrap();

        let dir = tempdir().unwrap();
        symlink(&target, dir.path().join("linked.jpg")).unwrap();
        symlink(outside.path().join("gone.jpg"), dir.path().join("dangling.jpg")).unwrap();
        symlink(&other_dir, dir.path().join("album.jpg")).unwrap();

        let files = walk_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("linked.jpg")]);
    }

    #[test]
    fn test_root_must_be_directory() {
        let dir = tempdir().unwrap();
        let file = create_test_image(dir.path(), "IMG_0001", "jpg");

        let result = check_source_roots(&[file]);
        assert!(matches!(result, Err(Error::NotADirectory(_))));
    }

    #[test]
    fn test_discover_multiple_directories_in_root_order() {
        let (dir1, files1) = setup_test_directory();
        let (dir2, files2) = setup_test_directory();

        let discovered = discover_sources(&[dir2.path(), dir1.path()], &targets()).unwrap();
        assert_eq!(discovered.len(), 6);

        // Everything from the first root comes before the second
        let paths: Vec<PathBuf> = discovered.iter().map(|f| f.path.clone()).collect();
        for file_path in &files2 {
            assert!(paths[..3].contains(file_path));
        }
        for file_path in &files1 {
            assert!(paths[3..].contains(file_path));
        }
    }
}
