//! Content hashing of source files.
//!
//! Files are streamed through BLAKE3 in fixed-size chunks so memory use does
//! not depend on file size. The digest is only used for equality of file
//! bodies.

use crate::error::{Error, Result};
use crate::types::{ContentHash, DiscoveredFile, SourceFile};
use indicatif::ProgressBar;
use log::debug;

use std::{fs::File, io::Read, path::Path};

const CHUNK_SIZE: usize = 8192;

/// Compute the content hash of a file using the Blake3 algorithm
pub fn compute_content_hash<P: AsRef<Path>>(path: P) -> Result<ContentHash> {
    let path = path.as_ref();
    let read_error = |source| Error::HashRead {
        path: path.to_path_buf(),
        source,
    };

    // Open the file with explicit scope to ensure it's closed promptly
    let hash = {
        let mut file = File::open(path).map_err(read_error)?;
        let mut hasher = blake3::Hasher::new();

        let mut buffer = [0; CHUNK_SIZE];
        loop {
            let bytes_read = file.read(&mut buffer).map_err(read_error)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        hasher.finalize()
    };

    Ok(ContentHash::from(hash))
}

/// Hash every discovered file, keeping discovery order.
///
/// Stops at the first unreadable file.
pub fn hash_files(files: Vec<DiscoveredFile>, progress: &ProgressBar) -> Result<Vec<SourceFile>> {
    let mut hashed = Vec::with_capacity(files.len());

    for file in files {
        let content_hash = compute_content_hash(&file.path)?;
        debug!("{} -> {}", file.path.display(), content_hash);

        hashed.push(SourceFile {
            path: file.path,
            stem: file.stem,
            extension: file.extension,
            content_hash,
        });
        progress.inc(1);
    }

    Ok(hashed)
}
