//! Archive integrity checks against `.CHECKSUM` companions.
//!
//! A checksum file holds one line: `<sha256-hex>  <archive-file-name>`.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChecksumError {
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed checksum file {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("checksum mismatch for {}: expected {expected}, got {actual}", path.display())]
    Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

/// Extract the lower-cased hex digest from checksum file contents.
pub fn parse_checksum(contents: &str) -> Option<String> {
    let digest = contents.split_whitespace().next()?;
    if digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(digest.to_ascii_lowercase())
    } else {
        None
    }
}

/// Stream a file through SHA-256 and return the lower-case hex digest.
pub fn sha256_file(path: &Path) -> Result<String, ChecksumError> {
    let io_err = |source| ChecksumError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compare `archive` with the digest recorded in `checksum_file`.
pub fn verify_archive(archive: &Path, checksum_file: &Path) -> Result<(), ChecksumError> {
    let contents = std::fs::read_to_string(checksum_file).map_err(|source| ChecksumError::Io {
        path: checksum_file.to_path_buf(),
        source,
    })?;
    let expected = parse_checksum(&contents).ok_or_else(|| ChecksumError::Malformed {
        path: checksum_file.to_path_buf(),
        reason: "expected a 64-character hex digest".into(),
    })?;
    let actual = sha256_file(archive)?;
    if actual != expected {
        return Err(ChecksumError::Mismatch {
            path: archive.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(())
}
