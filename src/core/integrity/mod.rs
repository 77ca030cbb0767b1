// ─── Integrity ───
// Streamed content digests and size+hash validation of local files.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Digest algorithm, inferred from the length of the expected hex digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    pub fn detect(expected_hex: &str) -> Option<Self> {
        match expected_hex.trim().len() {
            32 => Some(HashAlgorithm::Md5),
            40 => Some(HashAlgorithm::Sha1),
            64 => Some(HashAlgorithm::Sha256),
            _ => None,
        }
    }
}

/// Incremental hasher fed chunk by chunk, either from disk or straight
/// from a download stream.
pub enum ContentHasher {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
}

impl ContentHasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => ContentHasher::Md5(Md5::new()),
            HashAlgorithm::Sha1 => ContentHasher::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => ContentHasher::Sha256(Sha256::new()),
        }
    }

    /// Hasher matching the shape of `expected_hex`, if recognizable.
    pub fn for_expected(expected_hex: &str) -> Option<Self> {
        HashAlgorithm::detect(expected_hex).map(Self::new)
    }

    pub fn update(&mut self, chunk: &[u8]) {
        match self {
            ContentHasher::Md5(h) => h.update(chunk),
            ContentHasher::Sha1(h) => h.update(chunk),
            ContentHasher::Sha256(h) => h.update(chunk),
        }
    }

    /// Lowercase hex digest.
    pub fn finalize_hex(self) -> String {
        match self {
            ContentHasher::Md5(h) => hex::encode(h.finalize()),
            ContentHasher::Sha1(h) => hex::encode(h.finalize()),
            ContentHasher::Sha256(h) => hex::encode(h.finalize()),
        }
    }
}

pub fn digests_match(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual.trim())
}

/// Hash a file with a fixed-size buffer, never loading it whole.
pub fn file_digest(path: &Path, algorithm: HashAlgorithm) -> LauncherResult<String> {
    let mut file = File::open(path).map_err(|e| LauncherError::io(path, e))?;
    let mut hasher = ContentHasher::new(algorithm);
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let read = file
            .read(&mut buffer)
            .map_err(|e| LauncherError::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.finalize_hex())
}

/// `true` when `path` exists with exactly `expected_size` bytes and the
/// expected digest.
///
/// Fails closed: a missing file, an unreadable file or an unrecognized
/// digest format all count as invalid. Never returns an error, so one bad
/// file cannot abort a whole sync.
pub fn is_valid(path: &Path, expected_hash: &str, expected_size: u64) -> bool {
    let metadata = match std::fs::metadata(path) {
        Ok(m) if m.is_file() => m,
        Ok(_) => {
            debug!("Not a regular file: {:?}", path);
            return false;
        }
        Err(_) => return false,
    };

    if metadata.len() != expected_size {
        debug!(
            "Size mismatch for {:?}: expected {}, found {}",
            path,
            expected_size,
            metadata.len()
        );
        return false;
    }

    let Some(algorithm) = HashAlgorithm::detect(expected_hash) else {
        warn!(
            "Unrecognized digest format {:?} for {:?}; treating as invalid",
            expected_hash, path
        );
        return false;
    };

    match file_digest(path, algorithm) {
        Ok(actual) => digests_match(expected_hash, &actual),
        Err(e) => {
            warn!("Cannot hash {:?}: {}", path, e);
            false
        }
    }
}
