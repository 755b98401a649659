use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const TEN_MIB: u64 = 10 * 1024 * 1024;
const HUNDRED_MIB: u64 = 100 * 1024 * 1024;

/// Computes the content digest of one file. Injectable so callers can
/// observe or replace the byte-reading step.
pub trait ContentHasher {
    fn hash_file(&self, path: &Path, chunk_size: usize) -> io::Result<String>;
}

/// Streaming SHA-1, lowercase hex.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha1Hasher;

impl ContentHasher for Sha1Hasher {
    fn hash_file(&self, path: &Path, chunk_size: usize) -> io::Result<String> {
        let mut f = File::open(path)?;
        let mut hasher = Sha1::new();
        let mut buffer = vec![0u8; chunk_size.max(1)];
        loop {
            let read = f.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Read size for a file of `file_size` bytes. Larger files get larger
/// reads; the configured hint is a floor.
pub fn chunk_size_for(file_size: u64, hint: usize) -> usize {
    let floor = if file_size >= HUNDRED_MIB {
        1024 * 1024
    } else if file_size >= TEN_MIB {
        64 * 1024
    } else {
        0
    };
    hint.max(floor).max(1)
}
