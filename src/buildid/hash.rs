//! Partial content hash, the identity fallback for binaries without an
//! embedded build id.
//!
//! Hashing a multi-hundred-megabyte binary at startup is not acceptable, so
//! the digest covers a deterministic sample: the first 8 KiB, the last 8 KiB
//! (only when the file is larger than one chunk), and the byte size of the
//! file. The size term separates files whose head and tail windows coincide
//! but whose lengths differ.

use std::io::{self, Read, Seek, SeekFrom};

use sha2::{Digest, Sha256};

/// Sample window read from each end of the file.
pub const HASH_CHUNK_SIZE: usize = 8192;

/// SHA-256 over head window + tail window + size, hex-encoded.
///
/// Returns `None` if the input cannot be read; never panics.
pub fn partial_sha256<R: Read + Seek>(input: &mut R) -> Option<String> {
    digest(input).ok()
}

fn digest<R: Read + Seek>(input: &mut R) -> io::Result<String> {
    let size = input.seek(SeekFrom::End(0))?;
    let mut hasher = Sha256::new();

    let head_len = size.min(HASH_CHUNK_SIZE as u64) as usize;
    let mut head = vec![0u8; head_len];
    input.seek(SeekFrom::Start(0))?;
    input.read_exact(&mut head)?;
    hasher.update(&head);

    if size > HASH_CHUNK_SIZE as u64 {
        // Tail window, capped so it never overlaps past what the head
        // already covered; the seek offset stays non-negative for any size.
        let tail_len = (size - head_len as u64).min(HASH_CHUNK_SIZE as u64) as usize;
        let mut tail = vec![0u8; tail_len];
        input.seek(SeekFrom::End(-(tail_len as i64)))?;
        input.read_exact(&mut tail)?;
        hasher.update(&tail);
    }

    hasher.update(size.to_le_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_deterministic() {
        let data = vec![7u8; 3 * HASH_CHUNK_SIZE];
        let a = partial_sha256(&mut Cursor::new(data.clone())).unwrap();
        let b = partial_sha256(&mut Cursor::new(data)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_size_is_mixed_into_the_digest() {
        // Same head window, same tail window (all zeros), different length.
        let three_chunks = vec![0u8; 3 * HASH_CHUNK_SIZE];
        let four_chunks = vec![0u8; 4 * HASH_CHUNK_SIZE];
        let a = partial_sha256(&mut Cursor::new(three_chunks)).unwrap();
        let b = partial_sha256(&mut Cursor::new(four_chunks)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_middle_bytes_do_not_contribute() {
        let mut plain = vec![1u8; 3 * HASH_CHUNK_SIZE];
        let mut scribbled = plain.clone();
        scribbled[HASH_CHUNK_SIZE + 512] = 0xff;
        let a = partial_sha256(&mut Cursor::new(std::mem::take(&mut plain))).unwrap();
        let b = partial_sha256(&mut Cursor::new(std::mem::take(&mut scribbled))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_file_smaller_than_one_chunk() {
        let a = partial_sha256(&mut Cursor::new(vec![3u8; 100])).unwrap();
        let b = partial_sha256(&mut Cursor::new(vec![3u8; 101])).unwrap();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_input() {
        assert!(partial_sha256(&mut Cursor::new(Vec::new())).is_some());
    }
}
