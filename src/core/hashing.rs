// ─── Artifact Hashing ───
// MD5 digests computed incrementally over fixed-size chunks.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use md5::{Digest, Md5};

use crate::core::error::{ExporterError, ExporterResult};

/// Read buffer size used while hashing.
pub const CHUNK_SIZE: usize = 4096;

/// Digest everything `reader` yields, returning lowercase hex.
pub fn md5_hex<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Md5::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Digest an in-memory buffer.
pub fn md5_bytes(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Digest a file on disk. The handle is closed before returning, on every path.
pub fn md5_file(path: &Path) -> ExporterResult<String> {
    let file = File::open(path).map_err(|e| ExporterError::io(path, e))?;
    md5_hex(file).map_err(|e| ExporterError::io(path, e))
}
