use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::errors::CoreError;

/// Checksum algorithms a staged artifact may carry a sidecar for (§4.1).
///
/// `Sha256` is not part of the staging-sidecar vocabulary — Maven only
/// recognizes `md5`/`sha1` sidecars — but is kept here for content-addressed
/// storage in the blob-store fakes used by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algo {
    Md5,
    Sha1,
    Sha256,
}

impl Algo {
    pub fn extension(self) -> &'static str {
        match self {
            Algo::Md5 => "md5",
            Algo::Sha1 => "sha1",
            Algo::Sha256 => "sha256",
        }
    }
}

/// Compute the hex digest of a file under the given algorithm, streaming it
/// in 64KB chunks rather than loading it whole.
pub fn checksum(path: &Path, algo: Algo) -> Result<String, CoreError> {
    let file = std::fs::File::open(path).map_err(CoreError::Io)?;
    let mut reader = std::io::BufReader::with_capacity(64 * 1024, file);
    let mut buf = [0u8; 64 * 1024];

    macro_rules! digest_with {
        ($hasher:expr) => {{
            let mut hasher = $hasher;
            loop {
                let n = reader.read(&mut buf).map_err(CoreError::Io)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            format!("{:x}", hasher.finalize())
        }};
    }

    Ok(match algo {
        Algo::Md5 => digest_with!(Md5::new()),
        Algo::Sha1 => digest_with!(Sha1::new()),
        Algo::Sha256 => digest_with!(Sha256::new()),
    })
}

/// Compute the hex digest of an in-memory buffer.
pub fn checksum_bytes(data: &[u8], algo: Algo) -> String {
    match algo {
        Algo::Md5 => format!("{:x}", Md5::new_with_prefix(data).finalize()),
        Algo::Sha1 => format!("{:x}", Sha1::new_with_prefix(data).finalize()),
        Algo::Sha256 => format!("{:x}", Sha256::new_with_prefix(data).finalize()),
    }
}

/// The sibling path `F.<algo>` Maven uses for a checksum sidecar.
pub fn checksum_file_path(path: &Path, algo: Algo) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(algo.extension());
    path.with_file_name(name)
}

/// True iff `F.<algo>` exists and its trimmed content equals `checksum(F, algo)`.
pub fn valid_checksum_file(path: &Path, algo: Algo) -> bool {
    let sidecar = checksum_file_path(path, algo);
    let expected = match checksum(path, algo) {
        Ok(v) => v,
        Err(_) => return false,
    };
    match std::fs::read_to_string(&sidecar) {
        Ok(content) => extract_hex(&content).eq_ignore_ascii_case(&expected),
        Err(_) => false,
    }
}

/// Maven checksum sidecars are sometimes a bare hex digest and sometimes
/// `<hex>  <filename>` (the GNU coreutils `sha1sum` format); accept both.
fn extract_hex(content: &str) -> &str {
    content.trim().split_whitespace().next().unwrap_or("").trim()
}
