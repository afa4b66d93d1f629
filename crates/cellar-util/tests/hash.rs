use cellar_util::hash::{checksum, checksum_bytes, checksum_file_path, valid_checksum_file, Algo};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[test]
fn checksum_bytes_empty_sha256() {
    let hash = checksum_bytes(b"", Algo::Sha256);
    assert_eq!(
        hash,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn checksum_bytes_deterministic() {
    let a = checksum_bytes(b"cellar", Algo::Sha1);
    let b = checksum_bytes(b"cellar", Algo::Sha1);
    assert_eq!(a, b);
}

#[test]
fn checksum_file_matches_bytes() {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(b"hello").unwrap();
    tmp.flush().unwrap();
    let file_hash = checksum(tmp.path(), Algo::Md5).unwrap();
    let bytes_hash = checksum_bytes(b"hello", Algo::Md5);
    assert_eq!(file_hash, bytes_hash);
}

#[test]
fn checksum_file_not_found() {
    let result = checksum(Path::new("/nonexistent/path/file.txt"), Algo::Sha1);
    assert!(result.is_err());
}

#[test]
fn checksum_file_path_appends_extension() {
    let path = Path::new("/staging/lib-1.0.jar");
    assert_eq!(
        checksum_file_path(path, Algo::Sha1),
        Path::new("/staging/lib-1.0.jar.sha1")
    );
}

#[test]
fn valid_checksum_file_true_when_sidecar_matches() {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(b"jar-bytes").unwrap();
    tmp.flush().unwrap();
    let digest = checksum(tmp.path(), Algo::Sha1).unwrap();
    std::fs::write(checksum_file_path(tmp.path(), Algo::Sha1), digest).unwrap();
    assert!(valid_checksum_file(tmp.path(), Algo::Sha1));
}
