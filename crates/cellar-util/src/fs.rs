use std::path::{Path, PathBuf};

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Return `child` with the `root` prefix stripped, as a forward-slash
/// relative path suitable for a blob store key.
///
/// Panics only if `child` is not actually under `root`, which would be a
/// caller bug (every staged file path is derived from the staging dir it
/// lives in).
pub fn subpath(root: &Path, child: &Path) -> String {
    let rel = child
        .strip_prefix(root)
        .unwrap_or_else(|_| panic!("{child:?} is not under {root:?}"));
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write `content` to `dest` atomically: write to a sibling temp file, then
/// rename over the destination. On any failure the temp file (and, if the
/// rename itself failed partway, the destination) is removed before the
/// error propagates.
pub fn atomic_write(dest: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    ensure_dir(dir)?;
    let tmp = tmp_path(dest);

    let result = (|| {
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, dest)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
        let _ = std::fs::remove_file(dest);
    }
    result
}

fn tmp_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subpath_strips_root_and_joins_with_slashes() {
        let root = Path::new("/tmp/upload-1");
        let child = Path::new("/tmp/upload-1/com/ex/lib/1.0/lib-1.0.jar");
        assert_eq!(subpath(root, child), "com/ex/lib/1.0/lib-1.0.jar");
    }

    #[test]
    fn atomic_write_creates_parent_dirs_and_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a/b/c.txt");
        atomic_write(&dest, b"hello").unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");
        assert!(!dest.with_file_name("c.txt.tmp").exists());
    }

    #[test]
    fn atomic_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("c.txt");
        atomic_write(&dest, b"first").unwrap();
        atomic_write(&dest, b"second").unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"second");
    }
}
