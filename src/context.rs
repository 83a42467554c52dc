//! Build-context packaging: recipe file plus an uncompressed tar of the context directory.
//!
//! The archive lives in memory for one build call. Nothing is filtered: every file, directory
//! and symlink under the context directory is included with its path relative to that root.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{LifecycleError, Result};

/// Fixed name of the recipe inside the context directory.
pub const RECIPE_FILE: &str = "Dockerfile";

/// Write `content` to `<dir>/Dockerfile`, replacing any existing recipe.
pub fn write_recipe(dir: &Path, content: &str) -> Result<PathBuf> {
    let path = dir.join(RECIPE_FILE);
    fs::write(&path, content)
        .map_err(|e| LifecycleError::io(format!("write recipe {}", path.display()), e))?;
    Ok(path)
}

/// Archive `dir` as an uncompressed tar stream held in memory.
pub fn package_context(dir: &Path) -> Result<Vec<u8>> {
    let packaging = |message: String| LifecycleError::Packaging {
        path: dir.display().to_string(),
        message,
    };

    let mut builder = tar::Builder::new(Vec::new());
    builder.follow_symlinks(false);

    let mut entries = 0usize;
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| packaging(e.to_string()))?;
        let rel = match entry.path().strip_prefix(dir) {
            Ok(r) if r.as_os_str().is_empty() => continue,
            Ok(r) => r.to_path_buf(),
            Err(e) => return Err(packaging(e.to_string())),
        };
        builder
            .append_path_with_name(entry.path(), &rel)
            .map_err(|e| packaging(format!("{}: {e}", rel.display())))?;
        entries += 1;
    }

    let archive = builder
        .into_inner()
        .map_err(|e| packaging(format!("finish archive: {e}")))?;
    debug!(dir = %dir.display(), entries, bytes = archive.len(), "build context packaged");
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_names(archive: &[u8]) -> Vec<String> {
        let mut ar = tar::Archive::new(archive);
        ar.entries()
            .expect("entries")
            .map(|e| {
                e.expect("entry")
                    .path()
                    .expect("path")
                    .display()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_write_recipe_overwrites() {
        let td = tempfile::tempdir().expect("tmpdir");
        write_recipe(td.path(), "FROM a").unwrap();
        let p = write_recipe(td.path(), "FROM scratch\n").unwrap();
        assert_eq!(p, td.path().join("Dockerfile"));
        assert_eq!(fs::read_to_string(p).unwrap(), "FROM scratch\n");
    }

    #[test]
    fn test_write_recipe_missing_dir_is_io_error() {
        let td = tempfile::tempdir().expect("tmpdir");
        let err = write_recipe(&td.path().join("nope"), "FROM scratch").unwrap_err();
        assert!(matches!(err, LifecycleError::Io { .. }), "{err:?}");
    }

    #[test]
    fn test_package_includes_everything_relative() {
        let td = tempfile::tempdir().expect("tmpdir");
        write_recipe(td.path(), "FROM scratch\n").unwrap();
        fs::create_dir(td.path().join("sub")).unwrap();
        fs::write(td.path().join("sub").join("a.txt"), "a").unwrap();
        fs::write(td.path().join(".dockerignore"), "sub\n").unwrap();

        let names = entry_names(&package_context(td.path()).unwrap());
        for want in ["Dockerfile", "sub", "sub/a.txt", ".dockerignore"] {
            assert!(
                names.iter().any(|n| n.trim_end_matches('/') == want),
                "missing {want} in {names:?}"
            );
        }
        assert!(names.iter().all(|n| !n.starts_with('/')), "{names:?}");
    }

    #[test]
    fn test_package_is_uncompressed_tar() {
        let td = tempfile::tempdir().expect("tmpdir");
        write_recipe(td.path(), "FROM scratch\n").unwrap();
        let archive = package_context(td.path()).unwrap();
        // ustar magic at offset 257; gzip would start with 0x1f 0x8b
        assert_ne!(&archive[..2], &[0x1f, 0x8b]);
        assert_eq!(&archive[257..262], b"ustar");
    }

    #[test]
    fn test_package_missing_dir_is_packaging_error() {
        let td = tempfile::tempdir().expect("tmpdir");
        let err = package_context(&td.path().join("missing")).unwrap_err();
        assert!(matches!(err, LifecycleError::Packaging { .. }), "{err:?}");
    }
}
