use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write `content` to `path` through a sibling temp file and a rename, so a
/// downstream stage never observes a half-written artifact.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Invalid path: no parent directory: {:?}", path))?;

    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {:?}", parent))?;
    }

    let tmp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("Failed to create temp file: {:?}", tmp_path))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to temp file: {:?}", tmp_path))?;

    file.sync_all()
        .with_context(|| format!("Failed to sync temp file: {:?}", tmp_path))?;

    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to rename {:?} to {:?}", tmp_path, path))?;

    Ok(())
}

/// Read a newline-delimited target list, trimming entries and dropping blanks.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_list<P: AsRef<Path>>(path: P) -> Result<Option<Vec<String>>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read list file: {:?}", path))?;

    Ok(Some(
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_parents_and_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.txt");

        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_read_list_missing_file() {
        let dir = tempdir().unwrap();
        assert!(read_list(dir.path().join("absent.txt")).unwrap().is_none());
    }

    #[test]
    fn test_read_list_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hosts.txt");
        fs::write(&path, "a.example.com\n\n  b.example.com  \n\n").unwrap();

        let hosts = read_list(&path).unwrap().unwrap();
        assert_eq!(hosts, vec!["a.example.com", "b.example.com"]);
    }
}
