use crate::core::models::Identified;
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Stable identity of one artifact pair: which target, which stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactKey {
    pub target: String,
    pub stage: String,
}

impl ArtifactKey {
    pub fn new(target: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            stage: stage.into(),
        }
    }

    pub fn file_stem(&self) -> String {
        format!("{}_{}", sanitize(&self.stage), sanitize(&self.target))
    }
}

/// Paths written for one stage result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub json: PathBuf,
    pub list: Option<PathBuf>,
}

/// Make a host-like key safe to use as a file name.
pub fn sanitize(key: &str) -> String {
    let flattened = key.trim().replace("://", "_");
    let mut out: String = flattened
        .chars()
        .map(|c| match c {
            '/' | '\\' | '.' | ':' | '?' | '&' | '=' | '#' | '*' | ' ' => '_',
            c => c,
        })
        .collect();

    while out.ends_with('_') {
        out.pop();
    }

    if out.is_empty() {
        out.push('_');
    }
    out
}

#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn json_path(&self, key: &ArtifactKey) -> PathBuf {
        self.root.join(format!("{}.json", key.file_stem()))
    }

    pub fn list_path(&self, key: &ArtifactKey) -> PathBuf {
        self.root.join(format!("{}.txt", key.file_stem()))
    }

    /// Write `records` as a JSON document and, when `with_list` is set, the
    /// newline-delimited identities for the next stage. Overwrites prior files.
    pub fn write<R>(&self, key: &ArtifactKey, records: &[R], with_list: bool) -> Result<ArtifactPaths>
    where
        R: Serialize + Identified,
    {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create output directory: {:?}", self.root))?;

        let json_path = self.json_path(key);
        let json = serde_json::to_string_pretty(records)?;
        atomic_write(&json_path, json.as_bytes())?;

        let list = if with_list {
            let list_path = self.list_path(key);
            let mut body = records
                .iter()
                .map(Identified::identity)
                .collect::<Vec<_>>()
                .join("\n");
            body.push('\n');
            atomic_write(&list_path, body.as_bytes())?;
            Some(list_path)
        } else {
            None
        };

        tracing::debug!("Wrote {} records for {} to {:?}", records.len(), key.stage, json_path);

        Ok(ArtifactPaths {
            json: json_path,
            list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{LiveHost, Subdomain};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    #[case("example.com", "example_com")]
    #[case("https://a.example.com/x", "https_a_example_com_x")]
    #[case("http://10.0.0.1:8080/", "http_10_0_0_1_8080")]
    #[case("", "_")]
    fn test_sanitize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_distinct_targets_do_not_collide() {
        let a = ArtifactKey::new("a.example.com", "httpx");
        let b = ArtifactKey::new("b.example.com", "httpx");
        let c = ArtifactKey::new("a.example.com", "subfinder");
        assert_ne!(a.file_stem(), b.file_stem());
        assert_ne!(a.file_stem(), c.file_stem());
    }

    #[test]
    fn test_writes_json_and_list() {
        let dir = tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path().join("out"));
        let key = ArtifactKey::new("example.com", "subfinder");
        let records = vec![
            Subdomain { domain: "a.example.com".into() },
            Subdomain { domain: "b.example.com".into() },
        ];

        let paths = writer.write(&key, &records, true).unwrap();
        assert_eq!(paths.json, dir.path().join("out/subfinder_example_com.json"));

        let list = fs::read_to_string(paths.list.unwrap()).unwrap();
        assert_eq!(list, "a.example.com\nb.example.com\n");

        let decoded: Vec<Subdomain> =
            serde_json::from_str(&fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let dir = tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());
        let key = ArtifactKey::new("example.com", "httpx");
        let records = vec![LiveHost {
            url: "https://example.com".into(),
            status_code: 200,
            ..Default::default()
        }];

        let first = writer.write(&key, &records, true).unwrap();
        let first_json: Vec<LiveHost> =
            serde_json::from_str(&fs::read_to_string(&first.json).unwrap()).unwrap();
        let first_list = fs::read_to_string(first.list.as_ref().unwrap()).unwrap();

        let second = writer.write(&key, &records, true).unwrap();
        let second_json: Vec<LiveHost> =
            serde_json::from_str(&fs::read_to_string(&second.json).unwrap()).unwrap();
        let second_list = fs::read_to_string(second.list.as_ref().unwrap()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_json, second_json);
        assert_eq!(first_list, second_list);
    }

    #[test]
    fn test_without_list() {
        let dir = tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());
        let paths = writer
            .write(&ArtifactKey::new("https://a", "dirbuster"), &[Subdomain { domain: "x.io".into() }], false)
            .unwrap();
        assert!(paths.list.is_none());
        assert!(!writer.list_path(&ArtifactKey::new("https://a", "dirbuster")).exists());
    }
}
