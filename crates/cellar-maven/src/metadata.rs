//! Artifact-level maven-metadata.xml parsing for version discovery.

use cellar_util::errors::CoreError;
use cellar_util::hash::{checksum, checksum_file_path, Algo};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

/// Artifact-level Maven metadata listing available versions.
#[derive(Debug, Clone, Default)]
pub struct MavenMetadata {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub latest: Option<String>,
    pub release: Option<String>,
    pub versions: Vec<String>,
}

/// Regenerate `.md5`/`.sha1` sidecars for `maven-metadata.xml`, discarding
/// whatever the client may have sent alongside it (§4.6 step 4 — client
/// checksums for this one file are never trusted).
pub fn regenerate_checksums(metadata_path: &Path) -> Result<(), CoreError> {
    for algo in [Algo::Md5, Algo::Sha1] {
        let digest = checksum(metadata_path, algo)?;
        cellar_util::fs::atomic_write(&checksum_file_path(metadata_path, algo), digest.as_bytes())?;
    }
    Ok(())
}

/// Parse an artifact-level `maven-metadata.xml` that lists available versions.
pub fn parse_metadata(xml: &str) -> Result<MavenMetadata, CoreError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut meta = MavenMetadata::default();
    let mut path: Vec<String> = Vec::new();
    let mut text_buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                path.push(String::from_utf8_lossy(e.name().as_ref()).to_string());
                text_buf.clear();
            }
            Ok(Event::Text(ref e)) => {
                text_buf = e.unescape().unwrap_or_default().to_string();
            }
            Ok(Event::End(_)) => {
                let ctx = path.join(">");

                match ctx.as_str() {
                    "metadata>groupId" => meta.group_id = Some(text_buf.clone()),
                    "metadata>artifactId" => meta.artifact_id = Some(text_buf.clone()),
                    "metadata>versioning>latest" => meta.latest = Some(text_buf.clone()),
                    "metadata>versioning>release" => meta.release = Some(text_buf.clone()),
                    "metadata>versioning>versions>version" => {
                        meta.versions.push(text_buf.clone());
                    }
                    _ => {}
                }

                path.pop();
                text_buf.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(CoreError::InvalidMavenMetadataFile {
                    message: format!("failed to parse maven-metadata.xml: {e}"),
                });
            }
            _ => {}
        }
    }

    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regenerates_checksum_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maven-metadata.xml");
        std::fs::write(&path, b"<metadata/>").unwrap();
        regenerate_checksums(&path).unwrap();
        assert!(checksum_file_path(&path, Algo::Md5).exists());
        assert!(checksum_file_path(&path, Algo::Sha1).exists());
    }

    #[test]
    fn malformed_metadata_is_invalid_maven_metadata_file() {
        let err = parse_metadata("<metadata><groupId>x</notGroupId></metadata>").unwrap_err();
        assert_eq!(err.tag(), "invalid-maven-metadata-file");
    }

    #[test]
    fn parse_artifact_metadata() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata>
  <groupId>org.jetbrains.kotlinx</groupId>
  <artifactId>kotlinx-coroutines-core</artifactId>
  <versioning>
    <latest>1.8.0</latest>
    <release>1.8.0</release>
    <versions>
      <version>1.6.0</version>
      <version>1.7.0</version>
      <version>1.7.3</version>
      <version>1.8.0</version>
    </versions>
    <lastUpdated>20240101120000</lastUpdated>
  </versioning>
</metadata>"#;
        let meta = parse_metadata(xml).unwrap();
        assert_eq!(meta.group_id.as_deref(), Some("org.jetbrains.kotlinx"));
        assert_eq!(meta.artifact_id.as_deref(), Some("kotlinx-coroutines-core"));
        assert_eq!(meta.latest.as_deref(), Some("1.8.0"));
        assert_eq!(meta.release.as_deref(), Some("1.8.0"));
        assert_eq!(meta.versions.len(), 4);
        assert_eq!(meta.versions[0], "1.6.0");
        assert_eq!(meta.versions[3], "1.8.0");
    }
}
