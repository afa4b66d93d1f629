//! Pattern matching over PUT request paths (§4.7).

use once_cell::sync::Lazy;
use regex::Regex;

static SNAPSHOT_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_.+-]+-SNAPSHOT$").unwrap());

const VERSIONED_EXTENSIONS: &[&str] = &["pom", "jar", "sha1", "md5", "asc"];

/// The outcome of matching a PUT request's path against §4.7's three
/// patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPut {
    /// `/<group>/<artifact>/maven-metadata.xml` — the real metadata file,
    /// a write that may trigger finalization.
    NonVersionedMetadataWrite { group: String, artifact: String },
    /// `/<group>/<artifact>/maven-metadata.xml.<md5|sha1>` — accepted and
    /// dropped; the server regenerates these itself on finalize.
    MetadataSidecar,
    /// A versioned artifact PUT, including a snapshot `maven-metadata.xml`
    /// (treated as versioned — §4.7 table, first row's snapshot branch).
    VersionedUpload {
        group: String,
        artifact: String,
        version: String,
        filename: String,
    },
    /// Nothing matched.
    BadRequest,
}

/// Match `path` (already stripped of any leading `/`) against §4.7's
/// three PUT patterns, in order.
pub fn parse_put_path(path: &str) -> ParsedPut {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 3 {
        return ParsedPut::BadRequest;
    }

    let last = segments[segments.len() - 1];
    let second_last = segments[segments.len() - 2];

    if last == "maven-metadata.xml" || is_metadata_sidecar(last) {
        // Pattern 1: group/.../artifact/maven-metadata.xml[.md5|.sha1]
        let group = segments[..segments.len() - 2].join("/");
        let artifact = second_last.to_string();

        if SNAPSHOT_VERSION_RE.is_match(&artifact) {
            // The captured "artifact" position is actually a snapshot
            // version; split group on its last segment to recover the
            // real artifact and dispatch as a versioned upload.
            let group_segments = &segments[..segments.len() - 2];
            if group_segments.is_empty() {
                return ParsedPut::BadRequest;
            }
            let real_artifact = group_segments[group_segments.len() - 1].to_string();
            let real_group = group_segments[..group_segments.len() - 1].join("/");
            return ParsedPut::VersionedUpload {
                group: real_group,
                artifact: real_artifact,
                version: artifact,
                filename: last.to_string(),
            };
        }

        if last == "maven-metadata.xml" {
            return ParsedPut::NonVersionedMetadataWrite { group, artifact };
        }
        return ParsedPut::MetadataSidecar;
    }

    // Pattern 2: group/.../artifact/version/filename
    if segments.len() >= 4 && has_versioned_extension(last) {
        let group_segments = &segments[..segments.len() - 3];
        let group = group_segments.join("/");
        if group.contains('.') {
            return ParsedPut::BadRequest;
        }
        return ParsedPut::VersionedUpload {
            group,
            artifact: segments[segments.len() - 3].to_string(),
            version: segments[segments.len() - 2].to_string(),
            filename: last.to_string(),
        };
    }

    ParsedPut::BadRequest
}

fn is_metadata_sidecar(filename: &str) -> bool {
    filename == "maven-metadata.xml.md5" || filename == "maven-metadata.xml.sha1"
}

fn has_versioned_extension(filename: &str) -> bool {
    VERSIONED_EXTENSIONS
        .iter()
        .any(|ext| filename.ends_with(&format!(".{ext}")))
}
