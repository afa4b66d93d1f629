//! POM descriptor parsing.
//!
//! The finalizer and validator only ever need the top-level coordinate and
//! packaging fields a staged POM declares (§3 "POM data", §4.6 step 2) —
//! dependency graphs, parent inheritance, and property interpolation are a
//! client-side build concern this core does not need.

use cellar_util::errors::CoreError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// The fields extracted from a staged `*.pom` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomData {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl PomData {
    /// Maven defaults `packaging` to `jar` when the element is absent.
    pub fn effective_packaging(&self) -> &str {
        self.packaging.as_deref().unwrap_or("jar")
    }
}

/// Parse a POM XML document into its top-level fields.
pub fn parse_pom(xml: &str) -> Result<PomData, CoreError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pom = PomData::default();
    let mut path: Vec<String> = Vec::new();
    let mut text_buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                path.push(tag);
                text_buf.clear();
            }
            Ok(Event::Text(ref e)) => {
                text_buf = e.unescape().unwrap_or_default().to_string();
            }
            Ok(Event::End(_)) => {
                // Only top-level <project>/<field> elements are of interest.
                if path.len() == 2 && path.first().map(|s| s.as_str()) == Some("project") {
                    match path.last().map(|s| s.as_str()) {
                        Some("groupId") => pom.group_id = Some(text_buf.clone()),
                        Some("artifactId") => pom.artifact_id = Some(text_buf.clone()),
                        Some("version") => pom.version = Some(text_buf.clone()),
                        Some("packaging") => pom.packaging = Some(text_buf.clone()),
                        Some("name") => pom.name = Some(text_buf.clone()),
                        Some("description") => pom.description = Some(text_buf.clone()),
                        _ => {}
                    }
                }
                path.pop();
                text_buf.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(CoreError::InvalidPomFile {
                    message: format!("failed to parse POM XML: {e}"),
                });
            }
            _ => {}
        }
    }

    Ok(pom)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <groupId>com.example</groupId>
    <artifactId>lib</artifactId>
    <version>1.0</version>
    <packaging>jar</packaging>
    <name>lib</name>
</project>"#;

    #[test]
    fn parses_top_level_fields() {
        let pom = parse_pom(SIMPLE_POM).unwrap();
        assert_eq!(pom.group_id.as_deref(), Some("com.example"));
        assert_eq!(pom.artifact_id.as_deref(), Some("lib"));
        assert_eq!(pom.version.as_deref(), Some("1.0"));
        assert_eq!(pom.packaging.as_deref(), Some("jar"));
    }

    #[test]
    fn defaults_packaging_to_jar_when_absent() {
        let xml = r#"<project><groupId>com.example</groupId><artifactId>lib</artifactId><version>1.0</version></project>"#;
        let pom = parse_pom(xml).unwrap();
        assert_eq!(pom.effective_packaging(), "jar");
    }

    #[test]
    fn mismatched_tags_are_invalid_pom_file() {
        let err = parse_pom("<project><groupId>x</notGroupId></project>").unwrap_err();
        assert_eq!(err.tag(), "invalid-pom-file");
    }
}
