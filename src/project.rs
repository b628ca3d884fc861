//! Project configuration
//!
//! A project is a named set of documents published together. All documents
//! of one project share a single glossary namespace. The configuration is a
//! TOML file; every section is optional.
//!
//! ```toml
//! [project]
//! name = "wiki"
//!
//! [html]
//! standalone = false
//! label_template = "<a href=\"#{id}\">{link}</a>"
//!
//! [definitions]
//! glossary = "An alphabetical list of terms with definitions"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing a project file
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Failed to read project file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse project TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Opaque name of a publishing project
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new("default")
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// HTML overrides from the `[html]` section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlSettings {
    pub standalone: Option<bool>,
    pub label_template: Option<String>,
    pub definition_template: Option<String>,
}

/// A loaded project configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub html: HtmlSettings,
    /// Definitions to seed the registry with before publishing
    pub definitions: BTreeMap<String, String>,
}

/// TOML structure for deserializing project files
#[derive(Deserialize)]
struct TomlProject {
    project: Option<TomlMetadata>,
    html: Option<TomlHtml>,
    #[serde(default)]
    definitions: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
}

#[derive(Deserialize)]
struct TomlHtml {
    standalone: Option<bool>,
    label_template: Option<String>,
    definition_template: Option<String>,
}

impl Project {
    /// Create an unconfigured project with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(name),
            ..Self::default()
        }
    }

    /// Load a project from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ProjectError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a project from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ProjectError> {
        let parsed: TomlProject = toml::from_str(content)?;

        let id = parsed
            .project
            .and_then(|p| p.name)
            .map(ProjectId::new)
            .unwrap_or_default();

        let html = parsed
            .html
            .map(|h| HtmlSettings {
                standalone: h.standalone,
                label_template: h.label_template,
                definition_template: h.definition_template,
            })
            .unwrap_or_default();

        Ok(Project {
            id,
            html,
            definitions: parsed.definitions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_project() {
        let project = Project::default();
        assert_eq!(project.id.as_str(), "default");
        assert!(project.definitions.is_empty());
    }

    #[test]
    fn test_parse_full_project() {
        let toml_str = r#"
[project]
name = "wiki"

[html]
standalone = false
label_template = "<b>{link}</b>"

[definitions]
markup = "Text annotated with tags"
glossary = "A list of terms"
"#;
        let project = Project::from_str(toml_str).expect("Should parse");
        assert_eq!(project.id, ProjectId::new("wiki"));
        assert_eq!(project.html.standalone, Some(false));
        assert_eq!(project.html.label_template.as_deref(), Some("<b>{link}</b>"));
        assert_eq!(project.html.definition_template, None);
        assert_eq!(project.definitions.len(), 2);
        assert_eq!(
            project.definitions.get("markup").map(|s| s.as_str()),
            Some("Text annotated with tags")
        );
    }

    #[test]
    fn test_parse_empty_project() {
        let project = Project::from_str("").expect("Should parse");
        assert_eq!(project, Project::default());
    }

    #[test]
    fn test_named_project() {
        let project = Project::named("notes");
        assert_eq!(project.id.to_string(), "notes");
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = Project::from_str("[project\nname = ");
        assert!(result.is_err());
    }
}
