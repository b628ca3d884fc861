//! glossmark - markup publishing with an interactive glossary
//!
//! This library scans text markup for glossary tags and publishes it as HTML
//! (or plain text). Terms marked with `<define>` are rendered as a clickable
//! label that reveals their definition, taken from the tag's own body or from
//! a `<definition>` registered elsewhere in the same project.
//!
//! # Example
//!
//! ```rust
//! use glossmark::publish;
//!
//! let html = publish(r#"<definition name="word">hello</definition>
//! A <define link="word"/> to know."#).unwrap();
//! assert!(html.contains(">word</a>"));
//! assert!(html.contains(">hello</span>"));
//! ```

pub mod engine;
pub mod error;
pub mod glossary;
pub mod parser;
pub mod project;

pub use engine::{
    HtmlTemplates, IncludeMode, Output, Session, Style, TagHandler, TagOccurrence, TagTable,
    Warning, WarningKind,
};
pub use error::ParseError;
pub use glossary::DefinitionRegistry;
pub use parser::{parse, Document, Node, Spanned, TagNode, TagSpec};
pub use project::{Project, ProjectError, ProjectId};

use std::path::{Path, PathBuf};

use thiserror::Error;

use engine::display_file;

/// Errors that abort publishing of a document
#[derive(Debug, Error)]
pub enum PublishError {
    /// The markup could not be scanned
    #[error("{}: parse errors: {}", display_file(.file.as_deref()), format_parse_errors(.errors))]
    Parse {
        file: Option<PathBuf>,
        source_text: String,
        errors: Vec<ParseError>,
    },

    /// A file could not be read
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A tag lacks an attribute it needs
    #[error("{}: <{tag}> requires a '{attribute}' attribute", display_file(.file.as_deref()))]
    MissingAttribute {
        tag: String,
        attribute: String,
        file: Option<PathBuf>,
        span: std::ops::Range<usize>,
        source_text: String,
    },

    /// Includes nested deeper than the configured limit
    #[error("include depth {depth} exceeded at {}", .path.display())]
    IncludeDepth { path: PathBuf, depth: usize },
}

impl PublishError {
    /// Format the error with source context where the error has any
    pub fn format(&self) -> String {
        match self {
            PublishError::Parse {
                file,
                source_text,
                errors,
            } => {
                let filename = display_file(file.as_deref());
                errors
                    .iter()
                    .map(|e| e.format(source_text, &filename))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            PublishError::MissingAttribute {
                file,
                span,
                source_text,
                ..
            } => error::report(
                source_text,
                &display_file(file.as_deref()),
                span.clone(),
                &self.to_string(),
                "tag used here",
            ),
            _ => self.to_string(),
        }
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration for publishing
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Output style
    pub style: Style,
    /// Wrap HTML output into a complete page with the toggle script
    pub standalone: bool,
    /// Deepest allowed nesting of included files
    pub max_include_depth: usize,
    /// Fragments for rendered definitions
    pub templates: HtmlTemplates,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            style: Style::Html,
            standalone: false,
            max_include_depth: 16,
            templates: HtmlTemplates::default(),
        }
    }
}

impl PublishConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the `[html]` settings of a project
    pub fn for_project(project: &Project) -> Self {
        let mut config = Self::default();
        if let Some(standalone) = project.html.standalone {
            config.standalone = standalone;
        }
        if let Some(label) = &project.html.label_template {
            config.templates.label = label.clone();
        }
        if let Some(definition) = &project.html.definition_template {
            config.templates.definition = definition.clone();
        }
        config
    }

    /// Set the output style
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Enable or disable the standalone page wrapper
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Set the include nesting limit
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Set the definition fragment templates
    pub fn with_templates(mut self, templates: HtmlTemplates) -> Self {
        self.templates = templates;
        self
    }
}

/// Result of publishing one document
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub output: String,
    pub warnings: Vec<Warning>,
}

/// Publishes documents of one project, keeping its definitions between runs
#[derive(Debug)]
pub struct Publisher {
    tags: TagTable,
    registry: DefinitionRegistry,
    project: Project,
    config: PublishConfig,
}

impl Publisher {
    /// Create a publisher with the glossary tags registered and the
    /// project's configured definitions loaded
    pub fn new(project: Project, config: PublishConfig) -> Self {
        Self::with_tags(TagTable::with_glossary(), project, config)
    }

    /// Create a publisher with a custom tag table
    pub fn with_tags(tags: TagTable, project: Project, config: PublishConfig) -> Self {
        let mut registry = DefinitionRegistry::new();
        for (name, text) in &project.definitions {
            registry.set(&project.id, name.clone(), text.clone());
        }
        Self {
            tags,
            registry,
            project,
            config,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DefinitionRegistry {
        &mut self.registry
    }

    pub fn tags_mut(&mut self) -> &mut TagTable {
        &mut self.tags
    }

    /// Forget every definition of the project, forcing a clean rebuild
    pub fn clear_definitions(&mut self) {
        tracing::info!(project = %self.project.id, "clearing definitions");
        self.registry.clear(&self.project.id);
    }

    /// Publish markup source; `path` locates the document for relative
    /// dependencies and self-reference checks
    pub fn publish_str(&mut self, source: &str, path: Option<&Path>) -> Result<PublishReport, PublishError> {
        let mut session = Session::new(&self.tags, &mut self.registry, &self.project.id, &self.config);
        if let Some(path) = path {
            session = session.with_file(path);
        }

        let mut out = Output::new(self.config.style);
        session.process(source, &mut out)?;
        let warnings = session.into_warnings();

        let body = out.into_string();
        let output = if self.config.style == Style::Html && self.config.standalone {
            let title = path
                .and_then(Path::file_stem)
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.project.id.to_string());
            engine::style::standalone_page(&title, &body)
        } else {
            body
        };

        Ok(PublishReport { output, warnings })
    }

    /// Read and publish a file
    pub fn publish_file(&mut self, path: &Path) -> Result<PublishReport, PublishError> {
        let source = std::fs::read_to_string(path).map_err(|e| PublishError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!(file = %path.display(), project = %self.project.id, "publishing");
        self.publish_str(&source, Some(path))
    }
}

/// Publish markup source to an HTML fragment with default configuration
///
/// Missing definitions are logged and left out of the output.
pub fn publish(source: &str) -> Result<String, PublishError> {
    publish_with_config(source, PublishConfig::default())
}

/// Publish markup source with custom configuration
///
/// # Example
///
/// ```rust
/// use glossmark::{publish_with_config, PublishConfig, Style};
///
/// let config = PublishConfig::new().with_style(Style::Text);
/// let text = publish_with_config(r#"A <define link="word">hello</define>."#, config).unwrap();
/// assert_eq!(text, "A .");
/// ```
pub fn publish_with_config(source: &str, config: PublishConfig) -> Result<String, PublishError> {
    let mut publisher = Publisher::new(Project::default(), config);
    Ok(publisher.publish_str(source, None)?.output)
}
