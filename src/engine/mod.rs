//! Publishing engine
//!
//! The engine scans a document for registered tags and hands every occurrence
//! to its handler in document order. Text between tags is copied to the
//! output through the active [`Style`]. Handlers decide what, if anything,
//! replaces the tag; the tag markup itself never reaches the output.
//!
//! A [`Session`] carries the state of one publish run: the project, the stack
//! of files being processed, the definition registry and collected warnings.
//! [`Session::include`] processes another file through the same tag table,
//! either inserting its output or discarding it.

mod include;
pub mod style;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::glossary::DefinitionRegistry;
use crate::parser::{self, Node, Span, TagNode, TagSpec};
use crate::project::ProjectId;
use crate::{PublishConfig, PublishError};

pub use include::IncludeTag;
pub use style::{HtmlTemplates, Style};

/// Handler invoked for every occurrence of a registered tag
pub trait TagHandler {
    fn handle(
        &self,
        session: &mut Session<'_>,
        tag: &TagOccurrence<'_>,
        out: &mut Output,
    ) -> Result<(), PublishError>;
}

/// Registered tags and their handlers
#[derive(Default)]
pub struct TagTable {
    specs: HashMap<String, TagSpec>,
    handlers: HashMap<String, Box<dyn TagHandler>>,
}

impl fmt::Debug for TagTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagTable").field("tags", &self.names()).finish()
    }
}

impl TagTable {
    /// Create an empty tag table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tag table with the glossary tags and `include` registered
    pub fn with_glossary() -> Self {
        let mut table = Self::new();
        crate::glossary::register_tags(&mut table);
        table.register("include", TagSpec::own_line(), IncludeTag);
        table
    }

    /// Register a handler, replacing any earlier handler for the same tag
    pub fn register(&mut self, name: impl Into<String>, spec: TagSpec, handler: impl TagHandler + 'static) {
        let name = name.into();
        self.specs.insert(name.clone(), spec);
        self.handlers.insert(name, Box::new(handler));
    }

    /// Check if a tag is registered
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Sorted names of all registered tags
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn specs(&self) -> &HashMap<String, TagSpec> {
        &self.specs
    }

    fn handler(&self, name: &str) -> Option<&dyn TagHandler> {
        self.handlers.get(name).map(|h| h.as_ref())
    }
}

/// A tag occurrence as seen by its handler
#[derive(Debug, Clone, Copy)]
pub struct TagOccurrence<'a> {
    node: &'a TagNode,
    span: &'a Span,
    source: &'a str,
    file: Option<&'a Path>,
}

impl<'a> TagOccurrence<'a> {
    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    /// Offset of the opening `<`
    pub fn begin(&self) -> usize {
        self.span.start
    }

    /// Offset just past the closing `>`
    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.node.attribute(name)
    }

    /// Get an attribute the tag cannot do without
    pub fn required_attribute(&self, name: &str) -> Result<&'a str, PublishError> {
        self.attribute(name).ok_or_else(|| PublishError::MissingAttribute {
            tag: self.node.name.clone(),
            attribute: name.to_string(),
            file: self.file.map(Path::to_path_buf),
            span: self.span.clone(),
            source_text: self.source.to_string(),
        })
    }

    /// Literal source between the opening and closing tag; empty for `<tag/>`
    pub fn raw_body(&self) -> &'a str {
        match &self.node.body {
            Some(body) => &self.source[body.clone()],
            None => "",
        }
    }
}

/// Output sink of a publish run
#[derive(Debug, Clone)]
pub struct Output {
    style: Style,
    buf: String,
}

impl Output {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            buf: String::new(),
        }
    }

    pub fn style(&self) -> Style {
        self.style
    }

    /// Append document text, escaped for the output style
    pub fn push_text(&mut self, text: &str) {
        self.buf.push_str(&self.style.escape(text));
    }

    /// Append markup as-is
    pub fn insert_markup(&mut self, markup: &str) {
        self.buf.push_str(markup);
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

/// What the include primitive does with the processed content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeMode {
    /// Write the processed content at the current point
    Insert,
    /// Process the content for its side effects and drop the output
    Discard,
}

/// Non-fatal problem found while publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    /// File being published when the problem was found
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// A `define` with no inline text and no registered definition
    MissingDefinition { link: String },
    /// A `defdepend` whose target is already being processed
    CircularDependency { path: PathBuf },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = display_file(self.file.as_deref());
        match &self.kind {
            WarningKind::MissingDefinition { link } => {
                write!(f, "{}: no definition found for '{}'", file, link)
            }
            WarningKind::CircularDependency { path } => {
                write!(f, "{}: skipping circular dependency on {}", file, path.display())
            }
        }
    }
}

pub(crate) fn display_file(file: Option<&Path>) -> String {
    file.map(|p| p.display().to_string())
        .unwrap_or_else(|| "<input>".to_string())
}

/// Make a path absolute, resolving symlinks when the file exists
pub(crate) fn absolute(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// State of one publish run
pub struct Session<'p> {
    tags: &'p TagTable,
    registry: &'p mut DefinitionRegistry,
    project: &'p ProjectId,
    config: &'p PublishConfig,
    /// Absolute paths of the files being processed, outermost first
    includes: Vec<PathBuf>,
    warnings: Vec<Warning>,
}

impl<'p> Session<'p> {
    pub fn new(
        tags: &'p TagTable,
        registry: &'p mut DefinitionRegistry,
        project: &'p ProjectId,
        config: &'p PublishConfig,
    ) -> Self {
        Self {
            tags,
            registry,
            project,
            config,
            includes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Start the session inside a file, so relative paths resolve against it
    pub fn with_file(mut self, path: &Path) -> Self {
        self.includes = vec![absolute(path)];
        self
    }

    pub fn project(&self) -> &ProjectId {
        self.project
    }

    pub fn config(&self) -> &PublishConfig {
        self.config
    }

    pub fn style(&self) -> Style {
        self.config.style
    }

    pub fn registry(&self) -> &DefinitionRegistry {
        self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DefinitionRegistry {
        self.registry
    }

    /// Absolute path of the file currently being processed
    pub fn current_file(&self) -> Option<&Path> {
        self.includes.last().map(|p| p.as_path())
    }

    /// Check if a file is somewhere on the include stack
    pub fn is_processing(&self, path: &Path) -> bool {
        self.includes.iter().any(|p| p == path)
    }

    /// Resolve a path relative to the directory of the current file
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        let base = self
            .current_file()
            .and_then(Path::parent)
            .map(|dir| dir.join(relative))
            .unwrap_or_else(|| PathBuf::from(relative));
        absolute(&base)
    }

    /// Record a non-fatal problem
    pub fn warn(&mut self, kind: WarningKind) {
        let warning = Warning {
            kind,
            file: self.current_file().map(Path::to_path_buf),
        };
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// Process another file through the tag table
    pub fn include(&mut self, path: &Path, mode: IncludeMode, out: &mut Output) -> Result<(), PublishError> {
        let path = absolute(path);
        let depth = self.includes.len();
        if depth >= self.config.max_include_depth {
            return Err(PublishError::IncludeDepth { path, depth });
        }

        let source = std::fs::read_to_string(&path).map_err(|e| PublishError::Io {
            path: path.clone(),
            source: e,
        })?;

        tracing::debug!(file = %path.display(), ?mode, depth, "including file");

        self.includes.push(path);
        let result = match mode {
            IncludeMode::Insert => self.process(&source, out),
            IncludeMode::Discard => {
                let mut scratch = Output::new(out.style());
                self.process(&source, &mut scratch)
            }
        };
        self.includes.pop();
        result
    }

    /// Scan a source document and dispatch its tags
    pub fn process(&mut self, source: &str, out: &mut Output) -> Result<(), PublishError> {
        let tags = self.tags;
        let file = self.current_file().map(Path::to_path_buf);

        let doc = parser::parse(source, tags.specs()).map_err(|errors| PublishError::Parse {
            file: file.clone(),
            source_text: source.to_string(),
            errors,
        })?;

        for node in &doc.nodes {
            match &node.node {
                Node::Text => out.push_text(&source[node.span.clone()]),
                Node::Tag(tag) => {
                    // Only registered tags come out of the parser
                    let Some(handler) = tags.handler(&tag.name) else {
                        continue;
                    };
                    tracing::debug!(tag = %tag.name, at = node.span.start, "dispatching tag");
                    let occurrence = TagOccurrence {
                        node: tag,
                        span: &node.span,
                        source,
                        file: file.as_deref(),
                    };
                    handler.handle(self, &occurrence, out)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records raw bodies and replaces the tag with a marker
    struct Probe {
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl TagHandler for Probe {
        fn handle(
            &self,
            _session: &mut Session<'_>,
            tag: &TagOccurrence<'_>,
            out: &mut Output,
        ) -> Result<(), PublishError> {
            self.seen.borrow_mut().push(tag.raw_body().to_string());
            out.insert_markup("<probe/>");
            Ok(())
        }
    }

    fn run(table: &TagTable, source: &str) -> Result<String, PublishError> {
        let mut registry = DefinitionRegistry::new();
        let project = ProjectId::default();
        let config = PublishConfig::default();
        let mut session = Session::new(table, &mut registry, &project, &config);
        let mut out = Output::new(Style::Html);
        session.process(source, &mut out)?;
        Ok(out.into_string())
    }

    #[test]
    fn test_text_is_escaped_and_tags_dispatched() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut table = TagTable::new();
        table.register("probe", TagSpec::inline(), Probe { seen: seen.clone() });

        let out = run(&table, "a & <probe>raw <b></probe> b").expect("Should publish");
        assert_eq!(out, "a &amp; <probe/> b");
        assert_eq!(*seen.borrow(), vec!["raw <b>".to_string()]);
    }

    #[test]
    fn test_occurrence_offsets() {
        struct Offsets;
        impl TagHandler for Offsets {
            fn handle(
                &self,
                _session: &mut Session<'_>,
                tag: &TagOccurrence<'_>,
                out: &mut Output,
            ) -> Result<(), PublishError> {
                out.insert_markup(&format!("[{}..{}]", tag.begin(), tag.end()));
                Ok(())
            }
        }
        let mut table = TagTable::new();
        table.register("x", TagSpec::inline(), Offsets);
        let out = run(&table, "ab<x/>cd").expect("Should publish");
        assert_eq!(out, "ab[2..6]cd");
    }

    #[test]
    fn test_missing_attribute_error() {
        struct NeedsName;
        impl TagHandler for NeedsName {
            fn handle(
                &self,
                _session: &mut Session<'_>,
                tag: &TagOccurrence<'_>,
                _out: &mut Output,
            ) -> Result<(), PublishError> {
                tag.required_attribute("name").map(|_| ())
            }
        }
        let mut table = TagTable::new();
        table.register("x", TagSpec::inline(), NeedsName);
        let err = run(&table, "<x/>").unwrap_err();
        assert!(matches!(
            err,
            PublishError::MissingAttribute { ref tag, ref attribute, .. } if tag == "x" && attribute == "name"
        ));
    }

    #[test]
    fn test_parse_error_carries_source() {
        let table = TagTable::with_glossary();
        let err = run(&table, "oops </define>").unwrap_err();
        match err {
            PublishError::Parse { source_text, errors, .. } => {
                assert_eq!(source_text, "oops </define>");
                assert!(!errors.is_empty());
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_table_names() {
        let table = TagTable::with_glossary();
        assert_eq!(table.names(), vec!["defdepend", "define", "definition", "include"]);
        assert!(table.contains("define"));
        assert!(!table.contains("b"));
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning {
            kind: WarningKind::MissingDefinition {
                link: "word".to_string(),
            },
            file: Some(PathBuf::from("/notes/index.page")),
        };
        assert_eq!(
            warning.to_string(),
            "/notes/index.page: no definition found for 'word'"
        );
    }
}
