//! Syntax tree types for glossmark markup

pub use super::lexer::Attributes;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Root node - a scanned markup document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub nodes: Vec<Spanned<Node>>,
}

/// A piece of a document: a run of literal text or a registered tag
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text; the content is the source slice at the node's span
    Text,
    /// A registered tag occurrence
    Tag(TagNode),
}

/// A registered tag found in the source
#[derive(Debug, Clone, PartialEq)]
pub struct TagNode {
    pub name: String,
    pub attributes: Attributes,
    /// Span of the body between the opening and closing tag.
    /// `None` for self-closing tags.
    pub body: Option<Span>,
}

impl TagNode {
    /// Get an attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }
}
