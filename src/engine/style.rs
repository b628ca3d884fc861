//! Output styles and the HTML fragments used by the glossary widgets

use std::borrow::Cow;

/// Output style of a publish run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Style {
    /// HTML with interactive definition widgets
    #[default]
    Html,
    /// Plain text; glossary references vanish
    Text,
}

impl Style {
    /// Escape literal document text for this style
    pub fn escape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            Style::Html => escape_html(text),
            Style::Text => Cow::Borrowed(text),
        }
    }

    /// File extension for published output
    pub fn extension(&self) -> &'static str {
        match self {
            Style::Html => "html",
            Style::Text => "txt",
        }
    }
}

/// Escape the characters HTML gives meaning to
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Clickable label toggling the element with the render ID
pub const DEFAULT_LABEL_TEMPLATE: &str =
    r#"<a class="define-label" href="javascript:toggleVisibility('{id}');">{link}</a>"#;

/// Hidden overlay box holding the definition text
pub const DEFAULT_DEFINITION_TEMPLATE: &str = r#"<span id="{id}" class="define-definition" style="display: none; position: absolute; z-index: 10; max-width: 30em; padding: 0.5em; border: 1px solid #333; background-color: #ffffe0;">{text}</span>"#;

/// Client-side toggle used by the label fragment
pub const TOGGLE_SCRIPT: &str = r#"<script type="text/javascript">
function toggleVisibility(id) {
  var e = document.getElementById(id);
  if (e) {
    e.style.display = (e.style.display == 'none') ? 'block' : 'none';
  }
}
</script>"#;

/// Templates for the two definition fragments
///
/// Placeholders: `{id}` (render ID), `{link}` (term), `{text}` (definition).
/// ID and term are escaped; definition text is inserted as markup.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlTemplates {
    pub label: String,
    pub definition: String,
}

impl Default for HtmlTemplates {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL_TEMPLATE.to_string(),
            definition: DEFAULT_DEFINITION_TEMPLATE.to_string(),
        }
    }
}

impl HtmlTemplates {
    /// Set the label template
    pub fn with_label(mut self, template: impl Into<String>) -> Self {
        self.label = template.into();
        self
    }

    /// Set the definition template
    pub fn with_definition(mut self, template: impl Into<String>) -> Self {
        self.definition = template.into();
        self
    }

    /// Render the clickable label fragment
    pub fn render_label(&self, id: &str, link: &str) -> String {
        fill(
            &self.label,
            &[("id", escape_html(id)), ("link", escape_html(link))],
        )
    }

    /// Render the hidden definition fragment
    pub fn render_definition(&self, id: &str, text: &str) -> String {
        fill(
            &self.definition,
            &[("id", escape_html(id)), ("text", Cow::Borrowed(text))],
        )
    }
}

/// Substitute `{name}` placeholders in one pass
///
/// Substituted values are never scanned again. Unknown placeholders and
/// stray braces are kept as they are.
fn fill(template: &str, values: &[(&str, Cow<'_, str>)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Wrap an HTML body into a complete page carrying the toggle script
pub fn standalone_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{}</title>
{}
</head>
<body>
{}
</body>
</html>
"#,
        escape_html(title),
        TOGGLE_SCRIPT,
        body
    )
}
