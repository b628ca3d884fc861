//! The `define` tag: resolve a term and render its definition widget

use rand::Rng;

use crate::engine::{Output, Session, Style, TagHandler, TagOccurrence, WarningKind};
use crate::PublishError;

/// `<define link="NAME"/>` or `<define link="NAME">inline text</define>`
///
/// Inline text takes precedence over the registry. In HTML the tag becomes a
/// clickable label followed by a hidden box holding the definition; other
/// styles drop the tag and its body.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefineTag;

impl TagHandler for DefineTag {
    fn handle(
        &self,
        session: &mut Session<'_>,
        tag: &TagOccurrence<'_>,
        out: &mut Output,
    ) -> Result<(), PublishError> {
        let link = tag.required_attribute("link")?;

        if session.style() != Style::Html {
            return Ok(());
        }

        let inline = tag.raw_body();
        let text = if !inline.is_empty() {
            inline.to_string()
        } else {
            match session.registry().get(session.project(), link) {
                Some(text) => text.to_string(),
                None => {
                    session.warn(WarningKind::MissingDefinition {
                        link: link.to_string(),
                    });
                    return Ok(());
                }
            }
        };

        let id = render_id(link);
        let templates = &session.config().templates;
        out.insert_markup(&templates.render_label(&id, link));
        out.insert_markup(&templates.render_definition(&id, &text));
        Ok(())
    }
}

/// Fresh element ID for one rendered widget: random token followed by the link
///
/// ASCII letters, digits and `-` are kept. Every other byte of the link is
/// written as `_` plus two hex digits, so the ID is safe inside an HTML
/// attribute and a JavaScript string alike.
pub fn render_id(link: &str) -> String {
    let token: u32 = rand::thread_rng().gen();
    let mut id = format!("{:08x}", token);
    for byte in link.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            id.push(byte as char);
        } else {
            id.push_str(&format!("_{:02x}", byte));
        }
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_id_ends_with_link() {
        let id = render_id("word");
        assert_eq!(id.len(), 12);
        assert!(id.ends_with("word"));
        assert!(id[..8].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_render_id_encodes_unsafe_characters() {
        let id = render_id("don't stop_now");
        assert_eq!(&id[8..], "don_27t_20stop_5fnow");
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_render_id_keeps_distinct_links_distinct() {
        assert_ne!(&render_id("a_27")[8..], &render_id("a'")[8..]);
    }

    #[test]
    fn test_render_ids_are_distinct() {
        let ids: std::collections::HashSet<_> = (0..32).map(|_| render_id("word")).collect();
        assert!(ids.len() > 1);
    }
}
