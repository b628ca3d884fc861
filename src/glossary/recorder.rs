//! The `definition` tag: record canonical definitions

use crate::engine::{Output, Session, TagHandler, TagOccurrence};
use crate::PublishError;

/// `<definition name="NAME">text</definition>`
///
/// Stores the literal body under `name` in the current project and leaves
/// nothing in the output. A later definition with the same name wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionTag;

impl TagHandler for DefinitionTag {
    fn handle(
        &self,
        session: &mut Session<'_>,
        tag: &TagOccurrence<'_>,
        _out: &mut Output,
    ) -> Result<(), PublishError> {
        let name = tag.required_attribute("name")?;
        let text = tag.raw_body();

        tracing::debug!(project = %session.project(), name, "recording definition");
        let project = session.project().clone();
        session.registry_mut().set(&project, name, text);
        Ok(())
    }
}
