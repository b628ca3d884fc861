//! The `defdepend` tag: process a dependency for its definitions only

use crate::engine::{IncludeMode, Output, Session, TagHandler, TagOccurrence, WarningKind};
use crate::PublishError;

/// `<defdepend file="PATH"/>`
///
/// Runs the dependency through the full tag pipeline so its `definition`
/// tags populate the registry, then drops its output. A file never depends
/// on itself. A target already on the include stack (A depends on B depends
/// on A) is skipped with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependTag;

impl TagHandler for DependTag {
    fn handle(
        &self,
        session: &mut Session<'_>,
        tag: &TagOccurrence<'_>,
        out: &mut Output,
    ) -> Result<(), PublishError> {
        let file = tag.required_attribute("file")?;
        let path = session.resolve_path(file);

        if session.current_file() == Some(path.as_path()) {
            tracing::debug!(file = %path.display(), "ignoring self dependency");
            return Ok(());
        }

        if session.is_processing(&path) {
            session.warn(WarningKind::CircularDependency { path });
            return Ok(());
        }

        session.include(&path, IncludeMode::Discard, out)
    }
}
