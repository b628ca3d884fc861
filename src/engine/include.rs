//! The `include` tag: insert another file's processed content

use super::{IncludeMode, Output, Session, TagHandler, TagOccurrence};
use crate::PublishError;

/// `<include file="PATH"/>`, resolved relative to the current file
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeTag;

impl TagHandler for IncludeTag {
    fn handle(
        &self,
        session: &mut Session<'_>,
        tag: &TagOccurrence<'_>,
        out: &mut Output,
    ) -> Result<(), PublishError> {
        let file = tag.required_attribute("file")?;
        let path = session.resolve_path(file);
        session.include(&path, IncludeMode::Insert, out)
    }
}
