//! Glossary tags
//!
//! Three tags cooperate through a per-project [`DefinitionRegistry`]:
//!
//! ```text
//! <definition name="markup">Text annotated with tags</definition>
//! <defdepend file="terms.page"/>
//! Every page is written in <define link="markup"/>.
//! ```
//!
//! - `definition` records its body under `name`.
//! - `defdepend` processes another file for its definitions and discards its
//!   output. It must stand on its own line.
//! - `define` renders `link` with its definition: the inline body if there is
//!   one, the registered text otherwise.

mod depend;
mod recorder;
mod registry;
mod resolver;

pub use depend::DependTag;
pub use recorder::DefinitionTag;
pub use registry::DefinitionRegistry;
pub use resolver::{render_id, DefineTag};

use crate::engine::TagTable;
use crate::parser::TagSpec;

/// Register `define`, `definition` and `defdepend`
pub fn register_tags(table: &mut TagTable) {
    table.register("define", TagSpec::inline(), DefineTag);
    table.register("definition", TagSpec::inline(), DefinitionTag);
    table.register("defdepend", TagSpec::own_line(), DependTag);
}
