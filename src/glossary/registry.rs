//! Definition registry for storing and retrieving glossary entries

use std::collections::{BTreeMap, HashMap};

use crate::project::ProjectId;

/// Per-project mapping from definition name to raw definition text
///
/// One inner map exists per project at most. Maps are created lazily on
/// first access and live as long as the registry unless cleared.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    projects: HashMap<ProjectId, HashMap<String, String>>,
}

impl DefinitionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the definitions of a project, creating an empty map on first use
    pub fn get_or_create(&mut self, project: &ProjectId) -> &mut HashMap<String, String> {
        self.projects.entry(project.clone()).or_default()
    }

    /// Store a definition, replacing any earlier text under the same name
    pub fn set(&mut self, project: &ProjectId, name: impl Into<String>, text: impl Into<String>) {
        self.get_or_create(project).insert(name.into(), text.into());
    }

    /// Look up a definition
    pub fn get(&self, project: &ProjectId, name: &str) -> Option<&str> {
        self.projects
            .get(project)
            .and_then(|defs| defs.get(name))
            .map(|s| s.as_str())
    }

    /// Check if a definition exists
    pub fn contains(&self, project: &ProjectId, name: &str) -> bool {
        self.get(project, name).is_some()
    }

    /// Drop every definition of a project
    pub fn clear(&mut self, project: &ProjectId) {
        self.projects.remove(project);
    }

    /// Number of definitions stored for a project
    pub fn len(&self, project: &ProjectId) -> usize {
        self.projects.get(project).map_or(0, |defs| defs.len())
    }

    /// Whether a project has no definitions
    pub fn is_empty(&self, project: &ProjectId) -> bool {
        self.len(project) == 0
    }

    /// Sorted definition names of a project
    pub fn names(&self, project: &ProjectId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .projects
            .get(project)
            .map(|defs| defs.keys().map(|k| k.as_str()).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Ordered copy of a project's definitions
    pub fn snapshot(&self, project: &ProjectId) -> BTreeMap<String, String> {
        self.projects
            .get(project)
            .map(|defs| defs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wiki() -> ProjectId {
        ProjectId::new("wiki")
    }

    #[test]
    fn test_set_and_get() {
        let mut registry = DefinitionRegistry::new();
        registry.set(&wiki(), "word", "hello");
        assert_eq!(registry.get(&wiki(), "word"), Some("hello"));
        assert!(registry.contains(&wiki(), "word"));
    }

    #[test]
    fn test_get_missing() {
        let mut registry = DefinitionRegistry::new();
        assert_eq!(registry.get(&wiki(), "word"), None);
        registry.set(&wiki(), "other", "x");
        assert_eq!(registry.get(&wiki(), "word"), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut registry = DefinitionRegistry::new();
        registry.set(&wiki(), "word", "first");
        registry.set(&wiki(), "word", "second");
        assert_eq!(registry.get(&wiki(), "word"), Some("second"));
        assert_eq!(registry.len(&wiki()), 1);
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut registry = DefinitionRegistry::new();
        registry.get_or_create(&wiki()).insert("a".into(), "1".into());
        let defs = registry.get_or_create(&wiki());
        assert_eq!(defs.get("a").map(|s| s.as_str()), Some("1"));
        assert_eq!(registry.projects.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut registry = DefinitionRegistry::new();
        registry.set(&wiki(), "a", "1");
        registry.set(&wiki(), "b", "2");
        registry.clear(&wiki());
        assert_eq!(registry.get(&wiki(), "a"), None);
        assert_eq!(registry.get(&wiki(), "b"), None);
        assert!(registry.is_empty(&wiki()));
    }

    #[test]
    fn test_projects_are_isolated() {
        let mut registry = DefinitionRegistry::new();
        let other = ProjectId::new("other");
        registry.set(&wiki(), "word", "wiki text");
        registry.set(&other, "word", "other text");
        registry.clear(&other);
        assert_eq!(registry.get(&wiki(), "word"), Some("wiki text"));
        assert_eq!(registry.get(&other, "word"), None);
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = DefinitionRegistry::new();
        registry.set(&wiki(), "zeta", "");
        registry.set(&wiki(), "alpha", "");
        registry.set(&wiki(), "mu", "");
        assert_eq!(registry.names(&wiki()), vec!["alpha", "mu", "zeta"]);
    }

    #[test]
    fn test_snapshot() {
        let mut registry = DefinitionRegistry::new();
        registry.set(&wiki(), "b", "2");
        registry.set(&wiki(), "a", "1");
        let snap = registry.snapshot(&wiki());
        assert_eq!(snap.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(registry.snapshot(&ProjectId::new("none")).is_empty());
    }
}
