//! The stored value type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One definition. Never mutated in place; an update swaps in a new `Entry`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    definition: String,
}

impl Entry {
    /// Wrap a definition.
    pub fn new(definition: impl Into<String>) -> Self {
        Self {
            definition: definition.into(),
        }
    }

    /// The definition text.
    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Consume the entry, handing back the definition.
    #[must_use]
    pub fn into_definition(self) -> String {
        self.definition
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.definition)
    }
}

/// The whole dictionary as held in memory for one read-modify-write cycle.
pub type Document = HashMap<String, Entry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_definition() {
        let e = Entry::new("a greeting");
        assert_eq!(e.to_string(), "a greeting");
        assert_eq!(e.definition(), "a greeting");
        assert_eq!(e.into_definition(), "a greeting".to_string());
    }

    #[test]
    fn serializes_as_object_with_definition_field() {
        let json = serde_json::to_string(&Entry::new("x")).unwrap();
        assert_eq!(json, r#"{"definition":"x"}"#);
    }
}
