use serde::{Deserialize, Serialize};

/// A reference to another record that the store may or may not have
/// populated when loading the owning document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation<I, T> {
    Resolved(T),
    Reference(I),
}

impl<I, T> Relation<I, T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Relation::Resolved(value) => Some(value),
            Relation::Reference(_) => None,
        }
    }
}
