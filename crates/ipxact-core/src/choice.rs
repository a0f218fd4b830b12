//! Choices: named enumerations constraining parameter values.

use serde::{Deserialize, Serialize};

/// One legal value of a choice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Enumeration {
    /// The value expression.
    pub value: String,
    /// Display text.
    pub text: String,
    /// Help text.
    pub help: String,
}

impl Enumeration {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Enumeration {
            value: value.into(),
            text: text.into(),
            help: String::new(),
        }
    }
}

/// A named list of legal values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Choice {
    /// Name referenced from `Parameter::choice_ref`.
    pub name: String,
    /// Enumerations in document order.
    pub enumerations: Vec<Enumeration>,
}

impl Choice {
    pub fn new(name: impl Into<String>) -> Self {
        Choice {
            name: name.into(),
            enumerations: Vec::new(),
        }
    }

    /// Whether any enumeration has exactly this value text.
    pub fn has_enumeration(&self, value: &str) -> bool {
        self.enumerations.iter().any(|e| e.value == value)
    }
}

/// First choice with the given name.
pub fn find_choice<'a>(choices: &'a [Choice], name: &str) -> Option<&'a Choice> {
    choices.iter().find(|c| c.name == name)
}
