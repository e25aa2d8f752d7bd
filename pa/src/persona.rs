//! Personas
//!
//! A persona is the voice the model is asked to write in. Its rendered form is
//! injected into every prompt through the reserved `persona` variable.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the persona used when the config does not pick one
pub const DEFAULT_PERSONA: &str = "default";

/// An assumed voice/role for the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub description: String,
}

impl Persona {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Instruction fragment asking the model to adopt this persona
    pub fn render(&self) -> String {
        debug!(name = %self.name, "Persona::render: called");
        format!(
            "Please act as the persona described below in the <persona></persona> tags. \
             It is very important that you respond like this persona would.\n\n\
             <persona>You are {}. {}</persona>",
            self.name, self.description
        )
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::new(
            "a seasoned technical writer",
            "You write clear, accurate and engaging articles for a technical audience, \
             favouring concrete examples over abstractions.",
        )
    }
}

/// Look up a built-in persona by name
pub fn builtin(name: &str) -> Option<Persona> {
    debug!(%name, "builtin: called");
    match name {
        DEFAULT_PERSONA => Some(Persona::default()),
        "software-engineer" => Some(Persona::new(
            "a senior software engineer",
            "You have shipped large production systems and care about correctness, \
             trade-offs and maintainability. You speak plainly to other engineers.",
        )),
        "science-communicator" => Some(Persona::new(
            "a science communicator",
            "You make complex ideas approachable for curious non-specialists \
             without sacrificing accuracy.",
        )),
        _ => None,
    }
}

/// Names of all built-in personas
pub fn builtin_names() -> Vec<&'static str> {
    vec![DEFAULT_PERSONA, "science-communicator", "software-engineer"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_wraps_name_and_description() {
        let persona = Persona::new("X", "Y");
        assert_eq!(
            persona.render(),
            "Please act as the persona described below in the <persona></persona> tags. \
             It is very important that you respond like this persona would.\n\n\
             <persona>You are X. Y</persona>"
        );
    }

    #[test]
    fn test_every_builtin_name_resolves() {
        for name in builtin_names() {
            assert!(builtin(name).is_some(), "missing builtin persona {name}");
        }
        assert_eq!(builtin(DEFAULT_PERSONA), Some(Persona::default()));
        assert!(builtin("nobody").is_none());
    }
}
