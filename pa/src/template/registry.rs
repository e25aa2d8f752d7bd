//! Template catalog

use std::collections::HashMap;

use tracing::debug;

use super::{Template, TemplateDefinition, TemplateEngine};
use crate::error::{Result, TemplateError};
use crate::templates::{MediumBlogPost, PromptFile};

/// Builds a template around a prepared engine
pub type TemplateFactory = fn(TemplateEngine) -> Box<dyn Template>;

fn boxed<T: TemplateDefinition>(engine: TemplateEngine) -> Box<dyn Template> {
    Box::new(T::create(engine))
}

/// Maps template names to factories
#[derive(Default)]
pub struct TemplateRegistry {
    factories: HashMap<String, TemplateFactory>,
}

impl TemplateRegistry {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every built-in template
    pub fn builtin() -> Self {
        debug!("TemplateRegistry::builtin: called");
        let mut registry = Self::new();
        registry.register_type::<MediumBlogPost>();
        registry.register_type::<PromptFile>();
        registry
    }

    /// Register a factory, replacing any previous entry under `name`
    pub fn register(&mut self, name: impl Into<String>, factory: TemplateFactory) {
        let name = name.into();
        debug!(%name, "TemplateRegistry::register: called");
        if self.factories.insert(name.clone(), factory).is_some() {
            debug!(%name, "TemplateRegistry::register: replaced existing entry");
        }
    }

    /// Register a template type under its declared name
    pub fn register_type<T: TemplateDefinition>(&mut self) {
        self.register(T::NAME, boxed::<T>);
    }

    /// Look up the factory for `name`
    pub fn resolve(&self, name: &str) -> Result<TemplateFactory> {
        debug!(%name, "TemplateRegistry::resolve: called");
        self.factories
            .get(name)
            .copied()
            .ok_or_else(|| TemplateError::TemplateNotFound {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Build the template registered under `name` around `engine`
    pub fn instantiate(&self, name: &str, engine: TemplateEngine) -> Result<Box<dyn Template>> {
        let factory = self.resolve(name)?;
        Ok(factory(engine))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
