//! Prompt Loader
//!
//! Resolves prompt sources to their literal text, from override directories
//! first and embedded defaults last.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::embedded;
use crate::error::{Result, TemplateError};

/// Extension of prompt files on disk
const PROMPT_EXTENSION: &str = "md";

/// Where a step's prompt text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    /// A prompt name such as `medium_blog_post/title`, resolved through the search chain
    Named(String),
    /// An explicit file path
    File(PathBuf),
}

impl fmt::Display for PromptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptSource::Named(name) => write!(f, "{}", name),
            PromptSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<&str> for PromptSource {
    fn from(name: &str) -> Self {
        PromptSource::Named(name.to_string())
    }
}

impl From<String> for PromptSource {
    fn from(name: String) -> Self {
        PromptSource::Named(name)
    }
}

impl From<PathBuf> for PromptSource {
    fn from(path: PathBuf) -> Self {
        PromptSource::File(path)
    }
}

impl From<&Path> for PromptSource {
    fn from(path: &Path) -> Self {
        PromptSource::File(path.to_path_buf())
    }
}

/// Loads prompt text
#[derive(Debug, Clone, Default)]
pub struct PromptLoader {
    /// Override directories, searched in order (e.g. `.promptauthor/prompts/`)
    override_dirs: Vec<PathBuf>,
}

impl PromptLoader {
    /// Create a loader searching the given override directories
    ///
    /// Directories that do not exist are skipped.
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        let override_dirs: Vec<PathBuf> = dirs
            .into_iter()
            .filter(|dir| {
                let exists = dir.is_dir();
                debug!(?dir, %exists, "PromptLoader::new: checking directory");
                exists
            })
            .collect();

        Self { override_dirs }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self::default()
    }

    /// Override directories in search order
    pub fn override_dirs(&self) -> &[PathBuf] {
        &self.override_dirs
    }

    /// Load a prompt's text, trimmed of surrounding whitespace
    pub fn load(&self, source: &PromptSource) -> Result<String> {
        debug!(%source, "PromptLoader::load: called");
        match source {
            PromptSource::Named(name) => self.load_named(name),
            PromptSource::File(path) => Self::load_path(path),
        }
    }

    /// Load a prompt file by path
    pub fn load_path(path: &Path) -> Result<String> {
        debug!(?path, "PromptLoader::load_path: called");
        std::fs::read_to_string(path)
            .map(|text| text.trim().to_string())
            .map_err(|e| TemplateError::ResourceNotFound {
                source_id: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    /// Load a named prompt
    ///
    /// Checks in order:
    /// 1. Each override directory: `{dir}/{name}.md`
    /// 2. Embedded fallback
    fn load_named(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_named: called");
        for dir in &self.override_dirs {
            let path = dir.join(format!("{}.{}", name, PROMPT_EXTENSION));
            if path.is_file() {
                info!("Using prompt override {}", path.display());
                return Self::load_path(&path);
            }
            debug!(?path, "PromptLoader::load_named: not found in override directory");
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_named: found in embedded");
            return Ok(content.trim().to_string());
        }

        debug!(%name, "PromptLoader::load_named: not found anywhere");
        Err(TemplateError::ResourceNotFound {
            source_id: name.to_string(),
            reason: format!(
                "no {name}.{PROMPT_EXTENSION} in {} override director{} and no built-in prompt",
                self.override_dirs.len(),
                if self.override_dirs.len() == 1 { "y" } else { "ies" }
            ),
        })
    }
}
