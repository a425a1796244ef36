//! Discovery of files an engine names on its own.

use std::path::{Path, PathBuf};

/// Placeholder replaced by the input file stem in templates.
pub const STEM_PLACEHOLDER: &str = "{stem}";

/// Ordered list of filename templates an engine may have written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocator {
    templates: Vec<String>,
}

impl OutputLocator {
    pub fn new(templates: Vec<String>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Expands every template for `stem` inside `dir`, in order.
    pub fn candidates(&self, dir: &Path, stem: &str) -> Vec<PathBuf> {
        self.templates
            .iter()
            .map(|t| dir.join(t.replace(STEM_PLACEHOLDER, stem)))
            .collect()
    }

    /// Returns the first candidate that exists as a file.
    pub fn locate(&self, dir: &Path, stem: &str) -> Option<PathBuf> {
        self.candidates(dir, stem).into_iter().find(|p| p.is_file())
    }

    /// Returns every candidate that exists as a file.
    pub fn existing(&self, dir: &Path, stem: &str) -> Vec<PathBuf> {
        self.candidates(dir, stem)
            .into_iter()
            .filter(|p| p.is_file())
            .collect()
    }
}
