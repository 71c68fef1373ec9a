//! Cookie directory: default resonance tags by cookie name.
//!
//! Used when a cookie block has no `resonant` list of its own.

use std::collections::BTreeMap;
use std::path::Path;

use crate::catalog::Resonance;
use crate::error::DocumentError;

pub trait CookieDirectory {
    /// Default resonance tags for `name`, or `None` for an unlisted cookie.
    fn resonances(&self, name: &str) -> Option<Vec<Resonance>>;
}

/// Directory that knows no cookies.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDirectory;

impl CookieDirectory for EmptyDirectory {
    fn resonances(&self, _name: &str) -> Option<Vec<Resonance>> {
        None
    }
}

/// Map-backed directory. Lookups ignore case and surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct MapDirectory {
    entries: BTreeMap<String, Vec<Resonance>>,
}

impl MapDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, tags: Vec<Resonance>) {
        self.entries.insert(key(name), tags);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a YAML mapping of `Cookie Name: [Resonance, ...]`.
    pub fn from_yaml_str(text: &str) -> Result<Self, DocumentError> {
        let raw: BTreeMap<String, Vec<String>> = serde_yaml_ng::from_str(text)?;
        let mut dir = MapDirectory::new();
        for (name, tags) in raw {
            let tags = tags
                .iter()
                .map(|tag| {
                    Resonance::from_name(tag).ok_or_else(|| {
                        DocumentError::Directory(format!("{}: unknown resonance '{}'", name, tag))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            dir.insert(&name, tags);
        }
        Ok(dir)
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml_str(&text)
    }
}

impl CookieDirectory for MapDirectory {
    fn resonances(&self, name: &str) -> Option<Vec<Resonance>> {
        self.entries.get(&key(name)).cloned()
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}
