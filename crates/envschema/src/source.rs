//! Raw value sources.
//!
//! A [`Source`] maps variable names to optional strings. The resolver reads
//! each declared key once; `keys` is only consulted when unknown keys are
//! passed through.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use indexmap::IndexMap;

use crate::errors::EnvError;

/// Read-only key/value lookup feeding the resolver.
pub trait Source {
    fn get(&self, key: &str) -> Option<String>;

    /// All keys the source can answer for.
    fn keys(&self) -> Vec<String>;
}

/// The process environment.
///
/// Values that are not valid unicode are converted lossily.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Source for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }

    fn keys(&self) -> Vec<String> {
        std::env::vars_os()
            .map(|(key, _)| key.to_string_lossy().into_owned())
            .collect()
    }
}

impl Source for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        HashMap::keys(self).cloned().collect()
    }
}

impl Source for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }
}

impl Source for IndexMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        IndexMap::get(self, key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        IndexMap::keys(self).cloned().collect()
    }
}

impl<S: Source + ?Sized> Source for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

/// Stack of sources; the first layer holding a non-empty value for a key wins.
///
/// An empty value counts as missing, so it falls through to lower layers.
#[derive(Default)]
pub struct Layered {
    layers: Vec<Box<dyn Source>>,
}

impl Layered {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer below the existing ones.
    pub fn with_layer(mut self, layer: impl Source + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Source for Layered {
    fn get(&self, key: &str) -> Option<String> {
        self.layers
            .iter()
            .find_map(|layer| layer.get(key).filter(|value| !value.is_empty()))
    }

    fn keys(&self) -> Vec<String> {
        let mut seen = indexmap::IndexSet::new();
        for layer in &self.layers {
            seen.extend(layer.keys());
        }
        seen.into_iter().collect()
    }
}

/// Read a `.env` file without touching the process environment.
pub fn load_dotenv(path: &Path) -> Result<IndexMap<String, String>, EnvError> {
    let to_error = |source: dotenvy::Error| EnvError::DotEnv {
        path: path.to_path_buf(),
        source,
    };

    let mut values = IndexMap::new();
    for item in dotenvy::from_path_iter(path).map_err(to_error)? {
        let (key, value) = item.map_err(to_error)?;
        values.insert(key, value);
    }

    tracing::debug!("Loaded {} entries from {}", values.len(), path.display());
    Ok(values)
}
