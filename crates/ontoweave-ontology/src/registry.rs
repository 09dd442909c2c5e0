//! Bidirectional template-variable ⇄ term map.

use std::collections::BTreeMap;

use crate::error::RegistryError;

/// Bijection between template variables (keys) and the terms they resolve to
/// (values). Both directions are kept in lock-step; there is no way to mutate
/// one without the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermRegistry {
    forward: BTreeMap<String, String>,
    inverse: BTreeMap<String, String>,
}

impl TermRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry where every variable resolves to itself.
    pub fn identity<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for variable in variables {
            let variable = variable.into();
            registry.set(variable.clone(), variable);
        }
        registry
    }

    /// Bind `key` to `value`.
    ///
    /// The previous value of `key` is released, and so is any other key that
    /// held `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(old_value) = self.forward.remove(&key) {
            self.inverse.remove(&old_value);
        }
        if let Some(old_key) = self.inverse.remove(&value) {
            self.forward.remove(&old_key);
        }
        self.inverse.insert(value.clone(), key.clone());
        self.forward.insert(key, value);
    }

    /// Re-point whichever key currently resolves to `old` at `new`. A term
    /// nobody resolves to starts its own entry.
    pub fn record_rename(&mut self, old: &str, new: &str) {
        let key = self
            .inverse
            .get(old)
            .cloned()
            .unwrap_or_else(|| old.to_string());
        self.set(key, new);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.forward.get(key).map(String::as_str)
    }

    pub fn resolve(&self, key: &str) -> Result<&str, RegistryError> {
        self.get(key).ok_or_else(|| RegistryError::UnresolvedVariable {
            key: key.to_string(),
        })
    }

    pub fn key_of(&self, value: &str) -> Result<&str, RegistryError> {
        self.inverse
            .get(value)
            .map(String::as_str)
            .ok_or_else(|| RegistryError::NotFound {
                value: value.to_string(),
            })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.forward.contains_key(key)
    }

    pub fn contains_value(&self, value: &str) -> bool {
        self.inverse.contains_key(value)
    }

    /// A key that still resolves to itself has not been bound yet.
    pub fn is_unresolved(&self, key: &str) -> bool {
        self.get(key) == Some(key)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// `(key, value)` pairs ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
