//! Convenience builder for form-encoded request bodies.
//!
//! Robot accepts `application/x-www-form-urlencoded` bodies. Repeated values use
//! the `key[]` convention and nested lists use bracketed paths such as
//! `rules[input][0][name]`.

use std::fmt::Display;

/// Builder for assembling form field pairs.
#[derive(Debug, Default, Clone)]
pub struct FormParams {
    pairs: Vec<(String, String)>,
}

impl FormParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Display,
    {
        self.pairs.push((key.into(), value.to_string()));
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: impl Into<String>, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.pairs.push((key.into(), value.to_string()));
        }
    }

    /// Append every value under `key[]`.
    pub fn push_all<I, T>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let key = format!("{key}[]");
        for value in values {
            self.pairs.push((key.clone(), value.to_string()));
        }
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// Returns true if no fields have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
