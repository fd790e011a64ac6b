use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};

/// A named set of hyperparameters shared between an agent and its step size strategy.
///
/// Each strategy reads its own keys (all prefixed by the strategy's name, e.g. `ghs_a`) and
/// writes back the values it ended up using, so that the caller can log or persist the effective
/// configuration after initialization.
///
/// Integer parameters are stored as `f64` and truncated by whoever reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSet(BTreeMap<String, f64>);

impl ParamSet {
    /// Creates an empty `ParamSet`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `name`, if any.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Stores `value` under `name`.
    ///
    /// # Returns
    /// The previous value, if there was one.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.0.insert(name.into(), value)
    }

    /// Whether a value is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the value stored under `name`, storing `default` first if it was missing.
    ///
    /// # Arguments
    /// * `name` - The parameter's key.
    /// * `default` - The value to use and store when the key is missing.
    ///
    /// # Returns
    /// The resolved value.
    pub fn get_or_insert(&mut self, name: &str, default: f64) -> f64 {
        self.get_or_insert_with(name, || default)
    }

    /// Same as `get_or_insert`, but the default is only computed when needed.
    ///
    /// This is what the randomized parameter search relies on: overrides are kept untouched and
    /// the generator is only sampled for the missing keys.
    pub fn get_or_insert_with(&mut self, name: &str, default: impl FnOnce() -> f64) -> f64 {
        if let Some(value) = self.get(name) {
            return value;
        }

        let value = default();
        self.0.insert(name.to_owned(), value);
        value
    }

    /// The amount of stored parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the parameters sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<K: Into<String>> Extend<(K, f64)> for ParamSet {
    fn extend<I: IntoIterator<Item = (K, f64)>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

impl IntoIterator for ParamSet {
    type Item = (String, f64);
    type IntoIter = btree_map::IntoIter<String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_insert_keeps_overrides() {
        let mut params: ParamSet = [("ghs_a", 3.)].into_iter().collect();

        assert_eq!(params.get_or_insert("ghs_a", 10.), 3.);
        assert_eq!(params.get_or_insert("stc_c", 1e6), 1e6);
        assert_eq!(params.get("stc_c"), Some(1e6));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn default_is_lazy() {
        let mut params: ParamSet = [("almeida_gamma", 0.5)].into_iter().collect();
        let value = params.get_or_insert_with("almeida_gamma", || panic!("should not be sampled"));
        assert_eq!(value, 0.5);
    }

    #[test]
    fn serializes_as_a_flat_map() {
        let params: ParamSet = [("vsgd_initmeta", 100.), ("vsgd_slowstart", 50.)]
            .into_iter()
            .collect();

        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"vsgd_initmeta":100.0,"vsgd_slowstart":50.0}"#);

        let back: ParamSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
